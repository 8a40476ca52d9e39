//! # fractal_midi
//!
//! Generate a two-track Standard MIDI File (format 1) whose melody comes
//! from a recursive, Koch-like rule: every note splits into four shorter
//! notes at the root, a fifth above, a fifth below, and the root again.
//!
//! The default export is piano on channel 0 and program 73 on channel 1,
//! 120 BPM in 4/4 at 480 ticks per quarter, recursion depth 4 from MIDI
//! note 60.  Every value is configurable through [`ExportConfig`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use fractal_midi::{ExportConfig, FileAssembler, TrackSpec};
//!
//! let config = ExportConfig {
//!     output: "fractal_duet.mid".into(),
//!     tempo_bpm: 96.0,
//!     tracks: vec![
//!         TrackSpec::new("Vibraphone", 0, 11),
//!         TrackSpec::new("Cello", 1, 42),
//!     ],
//!     ..Default::default()
//! };
//!
//! FileAssembler::new(config).unwrap().export().unwrap();
//! ```

pub mod assemble;
pub mod config;
pub mod error;

pub use assemble::{export, FileAssembler};
pub use config::{ExportConfig, TimeSignatureConfig, TrackSpec};
pub use error::{ExportError, ExportResult};

pub use fractal_stream::{FractalParams, PitchPolicy};
