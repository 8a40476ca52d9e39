//! # smf_encoder
//!
//! Byte-level encoding of Standard MIDI Files (format 1).
//!
//! * [`vlq`] — variable-length quantities for delta-times.
//! * [`event`] — note, meta and program-change events.
//! * [`track`] — [`TrackBuffer`] / [`TrackEncoder`] producing sealed
//!   [`EncodedTrack`] bodies, always terminated by `FF 2F 00`.
//! * [`chunk`] — the `MThd` header and `MTrk` framing.
//! * [`endian`] — explicit big-endian conversion of header fields.
//!
//! Reading MIDI files is out of scope; this crate only writes them.

pub mod chunk;
pub mod endian;
pub mod error;
pub mod event;
pub mod track;
pub mod vlq;

pub use chunk::{smf_bytes, write_track_chunk, FileHeader};
pub use endian::{be16, be32, flip_endian16, flip_endian32};
pub use error::{EncodeError, EncodeResult};
pub use event::{micros_per_quarter, MetaEvent, TimeSignature, TrackEvent};
pub use track::{EncodedTrack, TrackBuffer, TrackEncoder};
pub use vlq::{encode_vlq, vlq_len, write_vlq};
