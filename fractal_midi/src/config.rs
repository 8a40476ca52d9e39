//! Export configuration.
//!
//! Every field has a default, so an empty TOML document is a valid config:
//!
//! ```toml
//! output       = "FractalMusic.mid"
//! ppqn         = 480
//! tempo_bpm    = 120.0
//! depth        = 4
//! base_pitch   = 60
//! pitch_policy = "wrap"        # wrap | clamp | reject
//!
//! [time_signature]
//! numerator        = 4
//! denominator_pow2 = 2
//!
//! [[tracks]]
//! name    = "Piano"
//! channel = 0
//! program = 0
//!
//! [[tracks]]
//! name    = "Violin"
//! channel = 1
//! program = 73
//! ```

use std::path::{Path, PathBuf};

use fractal_stream::{FractalParams, PitchPolicy};
use serde::{Deserialize, Serialize};
use smf_encoder::chunk::MAX_DIVISION;
use smf_encoder::{micros_per_quarter, TimeSignature};

use crate::error::{ExportError, ExportResult};

pub const DEFAULT_OUTPUT: &str = "FractalMusic.mid";
pub const DEFAULT_PPQN:   u16  = 480;
pub const DEFAULT_BPM:    f64  = 120.0;
pub const DEFAULT_DEPTH:  u32  = 4;
pub const DEFAULT_PITCH:  i32  = 60;

/// Smallest accepted ppqn.  Below it the `ppqn / 8` stop threshold is 0 and
/// the recursion never cuts short, emitting 4^depth zero-tick notes.
pub const MIN_PPQN: u16 = 8;

/// Deepest accepted recursion: at most 4^10 leaves per track.
pub const MAX_DEPTH: u32 = 10;

/// Program, channel and label of one output track.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrackSpec {
    /// Written as a track-name meta-event when non-empty.
    #[serde(default)]
    pub name:    String,
    /// MIDI channel 0–15.
    pub channel: u8,
    /// 0-based General MIDI program.
    pub program: u8,
}

impl TrackSpec {
    pub fn new(name: &str, channel: u8, program: u8) -> Self {
        TrackSpec { name: name.to_string(), channel, program }
    }
}

/// Serializable mirror of [`TimeSignature`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimeSignatureConfig {
    pub numerator:                u8,
    pub denominator_pow2:         u8,
    pub clocks_per_click:         u8,
    pub notated_32nd_per_quarter: u8,
}

impl Default for TimeSignatureConfig {
    fn default() -> Self { TimeSignature::default().into() }
}

impl From<TimeSignature> for TimeSignatureConfig {
    fn from(ts: TimeSignature) -> Self {
        TimeSignatureConfig {
            numerator:                ts.numerator,
            denominator_pow2:         ts.denominator_pow2,
            clocks_per_click:         ts.clocks_per_click,
            notated_32nd_per_quarter: ts.notated_32nd_per_quarter,
        }
    }
}

impl From<TimeSignatureConfig> for TimeSignature {
    fn from(c: TimeSignatureConfig) -> Self {
        TimeSignature {
            numerator:                c.numerator,
            denominator_pow2:         c.denominator_pow2,
            clocks_per_click:         c.clocks_per_click,
            notated_32nd_per_quarter: c.notated_32nd_per_quarter,
        }
    }
}

/// Everything one export needs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub output:          PathBuf,
    /// Ticks per quarter note; also the root note length and the
    /// subdivision floor.
    pub ppqn:            u16,
    pub tempo_bpm:       f64,
    pub time_signature:  TimeSignatureConfig,
    pub depth:           u32,
    pub base_pitch:      i32,
    pub velocity:        u8,
    pub pitch_policy:    PitchPolicy,
    /// Emit `FF 03` track names.
    pub track_names:     bool,
    /// Cap on each encoded track body; `None` grows as needed.
    pub max_track_bytes: Option<usize>,
    pub tracks:          Vec<TrackSpec>,
}

impl Default for ExportConfig {
    /// Piano on channel 0 and program 73 on channel 1, 120 BPM in 4/4,
    /// depth 4 from middle C.
    fn default() -> Self {
        ExportConfig {
            output:          PathBuf::from(DEFAULT_OUTPUT),
            ppqn:            DEFAULT_PPQN,
            tempo_bpm:       DEFAULT_BPM,
            time_signature:  TimeSignatureConfig::default(),
            depth:           DEFAULT_DEPTH,
            base_pitch:      DEFAULT_PITCH,
            velocity:        fractal_stream::DEFAULT_VELOCITY,
            pitch_policy:    PitchPolicy::Wrap,
            track_names:     true,
            max_track_bytes: None,
            tracks: vec![
                TrackSpec::new("Piano", 0, 0),
                TrackSpec::new("Violin", 1, 73),
            ],
        }
    }
}

impl ExportConfig {
    /// Read and validate a TOML config file.
    pub fn load(path: &Path) -> ExportResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ExportError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!("loaded config from {:?}", path);
        Ok(config)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> ExportResult<Self> {
        let config: ExportConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ExportResult<()> {
        if self.ppqn < MIN_PPQN || self.ppqn > MAX_DIVISION {
            return invalid(format!("ppqn must be {MIN_PPQN}-{MAX_DIVISION}, got {}", self.ppqn));
        }
        if self.depth > MAX_DEPTH {
            return invalid(format!("depth must be at most {MAX_DEPTH}, got {}", self.depth));
        }
        if !(0..=127).contains(&self.base_pitch) {
            return invalid(format!("base pitch must be 0-127, got {}", self.base_pitch));
        }
        if let Err(e) = micros_per_quarter(self.tempo_bpm) {
            return invalid(e.to_string());
        }
        if self.velocity == 0 || self.velocity > 127 {
            return invalid(format!("velocity must be 1-127, got {}", self.velocity));
        }
        if self.tracks.is_empty() {
            return invalid("at least one track is required".to_string());
        }
        if self.tracks.len() > u16::MAX as usize {
            return invalid(format!("{} tracks exceed the 16-bit track count", self.tracks.len()));
        }
        for (i, t) in self.tracks.iter().enumerate() {
            if t.channel > 15 {
                return invalid(format!("track {i}: channel must be 0-15, got {}", t.channel));
            }
            if t.program > 127 {
                return invalid(format!("track {i}: program must be 0-127, got {}", t.program));
            }
        }
        Ok(())
    }

    /// Tempo meta-event payload.
    pub fn micros_per_quarter(&self) -> ExportResult<u32> {
        Ok(micros_per_quarter(self.tempo_bpm)?)
    }

    /// Recursion inputs: a quarter-note root and a quarter-note floor.
    pub fn fractal_params(&self) -> FractalParams {
        let ppqn = self.ppqn as u32;
        FractalParams::new(self.depth, self.base_pitch, ppqn, ppqn)
            .velocity(self.velocity)
            .pitch_policy(self.pitch_policy)
    }
}

fn invalid<T>(msg: String) -> ExportResult<T> {
    Err(ExportError::InvalidConfig(msg))
}
