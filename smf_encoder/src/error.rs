//! Encoding error types

use thiserror::Error;

/// Failures while encoding a track or framing a file.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    /// Appending an event would push the track past its byte limit.
    #[error("track body needs {needed} bytes but the buffer limit is {limit}")]
    BufferOverflow { needed: usize, limit: usize },

    /// A delta-time or length above the 28-bit variable-length range.
    #[error("{0} does not fit in a 4-byte variable-length quantity")]
    VlqOutOfRange(u32),

    /// Tempo that is not positive or does not fit in 24 bits.
    #[error("tempo of {0} BPM cannot be written as 24-bit microseconds per quarter")]
    InvalidTempo(f64),

    /// Ticks-per-quarter must be 1–32767; the top bit selects SMPTE timing.
    #[error("division {0} is not a valid ticks-per-quarter value (1-32767)")]
    InvalidDivision(u16),

    #[error("{0} tracks cannot be described by a 16-bit track count")]
    TooManyTracks(usize),

    #[error("track body of {0} bytes exceeds the 32-bit chunk length field")]
    ChunkTooLong(usize),

    /// Something was appended after an explicit end-of-track.
    #[error("event appended after end-of-track")]
    EventAfterEnd,
}

pub type EncodeResult<T> = Result<T, EncodeError>;
