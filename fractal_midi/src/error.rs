//! Export error types

use std::io;
use std::path::PathBuf;

use fractal_stream::PitchError;
use smf_encoder::EncodeError;
use thiserror::Error;

/// Everything that can stop an export.  None of these are retried.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The output file or writer could not be opened or written.
    #[error("output sink {sink} unavailable: {source}")]
    SinkUnavailable {
        sink: String,
        #[source]
        source: io::Error,
    },

    #[error("encoding failed: {0}")]
    Encode(#[from] EncodeError),

    #[error("note generation failed: {0}")]
    Pitch(#[from] PitchError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read config {path:?}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl ExportError {
    pub(crate) fn sink(sink: impl Into<String>, source: io::Error) -> Self {
        ExportError::SinkUnavailable { sink: sink.into(), source }
    }
}

pub type ExportResult<T> = Result<T, ExportError>;
