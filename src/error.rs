//! Error types for the engraving pipeline.
//!
//! Every failure is fatal: the pipeline is a one-shot batch transform, so
//! errors carry enough context (parameter name, offending value, path) for
//! the caller to correct the input and run again.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while turning an image into a toolpath document.
#[derive(Error, Debug)]
pub enum EngraveError {
    /// The source image could not be opened or decoded.
    #[error("Failed to load image '{origin}': {source}")]
    ImageLoad {
        origin: String,
        #[source]
        source: image::ImageError,
    },

    /// Target dimensions are non-positive or the resample degenerated.
    #[error("Invalid size: {0}")]
    InvalidSize(String),

    /// A parameter is outside its valid range.
    #[error("Invalid value for '{name}': {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// The destination could not be written.
    #[error("Failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A document or preview could not be serialized.
    #[error("Failed to encode {what}: {reason}")]
    Encode { what: &'static str, reason: String },
}

impl EngraveError {
    pub(crate) fn invalid_parameter(
        name: &'static str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for engraving operations.
pub type EngraveResult<T> = Result<T, EngraveError>;
