//! Errors raised by model validation and persistence.

use std::path::PathBuf;

use courtside_common::{CalibrationError, CourtsideError};

/// Errors that can occur when building or persisting model values.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Degenerate court corners: {reason}")]
    DegenerateCorners { reason: String },

    #[error("Invalid data: {message}")]
    Validation { message: String },
}

impl From<ModelError> for CourtsideError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::DegenerateCorners { reason } => {
                CourtsideError::Calibration(CalibrationError::Degenerate { reason })
            }
            ModelError::IoError { path, source } if source.kind() == std::io::ErrorKind::NotFound => {
                CourtsideError::FileNotFound { path }
            }
            other => CourtsideError::Other(other.into()),
        }
    }
}
