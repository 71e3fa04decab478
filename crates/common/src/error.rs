//! Error types shared across Courtside crates.

use std::path::PathBuf;

/// Top-level error type for Courtside operations.
///
/// Every variant is terminal for a session: the pipeline aborts before
/// writing any output once one of these surfaces.
#[derive(Debug, thiserror::Error)]
pub enum CourtsideError {
    /// Source video failed to open or produced no frames.
    #[error("Input error: {message}")]
    Input { message: String },

    #[error(transparent)]
    Calibration(#[from] CalibrationError),

    #[error("Detection error: {message}")]
    Detection { message: String },

    #[error("Output error: {message}")]
    Output { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Ways court calibration can fail.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalibrationError {
    /// The operator cancelled corner selection.
    #[error("Corner selection was cancelled")]
    Cancelled,

    /// Automatic detection did not leave four unique corners.
    #[error("Found {found} unique court corners, need 4")]
    InsufficientCorners { found: usize },

    /// The corners cannot define a projective transform.
    #[error("Degenerate court corners: {reason}")]
    Degenerate { reason: String },

    /// The opt-in quadrilateral check rejected the detected corners.
    #[error("Corner quadrilateral rejected: {reason}")]
    RejectedQuadrilateral { reason: String },

    /// Corner selection input could not be read.
    #[error("Cannot read corner selection: {message}")]
    PickerInput { message: String },
}

/// Result type alias using CourtsideError.
pub type CourtsideResult<T> = Result<T, CourtsideError>;

/// Result type alias for calibration steps.
pub type CalibrationResult<T> = Result<T, CalibrationError>;

impl CourtsideError {
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input {
            message: msg.into(),
        }
    }

    pub fn detection(msg: impl Into<String>) -> Self {
        Self::Detection {
            message: msg.into(),
        }
    }

    pub fn output(msg: impl Into<String>) -> Self {
        Self::Output {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether this error came from the operator cancelling calibration.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Calibration(CalibrationError::Cancelled))
    }
}

impl CalibrationError {
    pub fn degenerate(reason: impl Into<String>) -> Self {
        Self::Degenerate {
            reason: reason.into(),
        }
    }
}
