//! Error types for the DCGAN library

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, GanError>;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum GanError {
    /// Dataset files are missing or unreadable
    #[error("dataset unavailable at {path}: {reason}")]
    DatasetUnavailable { path: PathBuf, reason: String },

    /// A tensor or array did not have the expected shape
    #[error("shape mismatch for {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        what: String,
        expected: String,
        actual: String,
    },

    /// Generator checkpoint does not exist
    #[error("checkpoint not found: {}", .0.display())]
    CheckpointMissing(PathBuf),

    /// A network output or loss became NaN or infinite
    #[error("non-finite {what} at iteration {iteration}")]
    NumericInstability { iteration: usize, what: String },

    /// Requested minibatch cannot be drawn from the pool
    #[error("invalid batch size {size} for a dataset of {available} samples")]
    InvalidBatchSize { size: usize, available: usize },

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// libtorch error
    #[error("torch error: {0}")]
    Torch(#[from] tch::TchError),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl GanError {
    pub(crate) fn shape(
        what: impl Into<String>,
        expected: impl std::fmt::Debug,
        actual: impl std::fmt::Debug,
    ) -> Self {
        GanError::ShapeMismatch {
            what: what.into(),
            expected: format!("{:?}", expected),
            actual: format!("{:?}", actual),
        }
    }
}
