//! Error types for snapshot loading.

use thiserror::Error;

/// Errors that can occur while reading a snapshot file.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// File extension does not name a snapshot format.
    #[error("unsupported snapshot format: {0}")]
    UnsupportedFormat(String),
}

/// Convenience alias for results with [`SnapshotError`].
pub type Result<T> = std::result::Result<T, SnapshotError>;
