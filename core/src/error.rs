//! Error types raised while reading or loading a report model.

use std::path::PathBuf;

use thiserror::Error;

/// Failure reading one member of a loaded model.
///
/// Accessors return this instead of panicking when a member throws,
/// is hidden on the running engine version, or has an unexpected shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// Member exists in the contract but cannot be read on this engine.
    #[error("member '{0}' is not accessible")]
    Inaccessible(String),

    /// Member was reached but its shape did not match what was expected.
    #[error("unexpected shape for '{member}': {detail}")]
    ShapeMismatch { member: String, detail: String },

    /// Engine-reported failure.
    #[error("{0}")]
    Engine(String),

    /// Accessor panicked; the payload message is kept when it is a string.
    #[error("accessor panicked: {0}")]
    Panicked(String),
}

impl AccessError {
    pub fn inaccessible(member: impl Into<String>) -> Self {
        Self::Inaccessible(member.into())
    }

    pub fn shape_mismatch(member: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            member: member.into(),
            detail: detail.into(),
        }
    }
}

/// Convenience alias for accessor results.
pub type AccessResult<T> = std::result::Result<T, AccessError>;

/// Failure acquiring a model from a report artifact.
///
/// # Examples
///
/// ```
/// use rptdoc_core::LoadError;
///
/// let err = LoadError::new("orders.rpt", "unsupported file version");
/// assert_eq!(
///     err.to_string(),
///     "failed to load report 'orders.rpt': unsupported file version"
/// );
/// ```
#[derive(Debug, Error)]
#[error("failed to load report '{}': {message}", path.display())]
pub struct LoadError {
    pub path: PathBuf,
    pub message: String,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl LoadError {
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Attaches the underlying cause.
    pub fn with_source(
        mut self,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}
