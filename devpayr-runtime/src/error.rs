//! Error types for runtime validation.

use thiserror::Error;

/// Result type for runtime validation.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors that can leave the runtime validator.
///
/// Filesystem failures for the cache and fingerprint are not represented
/// here; they are absorbed where they happen.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Required configuration is missing or malformed.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The authority reported the project as unpaid or unauthorized.
    #[error("{0}")]
    Unauthorized(String),

    /// The authority could not be reached or answered with garbage.
    #[error("license check failed: {0}")]
    Transport(String),
}

impl RuntimeError {
    /// True for errors that must propagate to the host application.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// The message handed to the failure router.
    #[must_use]
    pub fn failure_message(&self) -> String {
        self.to_string()
    }
}

impl From<crate::authority::AuthorityError> for RuntimeError {
    fn from(err: crate::authority::AuthorityError) -> Self {
        Self::Transport(err.to_string())
    }
}
