//! Error types for model and view operations.
//!
//! Every mutating operation either succeeds completely or returns a
//! [`ModelError`] and leaves the model and its views unchanged.

use thiserror::Error;

/// The error type for model and view operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A required value is missing, blank, malformed or out of range.
    #[error("{0}")]
    InvalidArgument(String),

    /// The operation would break a structural rule of the model or a view.
    #[error("{0}")]
    InvariantViolation(String),

    /// A lookup used for mutation or hydration found nothing.
    #[error("{0}")]
    NotFound(String),

    /// A non-empty selection resolved to nothing after filtering.
    #[error("{0}")]
    EmptySelection(String),
}

impl ModelError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub(crate) fn violation(message: impl Into<String>) -> Self {
        Self::InvariantViolation(message.into())
    }

    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

/// Convenience alias for results of model and view operations.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Rejects blank required strings with `message`.
pub(crate) fn require(value: &str, message: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(ModelError::invalid(message))
    } else {
        Ok(())
    }
}

/// Validates an optional URL. Blank values clear it.
pub(crate) fn validate_url(value: &str) -> Result<Option<String>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if archmodel_core::url::is_url(trimmed) {
        Ok(Some(trimmed.to_string()))
    } else {
        Err(ModelError::invalid(format!("{trimmed} is not a valid URL.")))
    }
}
