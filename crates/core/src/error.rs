//! Domain error model.

use thiserror::Error;

/// Result type used by the domain crates.
pub type DomainResult<T> = Result<T, DomainError>;

/// Deterministic failures raised while building or changing domain values.
///
/// Storage and transport failures have their own error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A field value broke a model rule; the message is client-facing.
    #[error("{0}")]
    Validation(String),

    /// An identifier could not be parsed.
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
