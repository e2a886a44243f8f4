//! Domain error model.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// Deterministic business failure raised by domain types.
///
/// Store and queue failures have their own error types in the layers that
/// own those boundaries.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Rejected form input (blank name, negative price, ...).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A record no longer satisfies its own rules.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// Money arithmetic left the representable range.
    #[error("amount overflow: {0}")]
    Overflow(String),

    /// A `partition/row` key could not be parsed.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Expected version did not match the stored one.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn overflow(msg: impl Into<String>) -> Self {
        Self::Overflow(msg.into())
    }

    pub fn invalid_key(msg: impl Into<String>) -> Self {
        Self::InvalidKey(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
