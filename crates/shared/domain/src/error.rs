//! Domain-level errors.
//!
//! Raised by value objects such as `Password`. Request-level failures live in
//! `common::AppError`.

use thiserror::Error;

/// Errors raised by domain value objects.
#[derive(Error, Debug, Clone)]
pub enum DomainError {
    /// Password-related errors
    #[error("Password error: {0}")]
    Password(String),

    /// Internal domain error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Create a password error
    pub fn password(msg: impl Into<String>) -> Self {
        DomainError::Password(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        DomainError::Internal(msg.into())
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
