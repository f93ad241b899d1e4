//! Domain error model.

use thiserror::Error;

/// Failure to build a domain value from external input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Well-formed input outside the accepted range.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Input that is not an identifier at all.
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
