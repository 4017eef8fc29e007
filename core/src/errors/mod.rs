//! Domain-specific error types and error handling.
//!
//! Expected token outcomes (malformed, reused, replayed, expired) are not
//! errors; they are variants of the outcome types in
//! [`crate::domain::value_objects`]. The types here carry genuine faults.

mod types;

pub use types::{NotificationError, TokenError};

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl DomainError {
    /// True for faults of the store, codec or runtime rather than of the caller's input
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            DomainError::Internal { .. }
                | DomainError::Conflict { .. }
                | DomainError::Token(TokenError::TokenGenerationFailed)
        )
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests;
