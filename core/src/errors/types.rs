//! Error types for token handling and notification delivery

use thiserror::Error;

/// Token codec errors
///
/// Returned by verification; callers fold every variant except
/// `TokenGenerationFailed` into a rejected credential.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token format")]
    InvalidTokenFormat,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Invalid claims")]
    InvalidClaims,

    #[error("Token generation failed")]
    TokenGenerationFailed,
}

/// Notification delivery errors
///
/// Never propagated to the engine's callers; dispatch failures are logged.
#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Notification transport failed: {0}")]
    Transport(String),

    #[error("Notification rejected by provider: {status}")]
    Rejected { status: u16 },

    #[error("Notification service misconfigured: {0}")]
    Configuration(String),
}
