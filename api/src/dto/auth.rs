use serde::{Deserialize, Serialize};
use tw_core::domain::entities::token::TokenPair;
use validator::Validate;

/// Longest token string accepted on the wire
const MAX_TOKEN_LENGTH: u64 = 4096;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, max = 4096))]
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Seconds until the access token expires
    pub expires_in: i64,
    /// Seconds until the refresh token expires
    pub refresh_expires_in: i64,
}

impl From<TokenPair> for TokenResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: pair.access_expires_in,
            refresh_expires_in: pair.refresh_expires_in,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevokedSessionsResponse {
    pub message: String,
    pub revoked_sessions: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PasswordResetRequest {
    #[validate(email, length(max = 255))]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PasswordResetCompleteRequest {
    #[validate(length(min = 1, max = 512))]
    pub token: String,
}

/// Whether a logout token is worth handing to the engine at all
pub fn is_plausible_token(token: &str) -> bool {
    !token.is_empty() && token.len() as u64 <= MAX_TOKEN_LENGTH
}
