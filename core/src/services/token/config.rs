//! Configuration for the token codec

use jsonwebtoken::Algorithm;
use tw_shared::JwtConfig;

/// Configuration for the token codec
#[derive(Debug, Clone)]
pub struct TokenCodecConfig {
    /// Signing secret for access tokens
    pub access_secret: String,
    /// Signing secret for refresh tokens
    pub refresh_secret: String,
    /// JWT signing algorithm
    pub algorithm: Algorithm,
    /// Access token lifetime in seconds
    pub access_token_expiry: i64,
    /// Refresh token lifetime in seconds
    pub refresh_token_expiry: i64,
    /// Expected `iss` claim
    pub issuer: String,
    /// Expected `aud` claim
    pub audience: String,
}

impl Default for TokenCodecConfig {
    fn default() -> Self {
        Self::from(&JwtConfig::default())
    }
}

impl From<&JwtConfig> for TokenCodecConfig {
    fn from(jwt: &JwtConfig) -> Self {
        Self {
            access_secret: jwt.access_secret.clone(),
            refresh_secret: jwt.refresh_secret.clone(),
            algorithm: Algorithm::HS256,
            access_token_expiry: jwt.access_token_expiry,
            refresh_token_expiry: jwt.refresh_token_expiry,
            issuer: jwt.issuer.clone(),
            audience: jwt.audience.clone(),
        }
    }
}

impl TokenCodecConfig {
    /// Create a configuration with explicit secrets and default lifetimes
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            ..Default::default()
        }
    }

    /// Set both lifetimes, in seconds
    pub fn with_lifetimes(mut self, access_seconds: i64, refresh_seconds: i64) -> Self {
        self.access_token_expiry = access_seconds;
        self.refresh_token_expiry = refresh_seconds;
        self
    }
}
