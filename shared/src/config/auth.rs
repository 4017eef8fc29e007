//! Authentication configuration: token signing and recovery settings

use serde::{Deserialize, Serialize};

use super::ConfigError;

const DEFAULT_ACCESS_SECRET: &str = "development-access-secret-change-in-production";
const DEFAULT_REFRESH_SECRET: &str = "development-refresh-secret-change-in-production";

/// Longest accepted access or refresh token lifetime, one year
pub const MAX_TOKEN_EXPIRY: i64 = 365 * 86400;

/// Longest accepted recovery token lifetime, one day
pub const MAX_RECOVERY_EXPIRY: i64 = 86400;

/// JWT signing configuration
///
/// Access and refresh tokens are signed with distinct secrets so that a
/// token of one class can never verify as the other.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Secret used to sign access tokens
    pub access_secret: String,

    /// Secret used to sign refresh tokens
    pub refresh_secret: String,

    /// Access token expiry time in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiry time in seconds
    pub refresh_token_expiry: i64,

    /// JWT issuer claim
    pub issuer: String,

    /// JWT audience claim
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            access_secret: String::from(DEFAULT_ACCESS_SECRET),
            refresh_secret: String::from(DEFAULT_REFRESH_SECRET),
            access_token_expiry: 900,     // 15 minutes
            refresh_token_expiry: 604800, // 7 days
            issuer: String::from("tokenwarden"),
            audience: String::from("tokenwarden-api"),
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with both secrets
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            ..Default::default()
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86400;
        self
    }

    /// Check if using a default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.access_secret == DEFAULT_ACCESS_SECRET || self.refresh_secret == DEFAULT_REFRESH_SECRET
    }

    /// Reject configurations the codec cannot safely run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.access_secret.is_empty() || self.refresh_secret.is_empty() {
            return Err(ConfigError::Invalid {
                field: "jwt secret".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.access_secret == self.refresh_secret {
            return Err(ConfigError::Invalid {
                field: "jwt secret".to_string(),
                reason: "access and refresh secrets must differ".to_string(),
            });
        }
        for expiry in [self.access_token_expiry, self.refresh_token_expiry] {
            if expiry <= 0 || expiry > MAX_TOKEN_EXPIRY {
                return Err(ConfigError::Invalid {
                    field: "jwt expiry".to_string(),
                    reason: format!("durations must be between 1 and {} seconds", MAX_TOKEN_EXPIRY),
                });
            }
        }
        Ok(())
    }
}

/// Recovery token configuration shared by compromise handling and password reset
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecoveryConfig {
    /// Recovery token expiry time in seconds
    pub token_expiry: i64,

    /// Base URL of the recovery page, the token is appended as a query parameter
    pub recovery_url_base: String,

    /// Base URL of the password reset page
    pub reset_url_base: String,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            token_expiry: 600, // 10 minutes
            recovery_url_base: String::from("http://localhost:3000/account/recover"),
            reset_url_base: String::from("http://localhost:3000/account/reset-password"),
        }
    }
}

impl RecoveryConfig {
    /// Expiry in whole minutes, as shown to the user in notifications
    pub fn expiry_minutes(&self) -> i64 {
        (self.token_expiry + 59) / 60
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT configuration
    pub jwt: JwtConfig,

    /// Recovery configuration
    #[serde(default)]
    pub recovery: RecoveryConfig,
}

impl AuthConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = JwtConfig::default();
        let recovery_defaults = RecoveryConfig::default();

        let access_secret = std::env::var("JWT_ACCESS_SECRET").unwrap_or(defaults.access_secret);
        let refresh_secret = std::env::var("JWT_REFRESH_SECRET").unwrap_or(defaults.refresh_secret);
        let access_token_expiry = std::env::var("JWT_ACCESS_TOKEN_EXPIRY")
            .unwrap_or_else(|_| "900".to_string())
            .parse()
            .unwrap_or(900);
        let refresh_token_expiry = std::env::var("JWT_REFRESH_TOKEN_EXPIRY")
            .unwrap_or_else(|_| "604800".to_string())
            .parse()
            .unwrap_or(604800);
        let recovery_expiry = std::env::var("RECOVERY_TOKEN_EXPIRY")
            .unwrap_or_else(|_| "600".to_string())
            .parse()
            .unwrap_or(600);

        Self {
            jwt: JwtConfig {
                access_secret,
                refresh_secret,
                access_token_expiry,
                refresh_token_expiry,
                issuer: defaults.issuer,
                audience: defaults.audience,
            },
            recovery: RecoveryConfig {
                token_expiry: recovery_expiry,
                recovery_url_base: std::env::var("RECOVERY_URL_BASE")
                    .unwrap_or(recovery_defaults.recovery_url_base),
                reset_url_base: std::env::var("RESET_URL_BASE")
                    .unwrap_or(recovery_defaults.reset_url_base),
            },
        }
    }

    /// Validate the whole authentication section
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.jwt.validate()?;
        if self.recovery.token_expiry <= 0 || self.recovery.token_expiry > MAX_RECOVERY_EXPIRY {
            return Err(ConfigError::Invalid {
                field: "recovery token expiry".to_string(),
                reason: format!("must be between 1 and {} seconds", MAX_RECOVERY_EXPIRY),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_config_default() {
        let config = JwtConfig::default();
        assert_eq!(config.access_token_expiry, 900);
        assert_eq!(config.refresh_token_expiry, 604800);
        assert!(config.is_using_default_secret());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_jwt_config_builder() {
        let config = JwtConfig::new("access", "refresh")
            .with_access_expiry_minutes(30)
            .with_refresh_expiry_days(14);

        assert_eq!(config.access_token_expiry, 1800);
        assert_eq!(config.refresh_token_expiry, 1209600);
        assert!(!config.is_using_default_secret());
    }

    #[test]
    fn test_identical_secrets_rejected() {
        let config = JwtConfig::new("same", "same");
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_non_positive_expiry_rejected() {
        let config = JwtConfig::new("a", "b").with_access_expiry_minutes(0);
        assert!(config.validate().is_err());

        let mut auth = AuthConfig::default();
        auth.recovery.token_expiry = -1;
        assert!(auth.validate().is_err());
    }

    #[test]
    fn test_oversized_expiry_rejected() {
        let mut auth = AuthConfig::default();
        auth.recovery.token_expiry = 100_000_000_000_000;
        assert!(auth.validate().is_err());

        auth.recovery.token_expiry = MAX_RECOVERY_EXPIRY;
        assert!(auth.validate().is_ok());

        auth.jwt.refresh_token_expiry = MAX_TOKEN_EXPIRY + 1;
        assert!(auth.validate().is_err());

        let config = JwtConfig::new("a", "b").with_access_expiry_minutes(i64::MAX / 120);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_recovery_expiry_minutes_rounds_up() {
        let mut config = RecoveryConfig::default();
        assert_eq!(config.expiry_minutes(), 10);

        config.token_expiry = 61;
        assert_eq!(config.expiry_minutes(), 2);
    }
}
