//! Configuration module with business-specific sub-modules
//!
//! - `auth` - token signing, durations and recovery settings
//! - `database` - credential store connection pool
//! - `environment` - environment detection and logging
//! - `notification` - security alert delivery
//! - `server` - HTTP server and request deadline
//!
//! Configuration is read once at process start and is immutable afterwards.

pub mod auth;
pub mod database;
pub mod environment;
pub mod notification;
pub mod server;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export commonly used types
pub use auth::{AuthConfig, JwtConfig, RecoveryConfig};
pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use notification::{NotificationConfig, NotificationProvider};
pub use server::ServerConfig;

/// Configuration errors detected at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {field}: {reason}")]
    Invalid { field: String, reason: String },
}

/// Credential store backend selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// MySQL via the connection pool
    #[default]
    Mysql,
    /// Process-local store, development only
    Memory,
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Credential store backend
    #[serde(default)]
    pub store: StoreBackend,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Authentication configuration
    pub auth: AuthConfig,

    /// Notification configuration
    #[serde(default)]
    pub notification: NotificationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            server: ServerConfig::default(),
            store: StoreBackend::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            notification: NotificationConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        let mut logging = LoggingConfig::for_environment(environment);
        if let Ok(level) = std::env::var("RUST_LOG") {
            logging.level = level;
        }
        let store = match std::env::var("STORE_BACKEND").as_deref() {
            Ok("memory") => StoreBackend::Memory,
            _ => StoreBackend::Mysql,
        };

        Self {
            environment,
            server: ServerConfig::from_env(),
            store,
            database: DatabaseConfig::from_env(),
            auth: AuthConfig::from_env(),
            notification: NotificationConfig::from_env(),
            logging,
        }
    }

    /// Validate the loaded configuration before any service is constructed
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.auth.validate()?;
        if self.store == StoreBackend::Mysql {
            self.database.validate()?;
        }
        if self.environment.is_production() {
            if self.auth.jwt.is_using_default_secret() {
                return Err(ConfigError::Invalid {
                    field: "jwt secret".to_string(),
                    reason: "default secrets are not allowed in production".to_string(),
                });
            }
            if self.store == StoreBackend::Memory {
                return Err(ConfigError::Invalid {
                    field: "store".to_string(),
                    reason: "the in-memory store is not allowed in production".to_string(),
                });
            }
        }
        Ok(())
    }
}
