//! Shared configuration and response types for the Tokenwarden server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types loaded once at process start
//! - The uniform error response body rendered by the API

pub mod config;
pub mod errors;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, ConfigError, StoreBackend, DatabaseConfig, Environment, JwtConfig, LoggingConfig,
    NotificationConfig, RecoveryConfig, ServerConfig,
};
pub use errors::{error_codes, ErrorResponse};
