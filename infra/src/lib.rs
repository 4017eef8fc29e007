//! # Infrastructure Layer
//!
//! Concrete implementations of the seams defined in `tw_core`:
//! - **Database**: MySQL credential store using SQLx, with row-locking
//!   transactions for rotation and compromise containment
//! - **Notification**: HTTP mail relay client and a logging mock
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)

// Re-export core types for convenience
pub use tw_core::errors::*;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// Notification module - security alert and password reset delivery
pub mod notification;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Schema bootstrap or data migration error
    #[error("Migration error: {0}")]
    Migration(String),
}
