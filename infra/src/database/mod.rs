//! Database module - MySQL implementations using SQLx
//!
//! This module provides:
//! - Connection pool management with an explicit open/close lifecycle
//! - The MySQL credential store (refresh tokens and the user columns the
//!   engine writes)
//! - Schema bootstrap and the one-time legacy token migration

pub mod connection;
pub mod migrations;
pub mod mysql;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use connection::DatabasePool;
pub use migrations::{is_legacy_plaintext, MigrationReport};
pub use mysql::{MySqlTokenRepository, MySqlUserRepository};
