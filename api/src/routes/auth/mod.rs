//! Authentication route handlers
//!
//! - Token refresh (rotation)
//! - Logout of one session and of every session
//! - Password reset request and completion

pub mod logout;
pub mod password_reset;
pub mod refresh;
pub mod state;

pub use state::AppState;
