//! Domain entities representing core business objects.

pub mod token;
pub mod user;

// Re-export commonly used types
pub use token::{Claims, RefreshTokenRecord, TokenClass, TokenPair};
pub use user::{RecoveryGrant, User, UserRole, RECOVERY_TOKEN_PREFIX};
