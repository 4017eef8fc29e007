//! Business services containing domain logic and use cases.

pub mod compromise;
pub mod notification;
pub mod recovery;
pub mod revocation;
pub mod rotation;
pub mod token;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use compromise::CompromiseHandler;
pub use notification::{link_with_token, NotificationService};
pub use recovery::PasswordRecoveryService;
pub use revocation::SessionRevocation;
pub use rotation::RotationEngine;
pub use token::{IssuedToken, TokenCodec, TokenCodecConfig};
