//! # Tokenwarden Core
//!
//! Domain layer of the credential-lifecycle service: entities, repository
//! interfaces, error types and the services that issue, rotate and revoke
//! refresh tokens and contain suspected token theft.

pub mod clock;
pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
