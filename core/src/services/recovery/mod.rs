//! Password recovery
//!
//! Issues recovery tokens on request and redeems them, including the ones
//! handed out by compromise containment. Redemption ends every session of
//! the subject.

mod service;

pub use service::PasswordRecoveryService;
