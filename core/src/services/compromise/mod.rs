//! Compromise containment
//!
//! Invoked by the rotation engine on reuse or replay. Revokes every active
//! session of the subject together with attaching a recovery grant, then
//! dispatches a security alert without waiting for it.

mod handler;

pub use handler::CompromiseHandler;
