//! Session revocation: single-session logout and "log out everywhere"

mod service;

pub use service::SessionRevocation;
