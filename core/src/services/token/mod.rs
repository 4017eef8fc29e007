//! Token codec module
//!
//! Signs and verifies the two classes of bearer token:
//! - short-lived access tokens authorizing individual API calls
//! - long-lived refresh tokens exchanged through the rotation engine
//!
//! Verification is purely cryptographic and temporal; store membership is
//! checked by the rotation engine.

mod codec;
mod config;


pub use codec::{IssuedToken, TokenCodec};
pub use config::TokenCodecConfig;
