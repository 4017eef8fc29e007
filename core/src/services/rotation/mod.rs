//! Rotation engine
//!
//! Classifies a presented refresh token and either exchanges it for a new
//! pair or hands the subject to the compromise handler. Classification of a
//! token that is about to be rotated happens inside the store transaction.

mod engine;

pub use engine::RotationEngine;
