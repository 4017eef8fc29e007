//! Value objects representing immutable domain concepts.

pub mod outcome;

// Re-export commonly used types
pub use outcome::{
    ContainmentReport, RejectReason, ResetOutcome, RevokeOutcome, RotatedSession,
    RotationOutcome, SessionSummary, TokenState,
};
