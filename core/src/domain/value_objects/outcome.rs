//! Outcome types returned by the engine.
//!
//! Every expected condition a presented token can be in is a variant here,
//! so callers branch on values instead of catching errors. Only
//! infrastructure faults travel as `Err(DomainError)`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::domain::entities::token::{RefreshTokenRecord, TokenPair};

/// Why a presented refresh token was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RejectReason {
    /// Bad signature, bad shape or wrong token class
    Malformed,
    /// Valid signature but no matching record in the store
    Reuse,
    /// Matching record exists but is already revoked
    Replay,
    /// Past its expiry; benign
    Expired,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::Malformed => write!(f, "malformed"),
            RejectReason::Reuse => write!(f, "reuse"),
            RejectReason::Replay => write!(f, "replay"),
            RejectReason::Expired => write!(f, "expired"),
        }
    }
}

/// Classification of a presented refresh token, first match wins:
/// malformed, absent (reuse), revoked (replay), expired, active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenState {
    Malformed,
    Reuse { subject_id: Uuid },
    Replay { record: RefreshTokenRecord },
    Expired,
    Active { record: RefreshTokenRecord },
}

impl TokenState {
    /// The rejection this state maps to, `None` for an active token
    pub fn reject_reason(&self) -> Option<RejectReason> {
        match self {
            TokenState::Malformed => Some(RejectReason::Malformed),
            TokenState::Reuse { .. } => Some(RejectReason::Reuse),
            TokenState::Replay { .. } => Some(RejectReason::Replay),
            TokenState::Expired => Some(RejectReason::Expired),
            TokenState::Active { .. } => None,
        }
    }
}

/// Result of a successful rotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotatedSession {
    /// Owner of the rotated session
    pub subject_id: Uuid,
    /// Fresh access and refresh tokens
    pub tokens: TokenPair,
    /// Record created for the new refresh token
    pub record_id: Uuid,
    /// Record revoked by this rotation
    pub previous_record_id: Uuid,
}

/// Result of `rotate`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationOutcome {
    Rotated(RotatedSession),
    Rejected(RejectReason),
}

impl RotationOutcome {
    pub fn is_rotated(&self) -> bool {
        matches!(self, RotationOutcome::Rotated(_))
    }

    pub fn reject_reason(&self) -> Option<RejectReason> {
        match self {
            RotationOutcome::Rejected(reason) => Some(*reason),
            RotationOutcome::Rotated(_) => None,
        }
    }
}

/// Result of a single-session logout. Every variant counts as success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevokeOutcome {
    /// An active record was revoked by this call
    Revoked,
    /// Unknown token, or already revoked
    AlreadyInactive,
    /// The store could not be reached; the client should still drop the token
    Unconfirmed,
}

impl RevokeOutcome {
    pub fn is_success(&self) -> bool {
        true
    }
}

/// Result of compromise containment
#[derive(Debug)]
pub struct ContainmentReport {
    /// Subject whose sessions were revoked
    pub subject_id: Uuid,
    /// Number of active records revoked
    pub revoked_sessions: usize,
    /// Detached alert dispatch; dropping it does not cancel delivery
    pub alert_task: JoinHandle<()>,
}

/// Result of redeeming a recovery token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    Completed { subject_id: Uuid, revoked_sessions: usize },
    Rejected,
}

/// Public view of an active session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<&RefreshTokenRecord> for SessionSummary {
    fn from(record: &RefreshTokenRecord) -> Self {
        Self {
            id: record.id,
            created_at: record.created_at,
            expires_at: record.expires_at,
        }
    }
}
