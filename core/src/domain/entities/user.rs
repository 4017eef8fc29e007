//! User entity: the subject that owns refresh-token records.
//!
//! Users are managed by the surrounding application. The engine reads the
//! identifier, the active flag and the contact address, and writes the
//! recovery token digest during compromise handling and password reset.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Prefix that keeps recovery tokens out of the refresh-token namespace
pub const RECOVERY_TOKEN_PREFIX: &str = "rcv_";

/// Number of random bytes in a recovery token
const RECOVERY_TOKEN_BYTES: usize = 32;

/// Role of a user in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Job seeker
    Candidate,
    /// Posts and manages jobs
    Employer,
    /// Reviews listings and profiles
    Moderator,
    /// Full administrative access
    Admin,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Candidate => write!(f, "candidate"),
            UserRole::Employer => write!(f, "employer"),
            UserRole::Moderator => write!(f, "moderator"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "candidate" => Ok(UserRole::Candidate),
            "employer" => Ok(UserRole::Employer),
            "moderator" => Ok(UserRole::Moderator),
            "admin" => Ok(UserRole::Admin),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// User entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,

    /// Contact address for security notifications
    pub email: String,

    /// Role of the user
    pub role: UserRole,

    /// Inactive users cannot be issued new sessions
    pub is_active: bool,

    /// Digest of the outstanding recovery token, if any
    pub recovery_token_hash: Option<String>,

    /// Expiry of the outstanding recovery token
    pub recovery_expires_at: Option<DateTime<Utc>>,

    /// Timestamp when the user was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the user was last updated
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new active user
    pub fn new(email: impl Into<String>, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            role,
            is_active: true,
            recovery_token_hash: None,
            recovery_expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Attaches a recovery grant, replacing any previous one
    pub fn attach_recovery(&mut self, grant: &RecoveryGrant, now: DateTime<Utc>) {
        self.recovery_token_hash = Some(grant.token_hash.clone());
        self.recovery_expires_at = Some(grant.expires_at);
        self.updated_at = now;
    }

    /// Clears the outstanding recovery grant
    pub fn clear_recovery(&mut self, now: DateTime<Utc>) {
        self.recovery_token_hash = None;
        self.recovery_expires_at = None;
        self.updated_at = now;
    }

    /// Whether the user holds an unexpired recovery grant with `token_hash`
    pub fn has_recovery(&self, token_hash: &str, now: DateTime<Utc>) -> bool {
        match (&self.recovery_token_hash, self.recovery_expires_at) {
            (Some(stored), Some(expires_at)) => {
                expires_at > now && constant_time_eq::constant_time_eq(stored.as_bytes(), token_hash.as_bytes())
            }
            _ => false,
        }
    }
}

/// Server-side half of a recovery token: its digest and expiry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryGrant {
    /// SHA-256 digest of the recovery token
    pub token_hash: String,

    /// When the recovery token stops being redeemable
    pub expires_at: DateTime<Utc>,
}

impl RecoveryGrant {
    /// Generates a fresh random recovery token.
    ///
    /// Returns the plaintext (to be delivered out of band) and the grant to
    /// persist on the user, or `None` when `now + ttl_seconds` is out of range.
    pub fn generate(now: DateTime<Utc>, ttl_seconds: i64) -> Option<(String, Self)> {
        let expires_at = now.checked_add_signed(Duration::try_seconds(ttl_seconds)?)?;
        let mut bytes = [0u8; RECOVERY_TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        let token = format!("{}{}", RECOVERY_TOKEN_PREFIX, URL_SAFE_NO_PAD.encode(bytes));
        let grant = Self {
            token_hash: Self::hash_token(&token),
            expires_at,
        };
        Some((token, grant))
    }

    /// Digest used to address a recovery token
    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Whether a presented string is shaped like a recovery token
    pub fn looks_like_recovery_token(token: &str) -> bool {
        token.starts_with(RECOVERY_TOKEN_PREFIX) && token.len() > RECOVERY_TOKEN_PREFIX.len()
    }
}
