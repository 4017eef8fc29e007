//! Token entities: JWT claims, persisted refresh-token records and issued pairs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// The two classes of bearer token the codec produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenClass {
    /// Short-lived credential authorizing individual API calls
    Access,
    /// Long-lived credential exchanged for a new pair; tracked server-side
    Refresh,
}

impl std::fmt::Display for TokenClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenClass::Access => write!(f, "access"),
            TokenClass::Refresh => write!(f, "refresh"),
        }
    }
}

/// Claims structure for JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    /// JWT ID, unique per issued token
    pub jti: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// Token class
    pub typ: TokenClass,
}

impl Claims {
    /// Creates claims for a token of `class` issued at `now` and valid for `ttl_seconds`
    ///
    /// Returns `None` when the expiry does not fit in a timestamp.
    pub fn new(
        class: TokenClass,
        user_id: Uuid,
        now: DateTime<Utc>,
        ttl_seconds: i64,
        issuer: &str,
        audience: &str,
    ) -> Option<Self> {
        let exp = now.timestamp().checked_add(ttl_seconds)?;
        DateTime::<Utc>::from_timestamp(exp, 0)?;
        Some(Self {
            sub: user_id.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp,
            iss: issuer.to_string(),
            aud: audience.to_string(),
            typ: class,
        })
    }

    /// Checks if the claims have expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    /// Gets the user ID from the claims
    pub fn user_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sub)
    }

    /// Gets the token ID from the claims
    pub fn token_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.jti)
    }

    /// Expiry as a timestamp, `None` when out of range
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp(self.exp, 0)
    }
}

/// Refresh token record stored in the credential store.
///
/// Only the digest of the bearer string is persisted. Records are never
/// deleted by the engine; they form the replay-detection trail. The only
/// mutation after creation is flipping `is_revoked`, `revoked_at` and
/// `replaced_by_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    /// Unique identifier for the record
    pub id: Uuid,

    /// SHA-256 digest of the bearer token, unique across all records
    pub token_hash: String,

    /// Owning subject
    pub user_id: Uuid,

    /// Timestamp when the record was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the token expires
    pub expires_at: DateTime<Utc>,

    /// Whether the token has been revoked
    pub is_revoked: bool,

    /// Set whenever `is_revoked` is
    pub revoked_at: Option<DateTime<Utc>>,

    /// The record that superseded this one during rotation
    pub replaced_by_id: Option<Uuid>,
}

impl RefreshTokenRecord {
    /// Creates a new, active record
    pub fn new(
        user_id: Uuid,
        token_hash: String,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            token_hash,
            user_id,
            created_at,
            expires_at,
            is_revoked: false,
            revoked_at: None,
            replaced_by_id: None,
        }
    }

    /// Digest used to address a bearer token in the store
    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Checks if the record has expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// A record is active iff it is not revoked and not expired
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_revoked && !self.is_expired_at(now)
    }

    /// Revokes the record; a record already revoked keeps its original `revoked_at`
    pub fn revoke(&mut self, now: DateTime<Utc>) {
        if !self.is_revoked {
            self.is_revoked = true;
            self.revoked_at = Some(now);
        }
    }

    /// Revokes the record as part of a rotation to `successor_id`
    pub fn revoke_for_successor(&mut self, successor_id: Uuid, now: DateTime<Utc>) {
        self.revoke(now);
        self.replaced_by_id = Some(successor_id);
    }

    /// Short, non-reversible label for logs
    pub fn hash_prefix(&self) -> &str {
        self.token_hash.get(..12).unwrap_or(&self.token_hash)
    }
}

/// Token pair returned to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// JWT access token
    pub access_token: String,

    /// JWT refresh token
    pub refresh_token: String,

    /// Access token expiry time in seconds
    pub access_expires_in: i64,

    /// Refresh token expiry time in seconds
    pub refresh_expires_in: i64,
}

impl TokenPair {
    /// Creates a new token pair
    pub fn new(
        access_token: String,
        refresh_token: String,
        access_expires_in: i64,
        refresh_expires_in: i64,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            access_expires_in,
            refresh_expires_in,
        }
    }
}
