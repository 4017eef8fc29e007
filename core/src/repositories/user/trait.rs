//! User repository trait: the parts of the externally owned user table the engine touches.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::user::{RecoveryGrant, User};
use crate::errors::DomainError;

/// Repository trait for the subject side of the credential store
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError>;

    /// Find a user by contact address
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Attach a recovery grant to a user, replacing any previous one
    ///
    /// # Returns
    /// * `Ok(false)` - No such user
    async fn store_recovery_grant(
        &self,
        user_id: Uuid,
        grant: &RecoveryGrant,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError>;

    /// Redeem a recovery token: find the user holding an unexpired grant with
    /// `token_hash`, clear it, and return the user id. A grant can be consumed
    /// once.
    async fn consume_recovery_grant(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>, DomainError>;
}
