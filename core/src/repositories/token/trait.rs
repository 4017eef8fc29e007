//! Token repository trait defining the interface for refresh-token persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::token::RefreshTokenRecord;
use crate::domain::entities::user::RecoveryGrant;
use crate::errors::DomainError;

/// What the store found when it tried to rotate a presented token.
///
/// Produced inside the same transaction that performs the writes, so the
/// classification cannot go stale between the check and the mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationCommit {
    /// The presented record was active; it is now revoked and linked to `successor`
    Rotated {
        previous: RefreshTokenRecord,
        successor: RefreshTokenRecord,
    },
    /// No record carries the presented digest
    Absent,
    /// The presented record was already revoked; nothing was written
    Revoked(RefreshTokenRecord),
    /// The presented record is past its expiry; nothing was written
    Expired(RefreshTokenRecord),
}

impl RotationCommit {
    /// Decide whether a looked-up record may be rotated at `now`
    ///
    /// Precedence, first match wins: absent, revoked, expired. `Ok` carries
    /// the active record; `Err` is one of `Absent`, `Revoked` or `Expired`
    /// and nothing should be written.
    pub fn screen(
        found: Option<RefreshTokenRecord>,
        now: DateTime<Utc>,
    ) -> Result<RefreshTokenRecord, RotationCommit> {
        match found {
            None => Err(RotationCommit::Absent),
            Some(record) if record.is_revoked => Err(RotationCommit::Revoked(record)),
            Some(record) if record.is_expired_at(now) => Err(RotationCommit::Expired(record)),
            Some(record) => Ok(record),
        }
    }
}

/// Repository trait for refresh-token records
///
/// # Contract
/// - `token_hash` is unique across all records; inserting a duplicate fails
///   with `DomainError::Conflict`
/// - records are never deleted through this trait
/// - `rotate_refresh_token` and `contain_compromise` are atomic: either every
///   write they describe commits or none does
/// - a lost race on `rotate_refresh_token` surfaces as `Revoked` to the loser,
///   never as a second successor
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Save a new refresh-token record
    ///
    /// # Returns
    /// * `Ok(RefreshTokenRecord)` - The saved record
    /// * `Err(DomainError::Conflict)` - A record with the same digest exists
    async fn save_refresh_token(
        &self,
        record: RefreshTokenRecord,
    ) -> Result<RefreshTokenRecord, DomainError>;

    /// Find a record by token digest
    async fn find_refresh_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, DomainError>;

    /// Find a record by id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<RefreshTokenRecord>, DomainError>;

    /// All records of a user that are active at `now`, newest first
    async fn find_active_by_user_id(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<RefreshTokenRecord>, DomainError>;

    /// Atomically classify the record addressed by `presented_hash` and, if it
    /// is active, insert `successor` and revoke the presented record with
    /// `replaced_by_id = successor.id`.
    ///
    /// Implementations must lock the presented row (or run serializable) so
    /// two concurrent calls for the same digest cannot both see it active.
    async fn rotate_refresh_token(
        &self,
        presented_hash: &str,
        successor: RefreshTokenRecord,
        now: DateTime<Utc>,
    ) -> Result<RotationCommit, DomainError>;

    /// Revoke a single record if it is not yet revoked
    ///
    /// # Returns
    /// * `Ok(true)` - This call revoked the record
    /// * `Ok(false)` - Unknown digest, or already revoked
    async fn revoke_token(&self, token_hash: &str, now: DateTime<Utc>) -> Result<bool, DomainError>;

    /// Revoke every active record of a user in one bulk operation
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of records revoked
    async fn revoke_all_user_tokens(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<usize, DomainError>;

    /// Attach `grant` to the user and revoke every active record of the user,
    /// in one transaction.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of records revoked
    async fn contain_compromise(
        &self,
        user_id: Uuid,
        grant: &RecoveryGrant,
        now: DateTime<Utc>,
    ) -> Result<usize, DomainError>;

    /// Walk `replaced_by_id` links from `id` to the head of its rotation chain
    ///
    /// The first element is the record with `id`; the last one has no successor.
    async fn rotation_chain(&self, id: Uuid) -> Result<Vec<RefreshTokenRecord>, DomainError> {
        let mut chain = Vec::new();
        let mut next = Some(id);
        while let Some(current) = next {
            match self.find_by_id(current).await? {
                Some(record) => {
                    next = record.replaced_by_id;
                    chain.push(record);
                }
                None => break,
            }
        }
        Ok(chain)
    }

    /// Round-trip to the store, for readiness reporting
    async fn ping(&self) -> Result<(), DomainError>;
}
