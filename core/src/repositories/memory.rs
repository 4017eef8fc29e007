//! In-memory credential store.
//!
//! Implements both [`TokenRepository`] and [`UserRepository`] over one lock,
//! so every multi-row operation is atomic with respect to every other one.
//! Used by the test suites and by the development profile of the server.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::token::RefreshTokenRecord;
use crate::domain::entities::user::{RecoveryGrant, User};
use crate::errors::DomainError;

use super::token::{RotationCommit, TokenRepository};
use super::user::UserRepository;

#[derive(Default)]
struct StoreState {
    tokens: HashMap<Uuid, RefreshTokenRecord>,
    token_ids_by_hash: HashMap<String, Uuid>,
    users: HashMap<Uuid, User>,
}

impl StoreState {
    fn insert_token(&mut self, record: RefreshTokenRecord) -> Result<(), DomainError> {
        if self.token_ids_by_hash.contains_key(&record.token_hash) {
            return Err(DomainError::Conflict {
                message: "Token already exists".to_string(),
            });
        }
        self.token_ids_by_hash.insert(record.token_hash.clone(), record.id);
        self.tokens.insert(record.id, record);
        Ok(())
    }

    fn token_by_hash_mut(&mut self, token_hash: &str) -> Option<&mut RefreshTokenRecord> {
        let id = self.token_ids_by_hash.get(token_hash)?;
        self.tokens.get_mut(id)
    }

    fn revoke_all_for(&mut self, user_id: Uuid, now: DateTime<Utc>) -> usize {
        let mut count = 0;
        for record in self.tokens.values_mut() {
            if record.user_id == user_id && record.is_active_at(now) {
                record.revoke(now);
                count += 1;
            }
        }
        count
    }
}

/// Credential store held in process memory
#[derive(Clone, Default)]
pub struct InMemoryCredentialStore {
    state: Arc<RwLock<StoreState>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryCredentialStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user
    pub async fn insert_user(&self, user: User) {
        let mut state = self.state.write().await;
        state.users.insert(user.id, user);
    }

    /// Make every subsequent operation fail as if the store were unreachable
    pub fn simulate_outage(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Snapshot of every record, for assertions
    pub async fn all_records(&self) -> Vec<RefreshTokenRecord> {
        let state = self.state.read().await;
        let mut records: Vec<_> = state.tokens.values().cloned().collect();
        records.sort_by_key(|r| r.created_at);
        records
    }

    fn check_available(&self) -> Result<(), DomainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::Internal {
                message: "credential store unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl TokenRepository for InMemoryCredentialStore {
    async fn save_refresh_token(
        &self,
        record: RefreshTokenRecord,
    ) -> Result<RefreshTokenRecord, DomainError> {
        self.check_available()?;
        let mut state = self.state.write().await;
        state.insert_token(record.clone())?;
        Ok(record)
    }

    async fn find_refresh_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, DomainError> {
        self.check_available()?;
        let state = self.state.read().await;
        Ok(state
            .token_ids_by_hash
            .get(token_hash)
            .and_then(|id| state.tokens.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<RefreshTokenRecord>, DomainError> {
        self.check_available()?;
        let state = self.state.read().await;
        Ok(state.tokens.get(&id).cloned())
    }

    async fn find_active_by_user_id(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<RefreshTokenRecord>, DomainError> {
        self.check_available()?;
        let state = self.state.read().await;
        let mut records: Vec<_> = state
            .tokens
            .values()
            .filter(|r| r.user_id == user_id && r.is_active_at(now))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn rotate_refresh_token(
        &self,
        presented_hash: &str,
        successor: RefreshTokenRecord,
        now: DateTime<Utc>,
    ) -> Result<RotationCommit, DomainError> {
        self.check_available()?;
        let mut state = self.state.write().await;

        let found = state
            .token_ids_by_hash
            .get(presented_hash)
            .and_then(|id| state.tokens.get(id))
            .cloned();
        if let Err(refused) = RotationCommit::screen(found, now) {
            return Ok(refused);
        }

        // Insert first: a digest conflict must leave the presented record untouched.
        state.insert_token(successor.clone())?;
        let previous = match state.token_by_hash_mut(presented_hash) {
            Some(record) => {
                record.revoke_for_successor(successor.id, now);
                record.clone()
            }
            None => {
                return Err(DomainError::Internal {
                    message: "presented record vanished during rotation".to_string(),
                })
            }
        };

        Ok(RotationCommit::Rotated {
            previous,
            successor,
        })
    }

    async fn revoke_token(&self, token_hash: &str, now: DateTime<Utc>) -> Result<bool, DomainError> {
        self.check_available()?;
        let mut state = self.state.write().await;
        match state.token_by_hash_mut(token_hash) {
            Some(record) if !record.is_revoked => {
                record.revoke(now);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_all_user_tokens(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        self.check_available()?;
        let mut state = self.state.write().await;
        Ok(state.revoke_all_for(user_id, now))
    }

    async fn ping(&self) -> Result<(), DomainError> {
        self.check_available()
    }

    async fn contain_compromise(
        &self,
        user_id: Uuid,
        grant: &RecoveryGrant,
        now: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        self.check_available()?;
        let mut state = self.state.write().await;
        if let Some(user) = state.users.get_mut(&user_id) {
            user.attach_recovery(grant, now);
        }
        Ok(state.revoke_all_for(user_id, now))
    }
}

#[async_trait]
impl UserRepository for InMemoryCredentialStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        self.check_available()?;
        let state = self.state.read().await;
        Ok(state.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        self.check_available()?;
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn store_recovery_grant(
        &self,
        user_id: Uuid,
        grant: &RecoveryGrant,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        self.check_available()?;
        let mut state = self.state.write().await;
        match state.users.get_mut(&user_id) {
            Some(user) => {
                user.attach_recovery(grant, now);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn consume_recovery_grant(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>, DomainError> {
        self.check_available()?;
        let mut state = self.state.write().await;
        match state.users.values_mut().find(|u| u.has_recovery(token_hash, now)) {
            Some(user) => {
                user.clear_recovery(now);
                Ok(Some(user.id))
            }
            None => Ok(None),
        }
    }
}
