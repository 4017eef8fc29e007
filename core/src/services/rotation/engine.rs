//! Rotation engine implementation

use std::sync::Arc;

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::domain::entities::token::{RefreshTokenRecord, TokenClass, TokenPair};
use crate::domain::value_objects::{
    RejectReason, RotatedSession, RotationOutcome, SessionSummary, TokenState,
};
use crate::errors::{DomainError, TokenError};
use crate::repositories::{RotationCommit, TokenRepository, UserRepository};
use crate::services::compromise::CompromiseHandler;
use crate::services::notification::NotificationService;
use crate::services::token::{IssuedToken, TokenCodec};

/// Issues token pairs and rotates refresh tokens
pub struct RotationEngine<R, U, N> {
    tokens: Arc<R>,
    users: Arc<U>,
    codec: Arc<TokenCodec>,
    compromise: Arc<CompromiseHandler<R, U, N>>,
    clock: Arc<dyn Clock>,
}

impl<R, U, N> RotationEngine<R, U, N>
where
    R: TokenRepository + 'static,
    U: UserRepository + 'static,
    N: NotificationService + 'static,
{
    /// Create a new rotation engine
    pub fn new(
        tokens: Arc<R>,
        users: Arc<U>,
        codec: Arc<TokenCodec>,
        compromise: Arc<CompromiseHandler<R, U, N>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tokens,
            users,
            codec,
            compromise,
            clock,
        }
    }

    /// Mint an access/refresh pair for a freshly authenticated subject and
    /// persist the refresh half
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - The new pair
    /// * `Err(DomainError::Unauthorized)` - Unknown or inactive subject
    /// * `Err(DomainError)` - Store or codec failure
    pub async fn issue_pair(&self, subject_id: Uuid) -> Result<TokenPair, DomainError> {
        let user = self
            .users
            .find_by_id(subject_id)
            .await?
            .ok_or(DomainError::Unauthorized)?;
        if !user.is_active {
            warn!(subject_id = %subject_id, "Refusing to issue tokens for inactive subject");
            return Err(DomainError::Unauthorized);
        }

        let access = self.codec.issue_access_token(subject_id)?;
        let refresh = self.codec.issue_refresh_token(subject_id)?;
        let record = self
            .tokens
            .save_refresh_token(self.record_for(subject_id, &refresh)?)
            .await?;

        info!(subject_id = %subject_id, record_id = %record.id, "Issued new session");
        Ok(self.pair(access, refresh))
    }

    /// Classify a presented refresh token without changing anything
    ///
    /// Precedence, first match wins: malformed, absent (reuse), revoked
    /// (replay), expired, active. The store-side part is the same
    /// [`RotationCommit::screen`] that rotation runs inside its transaction.
    pub async fn classify(&self, token: &str) -> Result<TokenState, DomainError> {
        let subject_id = match self.decode_presented(token) {
            Ok(subject_id) => subject_id,
            Err(RejectReason::Expired) => return Ok(TokenState::Expired),
            Err(_) => return Ok(TokenState::Malformed),
        };

        let token_hash = RefreshTokenRecord::hash_token(token);
        let found = self.tokens.find_refresh_token(&token_hash).await?;
        let state = match RotationCommit::screen(found, self.clock.now()) {
            Ok(record) => TokenState::Active { record },
            Err(RotationCommit::Absent) => TokenState::Reuse { subject_id },
            Err(RotationCommit::Revoked(record)) => TokenState::Replay { record },
            Err(_) => TokenState::Expired,
        };
        Ok(state)
    }

    /// Exchange a refresh token for a new pair
    ///
    /// Reuse and replay trigger compromise containment before returning
    /// `Rejected`. Containment failures are logged and still reported as a
    /// plain rejection.
    ///
    /// # Returns
    ///
    /// * `Ok(RotationOutcome::Rotated)` - The presented record is revoked and
    ///   linked to the new one
    /// * `Ok(RotationOutcome::Rejected)` - Malformed, reuse, replay or expired
    /// * `Err(DomainError)` - The store or codec failed; nothing was written
    ///   and no containment was attempted
    pub async fn rotate(&self, token: &str) -> Result<RotationOutcome, DomainError> {
        let subject_id = match self.decode_presented(token) {
            Ok(subject_id) => subject_id,
            Err(reason) => {
                debug!(classification = %reason, "Refresh token rejected before store lookup");
                return Ok(RotationOutcome::Rejected(reason));
            }
        };

        let access = self.codec.issue_access_token(subject_id)?;
        let refresh = self.codec.issue_refresh_token(subject_id)?;
        let successor = self.record_for(subject_id, &refresh)?;
        let presented_hash = RefreshTokenRecord::hash_token(token);

        let commit = self
            .tokens
            .rotate_refresh_token(&presented_hash, successor, self.clock.now())
            .await?;

        match commit {
            RotationCommit::Rotated {
                previous,
                successor,
            } => {
                info!(
                    subject_id = %previous.user_id,
                    record_id = %successor.id,
                    previous_record_id = %previous.id,
                    "Rotated refresh token"
                );
                Ok(RotationOutcome::Rotated(RotatedSession {
                    subject_id: previous.user_id,
                    tokens: self.pair(access, refresh),
                    record_id: successor.id,
                    previous_record_id: previous.id,
                }))
            }
            RotationCommit::Absent => Ok(self.escalate(subject_id, RejectReason::Reuse).await),
            RotationCommit::Revoked(record) => {
                warn!(
                    record_id = %record.id,
                    token_hash = record.hash_prefix(),
                    "Revoked refresh token presented again"
                );
                Ok(self.escalate(record.user_id, RejectReason::Replay).await)
            }
            RotationCommit::Expired(record) => {
                debug!(record_id = %record.id, classification = "expired", "Refresh token rejected");
                Ok(RotationOutcome::Rejected(RejectReason::Expired))
            }
        }
    }

    /// Active sessions of a subject, newest first
    pub async fn active_sessions(&self, subject_id: Uuid) -> Result<Vec<SessionSummary>, DomainError> {
        let records = self
            .tokens
            .find_active_by_user_id(subject_id, self.clock.now())
            .await?;
        Ok(records.iter().map(SessionSummary::from).collect())
    }

    /// The rotation chain starting at `record_id`
    ///
    /// # Returns
    ///
    /// * `Err(DomainError::NotFound)` - No record with `record_id`
    pub async fn chain(&self, record_id: Uuid) -> Result<Vec<RefreshTokenRecord>, DomainError> {
        let chain = self.tokens.rotation_chain(record_id).await?;
        if chain.is_empty() {
            return Err(DomainError::NotFound {
                resource: format!("refresh token record {}", record_id),
            });
        }
        Ok(chain)
    }

    async fn escalate(&self, subject_id: Uuid, reason: RejectReason) -> RotationOutcome {
        warn!(
            subject_id = %subject_id,
            classification = %reason,
            event = "refresh_token_theft_suspected",
            "Refresh token {} detected",
            reason
        );

        match self.compromise.contain(subject_id, reason).await {
            // The alert task stays detached
            Ok(_report) => {}
            Err(e) => error!(
                subject_id = %subject_id,
                error = %e,
                "Compromise containment failed"
            ),
        }

        RotationOutcome::Rejected(reason)
    }

    /// Verify a presented refresh token cryptographically and return its subject
    fn decode_presented(&self, token: &str) -> Result<Uuid, RejectReason> {
        let claims = match self.codec.verify(token, TokenClass::Refresh) {
            Ok(claims) => claims,
            Err(TokenError::TokenExpired) => return Err(RejectReason::Expired),
            Err(_) => return Err(RejectReason::Malformed),
        };
        claims.user_id().map_err(|_| RejectReason::Malformed)
    }

    fn record_for(
        &self,
        subject_id: Uuid,
        refresh: &IssuedToken,
    ) -> Result<RefreshTokenRecord, DomainError> {
        let expires_at = refresh
            .claims
            .expires_at()
            .ok_or(DomainError::Token(TokenError::TokenGenerationFailed))?;
        Ok(RefreshTokenRecord::new(
            subject_id,
            RefreshTokenRecord::hash_token(&refresh.token),
            self.clock.now(),
            expires_at,
        ))
    }

    fn pair(&self, access: IssuedToken, refresh: IssuedToken) -> TokenPair {
        TokenPair::new(
            access.token,
            refresh.token,
            self.codec.access_token_ttl(),
            self.codec.refresh_token_ttl(),
        )
    }
}
