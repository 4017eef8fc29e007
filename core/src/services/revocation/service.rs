//! Session revocation implementation

use std::sync::Arc;

use tracing::{debug, error, info};
use uuid::Uuid;

use crate::clock::Clock;
use crate::domain::entities::token::{RefreshTokenRecord, TokenClass};
use crate::domain::value_objects::RevokeOutcome;
use crate::errors::DomainError;
use crate::repositories::TokenRepository;
use crate::services::token::TokenCodec;

/// Revokes one session or all sessions of a subject
pub struct SessionRevocation<R> {
    tokens: Arc<R>,
    codec: Arc<TokenCodec>,
    clock: Arc<dyn Clock>,
}

impl<R: TokenRepository> SessionRevocation<R> {
    /// Create a new session revocation service
    pub fn new(tokens: Arc<R>, codec: Arc<TokenCodec>, clock: Arc<dyn Clock>) -> Self {
        Self {
            tokens,
            codec,
            clock,
        }
    }

    /// Log out the session behind one refresh token
    ///
    /// The token is verified only to enrich the log; an unverifiable token is
    /// still looked up by digest. Every outcome counts as success, including
    /// a store failure, because the client drops the token either way.
    pub async fn revoke_one(&self, token: &str) -> RevokeOutcome {
        match self.codec.verify(token, TokenClass::Refresh) {
            Ok(claims) => debug!(subject_id = %claims.sub, "Logout for verified refresh token"),
            Err(e) => debug!(reason = %e, "Logout token did not verify; revoking by digest"),
        }

        let token_hash = RefreshTokenRecord::hash_token(token);
        match self.tokens.revoke_token(&token_hash, self.clock.now()).await {
            Ok(true) => {
                info!("Session revoked on logout");
                RevokeOutcome::Revoked
            }
            Ok(false) => RevokeOutcome::AlreadyInactive,
            Err(e) => {
                error!(error = %e, "Logout could not be recorded");
                RevokeOutcome::Unconfirmed
            }
        }
    }

    /// Revoke every active session of a subject
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of sessions revoked
    pub async fn revoke_all(&self, subject_id: Uuid) -> Result<usize, DomainError> {
        let revoked = self
            .tokens
            .revoke_all_user_tokens(subject_id, self.clock.now())
            .await?;
        info!(subject_id = %subject_id, revoked_sessions = revoked, "Revoked all sessions");
        Ok(revoked)
    }
}
