//! Password recovery implementation

use std::sync::Arc;

use tracing::{debug, error, info};
use tw_shared::RecoveryConfig;

use crate::clock::Clock;
use crate::domain::entities::user::RecoveryGrant;
use crate::domain::value_objects::ResetOutcome;
use crate::errors::DomainError;
use crate::repositories::{TokenRepository, UserRepository};
use crate::services::notification::{link_with_token, NotificationService};
use crate::services::revocation::SessionRevocation;

/// Issues and redeems password recovery tokens
pub struct PasswordRecoveryService<R, U, N> {
    users: Arc<U>,
    revocation: Arc<SessionRevocation<R>>,
    notifier: Arc<N>,
    clock: Arc<dyn Clock>,
    config: RecoveryConfig,
}

impl<R, U, N> PasswordRecoveryService<R, U, N>
where
    R: TokenRepository + 'static,
    U: UserRepository + 'static,
    N: NotificationService + 'static,
{
    /// Create a new password recovery service
    pub fn new(
        users: Arc<U>,
        revocation: Arc<SessionRevocation<R>>,
        notifier: Arc<N>,
        clock: Arc<dyn Clock>,
        config: RecoveryConfig,
    ) -> Self {
        Self {
            users,
            revocation,
            notifier,
            clock,
            config,
        }
    }

    /// Start a password reset for the account registered under `email`
    ///
    /// Reports success for unknown and inactive accounts too, so the
    /// response does not reveal which addresses exist. The reset email is
    /// sent from a detached task.
    pub async fn request_password_reset(&self, email: &str) -> Result<(), DomainError> {
        let email = email.trim();
        let user = match self.users.find_by_email(email).await? {
            Some(user) if user.is_active => user,
            _ => {
                debug!("Password reset requested for unknown or inactive account");
                return Ok(());
            }
        };

        let now = self.clock.now();
        let (token, grant) = RecoveryGrant::generate(now, self.config.token_expiry)
            .ok_or_else(|| DomainError::Internal {
                message: "recovery token expiry out of range".to_string(),
            })?;
        if !self.users.store_recovery_grant(user.id, &grant, now).await? {
            return Ok(());
        }

        let notifier = Arc::clone(&self.notifier);
        let reset_url = link_with_token(&self.config.reset_url_base, &token);
        let expiry_minutes = self.config.expiry_minutes();
        let subject_id = user.id;
        tokio::spawn(async move {
            if let Err(e) = notifier
                .send_password_reset(&user.email, &reset_url, expiry_minutes)
                .await
            {
                error!(subject_id = %subject_id, error = %e, "Failed to send password reset email");
            }
        });

        info!(subject_id = %subject_id, "Password reset issued");
        Ok(())
    }

    /// Redeem a recovery token
    ///
    /// A token is accepted once, before its expiry. On success every active
    /// session of the subject is revoked; the new password itself is stored
    /// by the caller.
    pub async fn complete_password_reset(&self, token: &str) -> Result<ResetOutcome, DomainError> {
        if !RecoveryGrant::looks_like_recovery_token(token) {
            return Ok(ResetOutcome::Rejected);
        }

        let token_hash = RecoveryGrant::hash_token(token);
        let subject_id = match self
            .users
            .consume_recovery_grant(&token_hash, self.clock.now())
            .await?
        {
            Some(subject_id) => subject_id,
            None => {
                debug!("Recovery token rejected");
                return Ok(ResetOutcome::Rejected);
            }
        };

        let revoked_sessions = self.revocation.revoke_all(subject_id).await?;
        info!(subject_id = %subject_id, revoked_sessions = revoked_sessions, "Password reset completed");

        Ok(ResetOutcome::Completed {
            subject_id,
            revoked_sessions,
        })
    }
}
