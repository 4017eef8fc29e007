//! Compromise handler implementation

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use tw_shared::RecoveryConfig;
use uuid::Uuid;

use crate::clock::Clock;
use crate::domain::entities::user::RecoveryGrant;
use crate::domain::value_objects::{ContainmentReport, RejectReason};
use crate::errors::DomainError;
use crate::repositories::{TokenRepository, UserRepository};
use crate::services::notification::{link_with_token, NotificationService};

/// Contains a suspected token theft for one subject
pub struct CompromiseHandler<R, U, N> {
    tokens: Arc<R>,
    users: Arc<U>,
    notifier: Arc<N>,
    clock: Arc<dyn Clock>,
    config: RecoveryConfig,
}

impl<R, U, N> CompromiseHandler<R, U, N>
where
    R: TokenRepository + 'static,
    U: UserRepository + 'static,
    N: NotificationService + 'static,
{
    /// Create a new compromise handler
    pub fn new(
        tokens: Arc<R>,
        users: Arc<U>,
        notifier: Arc<N>,
        clock: Arc<dyn Clock>,
        config: RecoveryConfig,
    ) -> Self {
        Self {
            tokens,
            users,
            notifier,
            clock,
            config,
        }
    }

    /// Revoke every active session of `subject_id` and open a recovery path
    ///
    /// The recovery grant and the bulk revocation commit in one transaction.
    /// The security alert is spawned afterwards and never awaited here.
    ///
    /// # Returns
    ///
    /// * `Ok(ContainmentReport)` - Sessions revoked; alert dispatch started
    /// * `Err(DomainError)` - The store failed; nothing was revoked and no
    ///   alert was sent
    pub async fn contain(
        &self,
        subject_id: Uuid,
        reason: RejectReason,
    ) -> Result<ContainmentReport, DomainError> {
        let now = self.clock.now();
        let (recovery_token, grant) = RecoveryGrant::generate(now, self.config.token_expiry)
            .ok_or_else(|| DomainError::Internal {
                message: "recovery token expiry out of range".to_string(),
            })?;

        let revoked_sessions = self
            .tokens
            .contain_compromise(subject_id, &grant, now)
            .await?;

        warn!(
            subject_id = %subject_id,
            classification = %reason,
            revoked_sessions = revoked_sessions,
            event = "compromise_contained",
            "Revoked all sessions after suspected token theft"
        );

        let alert_task = self.dispatch_alert(subject_id, recovery_token);

        Ok(ContainmentReport {
            subject_id,
            revoked_sessions,
            alert_task,
        })
    }

    fn dispatch_alert(&self, subject_id: Uuid, recovery_token: String) -> JoinHandle<()> {
        let users = Arc::clone(&self.users);
        let notifier = Arc::clone(&self.notifier);
        let recovery_url = link_with_token(&self.config.recovery_url_base, &recovery_token);
        let expiry_minutes = self.config.expiry_minutes();

        tokio::spawn(async move {
            let user = match users.find_by_id(subject_id).await {
                Ok(Some(user)) => user,
                Ok(None) => {
                    warn!(subject_id = %subject_id, "Security alert skipped: subject has no account");
                    return;
                }
                Err(e) => {
                    error!(subject_id = %subject_id, error = %e, "Security alert skipped: subject lookup failed");
                    return;
                }
            };

            match notifier
                .send_security_alert(&user.email, &recovery_url, expiry_minutes)
                .await
            {
                Ok(()) => info!(subject_id = %subject_id, "Security alert dispatched"),
                Err(e) => error!(
                    subject_id = %subject_id,
                    error = %e,
                    event = "security_alert_failed",
                    "Failed to dispatch security alert"
                ),
            }
        })
    }
}
