//! Trait for notification delivery

use async_trait::async_trait;

use crate::errors::NotificationError;

/// Trait for notification service integration
#[async_trait]
pub trait NotificationService: Send + Sync {
    /// Tell the account owner that their sessions were revoked after suspected
    /// token theft, with a link to recover the account
    async fn send_security_alert(
        &self,
        address: &str,
        recovery_url: &str,
        expiry_minutes: i64,
    ) -> Result<(), NotificationError>;

    /// Send a password reset link
    async fn send_password_reset(
        &self,
        address: &str,
        reset_url: &str,
        expiry_minutes: i64,
    ) -> Result<(), NotificationError>;
}
