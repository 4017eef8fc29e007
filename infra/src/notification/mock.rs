//! Mock notification service
//!
//! Logs messages instead of sending them and keeps a copy in memory so
//! tests and local runs can read the links back.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::{info, warn};
use tw_core::errors::NotificationError;
use tw_core::services::NotificationService;

use super::mask_email;

/// A message captured by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub to: String,
    pub template: &'static str,
    pub link: String,
    pub expiry_minutes: i64,
}

/// Mock notification service for development and testing
#[derive(Clone, Default)]
pub struct MockNotificationService {
    sent: Arc<Mutex<Vec<SentMessage>>>,
    simulate_failure: Arc<AtomicBool>,
}

impl MockNotificationService {
    /// Create a new mock notification service
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable failure simulation
    pub fn set_simulate_failure(&self, simulate: bool) {
        self.simulate_failure.store(simulate, Ordering::SeqCst);
    }

    /// Messages captured so far
    pub fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of messages captured so far
    pub fn message_count(&self) -> usize {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    fn capture(
        &self,
        template: &'static str,
        address: &str,
        link: &str,
        expiry_minutes: i64,
    ) -> Result<(), NotificationError> {
        if self.simulate_failure.load(Ordering::SeqCst) {
            warn!(
                provider = "mock",
                to = %mask_email(address),
                template = template,
                "Mock notification service simulating failure"
            );
            return Err(NotificationError::Transport(
                "Simulated notification failure".to_string(),
            ));
        }

        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(SentMessage {
                to: address.to_string(),
                template,
                link: link.to_string(),
                expiry_minutes,
            });

        info!(
            provider = "mock",
            to = %mask_email(address),
            template = template,
            expiry_minutes = expiry_minutes,
            "Notification sent (mock)"
        );
        Ok(())
    }
}

#[async_trait]
impl NotificationService for MockNotificationService {
    async fn send_security_alert(
        &self,
        address: &str,
        recovery_url: &str,
        expiry_minutes: i64,
    ) -> Result<(), NotificationError> {
        self.capture("security_alert", address, recovery_url, expiry_minutes)
    }

    async fn send_password_reset(
        &self,
        address: &str,
        reset_url: &str,
        expiry_minutes: i64,
    ) -> Result<(), NotificationError> {
        self.capture("password_reset", address, reset_url, expiry_minutes)
    }
}
