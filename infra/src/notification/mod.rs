//! Notification transports
//!
//! - **HTTP relay**: POSTs a templated message to a mail relay
//! - **Mock**: logs messages and keeps them in memory, for development and tests
//!
//! The engine is generic over one notifier type, so the transports are
//! wrapped in [`NotificationTransport`] and selected at startup.

use async_trait::async_trait;
use tw_core::errors::NotificationError;
use tw_core::services::NotificationService;
use tw_shared::config::{NotificationConfig, NotificationProvider};

pub mod http;
pub mod mock;

pub use http::HttpNotificationService;
pub use mock::{MockNotificationService, SentMessage};

use crate::InfrastructureError;


/// Mask an email address for logging: `a***@example.com`
pub fn mask_email(address: &str) -> String {
    match address.split_once('@') {
        Some((local, domain)) => {
            let first = local.chars().next().map(String::from).unwrap_or_default();
            format!("{}***@{}", first, domain)
        }
        None => "***".to_string(),
    }
}

/// Notification transport selected from configuration
#[derive(Clone)]
pub enum NotificationTransport {
    Http(HttpNotificationService),
    Mock(MockNotificationService),
}

impl NotificationTransport {
    /// Provider name for logs
    pub fn provider_name(&self) -> &'static str {
        match self {
            NotificationTransport::Http(_) => "http",
            NotificationTransport::Mock(_) => "mock",
        }
    }
}

#[async_trait]
impl NotificationService for NotificationTransport {
    async fn send_security_alert(
        &self,
        address: &str,
        recovery_url: &str,
        expiry_minutes: i64,
    ) -> Result<(), NotificationError> {
        match self {
            NotificationTransport::Http(s) => s.send_security_alert(address, recovery_url, expiry_minutes).await,
            NotificationTransport::Mock(s) => s.send_security_alert(address, recovery_url, expiry_minutes).await,
        }
    }

    async fn send_password_reset(
        &self,
        address: &str,
        reset_url: &str,
        expiry_minutes: i64,
    ) -> Result<(), NotificationError> {
        match self {
            NotificationTransport::Http(s) => s.send_password_reset(address, reset_url, expiry_minutes).await,
            NotificationTransport::Mock(s) => s.send_password_reset(address, reset_url, expiry_minutes).await,
        }
    }
}

/// Create the notification transport named by the configuration
pub fn create_notification_service(
    config: &NotificationConfig,
) -> Result<NotificationTransport, InfrastructureError> {
    let transport = match config.provider {
        NotificationProvider::Http => NotificationTransport::Http(HttpNotificationService::new(config)?),
        NotificationProvider::Mock => NotificationTransport::Mock(MockNotificationService::new()),
    };
    tracing::info!(provider = transport.provider_name(), "Notification transport ready");
    Ok(transport)
}
