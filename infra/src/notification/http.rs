//! HTTP mail relay client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};
use tw_core::errors::NotificationError;
use tw_core::services::NotificationService;
use tw_shared::config::NotificationConfig;

use crate::InfrastructureError;

use super::mask_email;

/// Message body accepted by the relay
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct RelayMessage<'a> {
    pub to: &'a str,
    pub template: &'static str,
    pub link: &'a str,
    pub expiry_minutes: i64,
}

/// Sends notifications by POSTing JSON to a mail relay
#[derive(Clone)]
pub struct HttpNotificationService {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpNotificationService {
    /// Create a relay client from configuration
    ///
    /// Fails if no endpoint is configured.
    pub fn new(config: &NotificationConfig) -> Result<Self, InfrastructureError> {
        let endpoint = config
            .endpoint
            .clone()
            .filter(|e| !e.is_empty())
            .ok_or_else(|| {
                InfrastructureError::Config("NOTIFICATION_ENDPOINT is required for the http provider".to_string())
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
        })
    }

    async fn deliver(&self, message: RelayMessage<'_>) -> Result<(), NotificationError> {
        let mut request = self.client.post(&self.endpoint).json(&message);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| NotificationError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                provider = "http",
                to = %mask_email(message.to),
                template = message.template,
                status = status.as_u16(),
                "Mail relay rejected message"
            );
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
            });
        }

        debug!(
            provider = "http",
            to = %mask_email(message.to),
            template = message.template,
            "Mail relay accepted message"
        );
        Ok(())
    }
}

#[async_trait]
impl NotificationService for HttpNotificationService {
    async fn send_security_alert(
        &self,
        address: &str,
        recovery_url: &str,
        expiry_minutes: i64,
    ) -> Result<(), NotificationError> {
        self.deliver(RelayMessage {
            to: address,
            template: "security_alert",
            link: recovery_url,
            expiry_minutes,
        })
        .await
    }

    async fn send_password_reset(
        &self,
        address: &str,
        reset_url: &str,
        expiry_minutes: i64,
    ) -> Result<(), NotificationError> {
        self.deliver(RelayMessage {
            to: address,
            template: "password_reset",
            link: reset_url,
            expiry_minutes,
        })
        .await
    }
}
