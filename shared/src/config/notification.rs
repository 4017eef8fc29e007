//! Notification delivery configuration

use serde::{Deserialize, Serialize};

/// Which notification transport to wire at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationProvider {
    /// POST messages to an HTTP mail relay
    Http,
    /// Log messages instead of sending them
    Mock,
}

impl std::str::FromStr for NotificationProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "http" => Ok(NotificationProvider::Http),
            "mock" => Ok(NotificationProvider::Mock),
            _ => Err(format!("Invalid notification provider: {}", s)),
        }
    }
}

/// Notification service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationConfig {
    /// Transport selection
    pub provider: NotificationProvider,

    /// Mail relay endpoint (http provider only)
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Mail relay API key (http provider only)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            provider: NotificationProvider::Mock,
            endpoint: None,
            api_key: None,
            timeout: default_timeout(),
        }
    }
}

impl NotificationConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self {
            provider: std::env::var("NOTIFICATION_PROVIDER")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(NotificationProvider::Mock),
            endpoint: std::env::var("NOTIFICATION_ENDPOINT").ok(),
            api_key: std::env::var("NOTIFICATION_API_KEY").ok(),
            timeout: std::env::var("NOTIFICATION_TIMEOUT")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or_else(default_timeout),
        }
    }
}

fn default_timeout() -> u64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_str() {
        assert_eq!("HTTP".parse::<NotificationProvider>().unwrap(), NotificationProvider::Http);
        assert_eq!("mock".parse::<NotificationProvider>().unwrap(), NotificationProvider::Mock);
        assert!("smtp".parse::<NotificationProvider>().is_err());
    }
}
