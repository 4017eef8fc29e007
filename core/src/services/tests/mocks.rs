//! Test doubles and a wired-up service harness

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tw_shared::RecoveryConfig;
use uuid::Uuid;

use crate::clock::{Clock, ManualClock};
use crate::domain::entities::user::{User, UserRole};
use crate::errors::NotificationError;
use crate::repositories::InMemoryCredentialStore;
use crate::services::compromise::CompromiseHandler;
use crate::services::notification::NotificationService;
use crate::services::recovery::PasswordRecoveryService;
use crate::services::revocation::SessionRevocation;
use crate::services::rotation::RotationEngine;
use crate::services::token::{TokenCodec, TokenCodecConfig};

pub const ACCESS_TTL: i64 = 900;
pub const REFRESH_TTL: i64 = 7 * 24 * 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentKind {
    SecurityAlert,
    PasswordReset,
}

#[derive(Debug, Clone)]
pub struct SentNotification {
    pub kind: SentKind,
    pub address: String,
    pub url: String,
    pub expiry_minutes: i64,
}

impl SentNotification {
    pub fn token(&self) -> &str {
        self.url.split("token=").nth(1).unwrap_or_default()
    }
}

// Records every delivery attempt, optionally failing them
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentNotification>>,
    should_fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn fail_deliveries(&self) {
        self.should_fail.store(true, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().unwrap().clone()
    }

    /// Wait until at least `count` deliveries were attempted
    pub async fn wait_for(&self, count: usize) -> Vec<SentNotification> {
        for _ in 0..200 {
            if self.sent.lock().unwrap().len() >= count {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        self.sent()
    }

    /// Give detached tasks a chance to run, then report what was sent
    pub async fn settle(&self) -> Vec<SentNotification> {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        self.sent()
    }

    fn record(
        &self,
        kind: SentKind,
        address: &str,
        url: &str,
        expiry_minutes: i64,
    ) -> Result<(), NotificationError> {
        self.sent.lock().unwrap().push(SentNotification {
            kind,
            address: address.to_string(),
            url: url.to_string(),
            expiry_minutes,
        });
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(NotificationError::Transport("mail relay down".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationService for RecordingNotifier {
    async fn send_security_alert(
        &self,
        address: &str,
        recovery_url: &str,
        expiry_minutes: i64,
    ) -> Result<(), NotificationError> {
        self.record(SentKind::SecurityAlert, address, recovery_url, expiry_minutes)
    }

    async fn send_password_reset(
        &self,
        address: &str,
        reset_url: &str,
        expiry_minutes: i64,
    ) -> Result<(), NotificationError> {
        self.record(SentKind::PasswordReset, address, reset_url, expiry_minutes)
    }
}

type Store = InMemoryCredentialStore;

pub struct Harness {
    pub store: Arc<Store>,
    pub notifier: Arc<RecordingNotifier>,
    pub clock: Arc<ManualClock>,
    pub codec: Arc<TokenCodec>,
    pub compromise: Arc<CompromiseHandler<Store, Store, RecordingNotifier>>,
    pub engine: Arc<RotationEngine<Store, Store, RecordingNotifier>>,
    pub revocation: Arc<SessionRevocation<Store>>,
    pub recovery: PasswordRecoveryService<Store, Store, RecordingNotifier>,
}

pub fn recovery_config() -> RecoveryConfig {
    RecoveryConfig {
        token_expiry: 600,
        recovery_url_base: "https://app.test/recover".to_string(),
        reset_url_base: "https://app.test/reset".to_string(),
    }
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryCredentialStore::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let clock = Arc::new(ManualClock::starting_now());
        let dyn_clock: Arc<dyn Clock> = clock.clone();

        let codec = Arc::new(TokenCodec::new(
            TokenCodecConfig::new("test-access-secret", "test-refresh-secret")
                .with_lifetimes(ACCESS_TTL, REFRESH_TTL),
            dyn_clock.clone(),
        ));
        let compromise = Arc::new(CompromiseHandler::new(
            store.clone(),
            store.clone(),
            notifier.clone(),
            dyn_clock.clone(),
            recovery_config(),
        ));
        let engine = Arc::new(RotationEngine::new(
            store.clone(),
            store.clone(),
            codec.clone(),
            compromise.clone(),
            dyn_clock.clone(),
        ));
        let revocation = Arc::new(SessionRevocation::new(
            store.clone(),
            codec.clone(),
            dyn_clock.clone(),
        ));
        let recovery = PasswordRecoveryService::new(
            store.clone(),
            revocation.clone(),
            notifier.clone(),
            dyn_clock,
            recovery_config(),
        );

        Self {
            store,
            notifier,
            clock,
            codec,
            compromise,
            engine,
            revocation,
            recovery,
        }
    }

    /// Register an active user and return its id
    pub async fn user(&self, email: &str) -> Uuid {
        let user = User::new(email, UserRole::Candidate);
        let id = user.id;
        self.store.insert_user(user).await;
        id
    }

    /// Active record count for a subject at the harness clock
    pub async fn active_count(&self, subject_id: Uuid) -> usize {
        use crate::repositories::TokenRepository;
        self.store
            .find_active_by_user_id(subject_id, self.clock.now())
            .await
            .unwrap()
            .len()
    }
}
