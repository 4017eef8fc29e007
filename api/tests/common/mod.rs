//! Shared setup for the HTTP integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use actix_web::web;
use uuid::Uuid;

use tw_api::routes::auth::AppState;
use tw_core::clock::{Clock, ManualClock};
use tw_core::domain::entities::token::TokenPair;
use tw_core::domain::entities::user::{User, UserRole};
use tw_core::repositories::{InMemoryCredentialStore, TokenRepository};
use tw_infra::notification::{MockNotificationService, SentMessage};
use tw_shared::{AppConfig, JwtConfig};

pub type Store = InMemoryCredentialStore;
pub type State = AppState<Store, Store, MockNotificationService>;

pub struct TestContext {
    pub store: Arc<Store>,
    pub notifier: Arc<MockNotificationService>,
    pub clock: Arc<ManualClock>,
    pub state: web::Data<State>,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryCredentialStore::new());
        let notifier = Arc::new(MockNotificationService::new());
        let clock = Arc::new(ManualClock::starting_now());
        let dyn_clock: Arc<dyn Clock> = clock.clone();

        let mut config = AppConfig::default();
        config.auth.jwt = JwtConfig::new("it-access-secret", "it-refresh-secret");

        let state = web::Data::new(AppState::build(
            store.clone(),
            store.clone(),
            notifier.clone(),
            dyn_clock,
            &config,
        ));

        Self {
            store,
            notifier,
            clock,
            state,
        }
    }

    pub async fn user(&self, email: &str) -> Uuid {
        let user = User::new(email, UserRole::Candidate);
        let id = user.id;
        self.store.insert_user(user).await;
        id
    }

    pub async fn login(&self, subject_id: Uuid) -> TokenPair {
        self.state.engine.issue_pair(subject_id).await.unwrap()
    }

    pub async fn active_count(&self, subject_id: Uuid) -> usize {
        self.store
            .find_active_by_user_id(subject_id, self.clock.now())
            .await
            .unwrap()
            .len()
    }

    /// Wait for detached notification tasks to deliver `count` messages
    pub async fn wait_for_messages(&self, count: usize) -> Vec<SentMessage> {
        for _ in 0..200 {
            if self.notifier.message_count() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        self.notifier.sent_messages()
    }
}

/// Token carried in a notification link
pub fn token_from_link(link: &str) -> &str {
    link.split("token=").nth(1).unwrap_or_default()
}
