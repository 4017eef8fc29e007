//! Shared application state

use std::sync::Arc;
use std::time::Duration;

use tw_core::clock::Clock;
use tw_core::repositories::{TokenRepository, UserRepository};
use tw_core::services::{
    CompromiseHandler, NotificationService, PasswordRecoveryService, RotationEngine,
    SessionRevocation, TokenCodec, TokenCodecConfig,
};
use tw_shared::AppConfig;

/// Engine services shared by every worker
pub struct AppState<R, U, N> {
    pub engine: Arc<RotationEngine<R, U, N>>,
    pub revocation: Arc<SessionRevocation<R>>,
    pub recovery: Arc<PasswordRecoveryService<R, U, N>>,
    pub codec: Arc<TokenCodec>,
    /// Store handle, used for readiness reporting
    pub tokens: Arc<R>,
    /// Outer deadline for each engine call
    pub request_deadline: Duration,
}

impl<R, U, N> AppState<R, U, N>
where
    R: TokenRepository + 'static,
    U: UserRepository + 'static,
    N: NotificationService + 'static,
{
    /// Wire the engine services over one credential store and notifier
    pub fn build(
        tokens: Arc<R>,
        users: Arc<U>,
        notifier: Arc<N>,
        clock: Arc<dyn Clock>,
        config: &AppConfig,
    ) -> Self {
        let codec = Arc::new(TokenCodec::new(
            TokenCodecConfig::from(&config.auth.jwt),
            Arc::clone(&clock),
        ));
        let compromise = Arc::new(CompromiseHandler::new(
            Arc::clone(&tokens),
            Arc::clone(&users),
            Arc::clone(&notifier),
            Arc::clone(&clock),
            config.auth.recovery.clone(),
        ));
        let engine = Arc::new(RotationEngine::new(
            Arc::clone(&tokens),
            Arc::clone(&users),
            Arc::clone(&codec),
            compromise,
            Arc::clone(&clock),
        ));
        let revocation = Arc::new(SessionRevocation::new(
            Arc::clone(&tokens),
            Arc::clone(&codec),
            Arc::clone(&clock),
        ));
        let recovery = Arc::new(PasswordRecoveryService::new(
            users,
            Arc::clone(&revocation),
            notifier,
            clock,
            config.auth.recovery.clone(),
        ));

        Self {
            engine,
            revocation,
            recovery,
            codec,
            tokens,
            request_deadline: config.server.request_deadline(),
        }
    }
}
