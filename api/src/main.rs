use std::sync::Arc;

use actix_web::{web, HttpServer};
use anyhow::Context;
use tracing::{info, warn};

use tw_api::app::create_app;
use tw_api::config::{init_tracing, load};
use tw_api::routes::auth::AppState;
use tw_core::clock::{Clock, SystemClock};
use tw_core::repositories::{InMemoryCredentialStore, TokenRepository, UserRepository};
use tw_infra::database::{DatabasePool, MySqlTokenRepository, MySqlUserRepository};
use tw_infra::notification::{create_notification_service, NotificationTransport};
use tw_shared::{AppConfig, StoreBackend};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = load().context("invalid configuration")?;
    init_tracing(&config.logging);

    info!(
        environment = %config.environment,
        store = ?config.store,
        "Starting Tokenwarden API server"
    );
    if config.auth.jwt.is_using_default_secret() {
        warn!("Using default JWT secrets; set JWT_ACCESS_SECRET and JWT_REFRESH_SECRET");
    }

    let notifier = Arc::new(
        create_notification_service(&config.notification)
            .context("failed to create notification transport")?,
    );
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    match config.store {
        StoreBackend::Memory => {
            warn!("Using the in-memory credential store; sessions are lost on restart");
            let store = Arc::new(InMemoryCredentialStore::new());
            serve(store.clone(), store, notifier, clock, &config).await
        }
        StoreBackend::Mysql => {
            let pool = DatabasePool::new(config.database.clone())
                .await
                .context("failed to connect to the credential store")?;
            let report = pool
                .run_migrations()
                .await
                .context("failed to prepare the credential store schema")?;
            info!(rehashed_tokens = report.rehashed_tokens, "Credential store ready");

            let tokens = Arc::new(MySqlTokenRepository::new(pool.get_pool().clone()));
            let users = Arc::new(MySqlUserRepository::new(pool.get_pool().clone()));
            let result = serve(tokens, users, notifier, clock, &config).await;

            pool.close().await;
            result
        }
    }
}

async fn serve<R, U>(
    tokens: Arc<R>,
    users: Arc<U>,
    notifier: Arc<NotificationTransport>,
    clock: Arc<dyn Clock>,
    config: &AppConfig,
) -> anyhow::Result<()>
where
    R: TokenRepository + 'static,
    U: UserRepository + 'static,
{
    let state = web::Data::new(AppState::build(tokens, users, notifier, clock, config));
    let environment = config.environment;
    let bind_address = config.server.bind_address();

    let mut server = HttpServer::new(move || create_app(state.clone(), environment));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    info!(bind_address = %bind_address, "Server listening");
    server
        .bind(&bind_address)
        .with_context(|| format!("failed to bind {}", bind_address))?
        .run()
        .await
        .context("server terminated with an error")?;

    info!("Server stopped");
    Ok(())
}
