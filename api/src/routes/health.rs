use actix_web::{web, HttpResponse};
use tracing::warn;

use tw_core::repositories::{TokenRepository, UserRepository};
use tw_core::services::NotificationService;

use crate::routes::auth::AppState;

/// Handler for GET /health
///
/// Reports 503 when the credential store does not answer within the
/// request deadline.
pub async fn health_check<R, U, N>(state: web::Data<AppState<R, U, N>>) -> HttpResponse
where
    R: TokenRepository + 'static,
    U: UserRepository + 'static,
    N: NotificationService + 'static,
{
    let store_up = match tokio::time::timeout(state.request_deadline, state.tokens.ping()).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            warn!(error = %e, "Credential store health check failed");
            false
        }
        Err(_) => {
            warn!("Credential store health check timed out");
            false
        }
    };

    let body = serde_json::json!({
        "status": if store_up { "healthy" } else { "unhealthy" },
        "store": if store_up { "up" } else { "down" },
        "service": "tokenwarden-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });
    if store_up {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}
