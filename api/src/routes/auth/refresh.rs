use actix_web::{web, HttpResponse};
use tokio::time::timeout;
use tracing::{debug, error, warn};
use validator::Validate;

use tw_core::domain::value_objects::RotationOutcome;
use tw_core::repositories::{TokenRepository, UserRepository};
use tw_core::services::NotificationService;

use crate::dto::auth::{RefreshTokenRequest, TokenResponse};
use crate::handlers::error::unauthorized;

use super::AppState;

/// Handler for POST /api/v1/auth/refresh
///
/// Exchanges a refresh token for a new access/refresh pair.
///
/// # Request Body
///
/// ```json
/// {
///     "refresh_token": "eyJ..."
/// }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "access_token": "eyJ...",
///     "refresh_token": "eyJ...",
///     "token_type": "Bearer",
///     "expires_in": 900,
///     "refresh_expires_in": 604800
/// }
/// ```
///
/// ## Errors
/// - 401 Unauthorized: for every rejected token and for store failures, with
///   one body regardless of cause
pub async fn refresh<R, U, N>(
    state: web::Data<AppState<R, U, N>>,
    request: web::Json<RefreshTokenRequest>,
) -> HttpResponse
where
    R: TokenRepository + 'static,
    U: UserRepository + 'static,
    N: NotificationService + 'static,
{
    if request.validate().is_err() {
        return unauthorized();
    }

    match timeout(state.request_deadline, state.engine.rotate(&request.refresh_token)).await {
        Ok(Ok(RotationOutcome::Rotated(session))) => {
            debug!(
                subject_id = %session.subject_id,
                record_id = %session.record_id,
                "Refresh token rotated"
            );
            HttpResponse::Ok().json(TokenResponse::from(session.tokens))
        }
        Ok(Ok(RotationOutcome::Rejected(reason))) => {
            debug!(classification = %reason, "Refresh rejected");
            unauthorized()
        }
        Ok(Err(e)) => {
            error!(error = %e, "Refresh failed");
            unauthorized()
        }
        Err(_) => {
            warn!(
                deadline_secs = state.request_deadline.as_secs(),
                "Refresh exceeded request deadline"
            );
            unauthorized()
        }
    }
}
