use actix_web::{web, HttpResponse};
use tokio::time::timeout;
use tracing::{debug, error, warn};

use tw_core::domain::value_objects::RevokeOutcome;
use tw_core::repositories::{TokenRepository, UserRepository};
use tw_core::services::NotificationService;

use crate::dto::auth::{is_plausible_token, LogoutRequest, MessageResponse, RevokedSessionsResponse};
use crate::handlers::error::internal_error;
use crate::middleware::auth::AuthContext;

use super::AppState;

/// Handler for POST /api/v1/auth/logout
///
/// Revokes the presented refresh token. Always answers 200: an unknown,
/// already revoked or unreadable token is treated as already logged out, and
/// the client discards its copy either way.
///
/// # Request Body
///
/// ```json
/// {
///     "refresh_token": "eyJ..."
/// }
/// ```
pub async fn logout<R, U, N>(
    state: web::Data<AppState<R, U, N>>,
    request: web::Json<LogoutRequest>,
) -> HttpResponse
where
    R: TokenRepository + 'static,
    U: UserRepository + 'static,
    N: NotificationService + 'static,
{
    let outcome = if is_plausible_token(&request.refresh_token) {
        timeout(
            state.request_deadline,
            state.revocation.revoke_one(&request.refresh_token),
        )
        .await
        .unwrap_or_else(|_| {
            warn!("Logout exceeded request deadline");
            RevokeOutcome::Unconfirmed
        })
    } else {
        RevokeOutcome::AlreadyInactive
    };

    debug!(outcome = ?outcome, "Logout processed");
    HttpResponse::Ok().json(MessageResponse::new("Logged out successfully"))
}

/// Handler for POST /api/v1/auth/logout-all
///
/// Revokes every active session of the authenticated subject.
/// Requires authentication via Bearer access token in the Authorization header.
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "message": "Logged out from all devices",
///     "revoked_sessions": 3
/// }
/// ```
///
/// ## Errors
/// - 401 Unauthorized: Missing or invalid access token
/// - 500 Internal Server Error: Revocation could not be confirmed
pub async fn logout_all<R, U, N>(
    state: web::Data<AppState<R, U, N>>,
    auth: AuthContext,
) -> HttpResponse
where
    R: TokenRepository + 'static,
    U: UserRepository + 'static,
    N: NotificationService + 'static,
{
    match timeout(state.request_deadline, state.revocation.revoke_all(auth.subject_id)).await {
        Ok(Ok(revoked_sessions)) => HttpResponse::Ok().json(RevokedSessionsResponse {
            message: "Logged out from all devices".to_string(),
            revoked_sessions,
        }),
        Ok(Err(e)) => {
            error!(subject_id = %auth.subject_id, error = %e, "Logout from all devices failed");
            internal_error()
        }
        Err(_) => {
            warn!(subject_id = %auth.subject_id, "Logout from all devices exceeded request deadline");
            internal_error()
        }
    }
}
