use actix_web::{web, HttpResponse};
use tokio::time::timeout;
use tracing::{error, info, warn};
use validator::Validate;

use tw_core::domain::value_objects::ResetOutcome;
use tw_core::repositories::{TokenRepository, UserRepository};
use tw_core::services::NotificationService;

use crate::dto::auth::{
    MessageResponse, PasswordResetCompleteRequest, PasswordResetRequest, RevokedSessionsResponse,
};
use crate::handlers::error::{internal_error, unauthorized, validation_failed};

use super::AppState;

const RESET_REQUESTED: &str = "If the account exists, a reset link has been sent";

/// Handler for POST /api/v1/auth/password-reset/request
///
/// Answers the same way whether or not the address belongs to an account.
///
/// # Request Body
///
/// ```json
/// {
///     "email": "user@example.com"
/// }
/// ```
///
/// ## Errors
/// - 400 Bad Request: not an email address
pub async fn request_reset<R, U, N>(
    state: web::Data<AppState<R, U, N>>,
    request: web::Json<PasswordResetRequest>,
) -> HttpResponse
where
    R: TokenRepository + 'static,
    U: UserRepository + 'static,
    N: NotificationService + 'static,
{
    if let Err(errors) = request.validate() {
        return validation_failed(&errors);
    }

    match timeout(
        state.request_deadline,
        state.recovery.request_password_reset(&request.email),
    )
    .await
    {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(error = %e, "Password reset request failed"),
        Err(_) => warn!("Password reset request exceeded request deadline"),
    }

    HttpResponse::Ok().json(MessageResponse::new(RESET_REQUESTED))
}

/// Handler for POST /api/v1/auth/password-reset/complete
///
/// Redeems a recovery token, including one delivered by a security alert,
/// and revokes every session of its subject.
///
/// # Request Body
///
/// ```json
/// {
///     "token": "rcv_..."
/// }
/// ```
///
/// ## Errors
/// - 401 Unauthorized: unknown, expired or already used recovery token
/// - 500 Internal Server Error: store failure
pub async fn complete_reset<R, U, N>(
    state: web::Data<AppState<R, U, N>>,
    request: web::Json<PasswordResetCompleteRequest>,
) -> HttpResponse
where
    R: TokenRepository + 'static,
    U: UserRepository + 'static,
    N: NotificationService + 'static,
{
    if request.validate().is_err() {
        return unauthorized();
    }

    match timeout(
        state.request_deadline,
        state.recovery.complete_password_reset(&request.token),
    )
    .await
    {
        Ok(Ok(ResetOutcome::Completed {
            subject_id,
            revoked_sessions,
        })) => {
            info!(subject_id = %subject_id, revoked_sessions, "Password reset completed");
            HttpResponse::Ok().json(RevokedSessionsResponse {
                message: "Password reset completed".to_string(),
                revoked_sessions,
            })
        }
        Ok(Ok(ResetOutcome::Rejected)) => unauthorized(),
        Ok(Err(e)) => {
            error!(error = %e, "Password reset completion failed");
            internal_error()
        }
        Err(_) => {
            warn!("Password reset completion exceeded request deadline");
            internal_error()
        }
    }
}
