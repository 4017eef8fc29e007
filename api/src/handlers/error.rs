//! Error response rendering
//!
//! Rejected credentials all render through [`unauthorized`] so that a caller
//! cannot distinguish a forged token from a replayed, revoked or expired one,
//! or from an infrastructure fault during refresh.

use actix_web::{error::JsonPayloadError, HttpRequest, HttpResponse};
use tw_shared::{error_codes, ErrorResponse};
use validator::ValidationErrors;

/// The uniform 401
pub fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(ErrorResponse::unauthorized())
}

/// 400 for a request body that failed field validation
pub fn validation_failed(errors: &ValidationErrors) -> HttpResponse {
    let mut fields: Vec<String> = errors.field_errors().keys().map(|k| k.to_string()).collect();
    fields.sort();
    tracing::debug!(fields = ?fields, "Request validation failed");

    HttpResponse::BadRequest().json(ErrorResponse::new(
        error_codes::VALIDATION_ERROR,
        format!("Invalid request fields: {}", fields.join(", ")),
    ))
}

/// 500 without internal detail
pub fn internal_error() -> HttpResponse {
    HttpResponse::InternalServerError().json(ErrorResponse::new(
        error_codes::INTERNAL_ERROR,
        "An internal error occurred",
    ))
}

/// 404 for unknown routes
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}

/// Render undecodable JSON bodies as a 400 in the shared error shape
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(path = %req.path(), error = %err, "Rejected request body");
    let response = HttpResponse::BadRequest().json(ErrorResponse::new(
        error_codes::BAD_REQUEST,
        "Malformed request body",
    ));
    actix_web::error::InternalError::from_response(err, response).into()
}
