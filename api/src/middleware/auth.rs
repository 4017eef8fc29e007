//! Bearer access-token authentication.
//!
//! Verifies the access token from the Authorization header with the
//! [`TokenCodec`] and injects an [`AuthContext`] into the request. Failures
//! render the same 401 body as every other rejected credential.

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    error::InternalError,
    http::header::AUTHORIZATION,
    Error, FromRequest, HttpMessage, HttpRequest,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
    task::{Context, Poll},
};
use tw_core::domain::entities::token::Claims;
use tw_core::services::TokenCodec;
use uuid::Uuid;

use crate::handlers::error::unauthorized;

/// Authenticated caller injected into requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    /// Subject the access token was issued to
    pub subject_id: Uuid,
    /// Unique id of the presented access token
    pub token_id: Uuid,
}

impl AuthContext {
    /// Build the context from verified claims
    pub fn from_claims(claims: &Claims) -> Option<Self> {
        Some(Self {
            subject_id: claims.user_id().ok()?,
            token_id: claims.token_id().ok()?,
        })
    }
}

/// Access-token authentication middleware factory
pub struct JwtAuth {
    codec: Arc<TokenCodec>,
}

impl JwtAuth {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
            codec: Arc::clone(&self.codec),
        }))
    }
}

/// Access-token authentication middleware service
pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
    codec: Arc<TokenCodec>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let codec = Arc::clone(&self.codec);

        Box::pin(async move {
            let context = extract_bearer_token(&req)
                .and_then(|token| match codec.verify_access(&token) {
                    Ok(claims) => AuthContext::from_claims(&claims),
                    Err(e) => {
                        tracing::debug!(error = %e, path = %req.path(), "Access token rejected");
                        None
                    }
                });

            let Some(context) = context else {
                return Ok(req.into_response(unauthorized()).map_into_right_body());
            };

            req.extensions_mut().insert(context);
            service.call(req).await.map(ServiceResponse::map_into_left_body)
        })
    }
}

fn rejected() -> Error {
    InternalError::from_response("unauthorized", unauthorized()).into()
}

/// Extracts Bearer token from Authorization header
fn extract_bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extractor for required authentication
impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthContext>()
            .copied()
            .ok_or_else(rejected);

        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bearer_token() {
        use actix_web::test;

        let req = test::TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer test_token_123"))
            .to_srv_request();
        assert_eq!(extract_bearer_token(&req), Some("test_token_123".to_string()));

        let req_no_bearer = test::TestRequest::default()
            .insert_header((AUTHORIZATION, "test_token_123"))
            .to_srv_request();
        assert_eq!(extract_bearer_token(&req_no_bearer), None);

        let req_empty = test::TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer "))
            .to_srv_request();
        assert_eq!(extract_bearer_token(&req_empty), None);

        let req_no_header = test::TestRequest::default().to_srv_request();
        assert_eq!(extract_bearer_token(&req_no_header), None);
    }
}
