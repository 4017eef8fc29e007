//! Security response headers.
//!
//! Token-bearing responses must never be cached by browsers or proxies, so
//! `Cache-Control: no-store` is always set. The hardening headers are added
//! outside development.

use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{self, HeaderValue},
    Error,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    task::{Context, Poll},
};
use tw_shared::Environment;

/// Security header middleware factory
#[derive(Debug, Clone, Copy)]
pub struct SecurityHeaders {
    /// Whether to add hardening headers on top of the cache headers
    hardened: bool,
}

impl SecurityHeaders {
    /// Header policy for the given environment
    pub fn for_environment(environment: Environment) -> Self {
        Self {
            hardened: !environment.is_development(),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SecurityHeaders
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SecurityHeadersService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SecurityHeadersService {
            service: Rc::new(service),
            hardened: self.hardened,
        }))
    }
}

/// Security header middleware service
pub struct SecurityHeadersService<S> {
    service: Rc<S>,
    hardened: bool,
}

impl<S, B> Service<ServiceRequest> for SecurityHeadersService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let hardened = self.hardened;

        Box::pin(async move {
            let mut response = service.call(req).await?;
            add_response_headers(&mut response, hardened);
            Ok(response)
        })
    }
}

fn add_response_headers<B>(response: &mut ServiceResponse<B>, hardened: bool) {
    let headers = response.headers_mut();

    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));

    if !hardened {
        return;
    }

    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("no-referrer"),
    );
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none';"),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App, HttpResponse};

    #[actix_web::test]
    async fn test_no_store_is_always_set() {
        let app = test::init_service(
            App::new()
                .wrap(SecurityHeaders::for_environment(Environment::Development))
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

        assert_eq!(resp.headers().get(header::CACHE_CONTROL).unwrap(), "no-store");
        assert!(resp.headers().get(header::X_FRAME_OPTIONS).is_none());
    }

    #[actix_web::test]
    async fn test_production_adds_hardening_headers() {
        let app = test::init_service(
            App::new()
                .wrap(SecurityHeaders::for_environment(Environment::Production))
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

        assert_eq!(resp.headers().get(header::X_FRAME_OPTIONS).unwrap(), "DENY");
        assert!(resp.headers().contains_key(header::STRICT_TRANSPORT_SECURITY));
    }
}
