//! Integration tests for the health check and fallback routes

mod common;

use actix_web::{http::StatusCode, test};
use serde_json::Value;

use common::TestContext;
use tw_api::app::create_app;
use tw_shared::Environment;

#[actix_web::test]
async fn test_health_check() {
    let ctx = TestContext::new();
    let app = test::init_service(create_app(ctx.state.clone(), Environment::Development)).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"], "up");
}

#[actix_web::test]
async fn test_health_check_reports_store_outage() {
    let ctx = TestContext::new();
    let app = test::init_service(create_app(ctx.state.clone(), Environment::Development)).await;
    ctx.store.simulate_outage(true);

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["store"], "down");
}

#[actix_web::test]
async fn test_unknown_route_is_not_found() {
    let ctx = TestContext::new();
    let app = test::init_service(create_app(ctx.state.clone(), Environment::Production)).await;

    let req = test::TestRequest::get().uri("/api/v1/nope").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(resp.headers().get("x-frame-options").unwrap(), "DENY");
}
