//! Integration tests for the refresh endpoint

mod common;

use actix_web::{http::StatusCode, test};
use serde_json::{json, Value};

use common::TestContext;
use tw_api::app::create_app;
use tw_shared::Environment;

const UNAUTHORIZED_BODY: &str = "Invalid or expired credentials";

#[actix_web::test]
async fn test_refresh_rotates_token() {
    let ctx = TestContext::new();
    let subject = ctx.user("ada@example.com").await;
    let pair = ctx.login(subject).await;
    let app = test::init_service(create_app(ctx.state.clone(), Environment::Development)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(json!({ "refresh_token": pair.refresh_token }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("cache-control").unwrap(), "no-store");
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 900);
    assert_ne!(body["refresh_token"], pair.refresh_token.as_str());
    assert_eq!(ctx.active_count(subject).await, 1);
}

#[actix_web::test]
async fn test_replayed_token_revokes_every_session() {
    let ctx = TestContext::new();
    let subject = ctx.user("ada@example.com").await;
    let pair = ctx.login(subject).await;
    ctx.login(subject).await;
    let app = test::init_service(create_app(ctx.state.clone(), Environment::Development)).await;

    let first = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(json!({ "refresh_token": pair.refresh_token }))
        .to_request();
    let rotated: Value = test::call_and_read_body_json(&app, first).await;
    let successor = rotated["refresh_token"].as_str().unwrap().to_string();

    let replay = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(json!({ "refresh_token": pair.refresh_token }))
        .to_request();
    let resp = test::call_service(&app, replay).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "UNAUTHORIZED");
    assert_eq!(body["message"], UNAUTHORIZED_BODY);
    assert_eq!(ctx.active_count(subject).await, 0);

    // The legitimate successor went down with the lineage
    let follow_up = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(json!({ "refresh_token": successor }))
        .to_request();
    assert_eq!(
        test::call_service(&app, follow_up).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let sent = ctx.wait_for_messages(1).await;
    assert_eq!(sent[0].template, "security_alert");
    assert_eq!(sent[0].to, "ada@example.com");
}

#[actix_web::test]
async fn test_every_rejection_renders_the_same_body() {
    let ctx = TestContext::new();
    let subject = ctx.user("ada@example.com").await;
    let pair = ctx.login(subject).await;
    let forged = ctx.state.codec.issue_refresh_token(subject).unwrap().token;
    let app = test::init_service(create_app(ctx.state.clone(), Environment::Development)).await;

    let mut bodies = Vec::new();
    for token in ["", "garbage", pair.access_token.as_str(), forged.as_str()] {
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/refresh")
            .set_json(json!({ "refresh_token": token }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let body: Value = test::read_body_json(resp).await;
        bodies.push((body["error"].clone(), body["message"].clone()));
    }

    assert!(bodies.windows(2).all(|w| w[0] == w[1]));
}

#[actix_web::test]
async fn test_store_outage_renders_unauthorized() {
    let ctx = TestContext::new();
    let subject = ctx.user("ada@example.com").await;
    let pair = ctx.login(subject).await;
    let app = test::init_service(create_app(ctx.state.clone(), Environment::Development)).await;

    ctx.store.simulate_outage(true);
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(json!({ "refresh_token": pair.refresh_token }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    ctx.store.simulate_outage(false);

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], UNAUTHORIZED_BODY);
    assert_eq!(ctx.active_count(subject).await, 1);
    assert_eq!(ctx.notifier.message_count(), 0);
}

#[actix_web::test]
async fn test_malformed_body_is_a_bad_request() {
    let ctx = TestContext::new();
    let app = test::init_service(create_app(ctx.state.clone(), Environment::Development)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "BAD_REQUEST");
}
