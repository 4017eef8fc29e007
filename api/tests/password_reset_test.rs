//! Integration tests for the password reset endpoints

mod common;

use actix_web::{http::StatusCode, test};
use serde_json::{json, Value};

use common::{token_from_link, TestContext};
use tw_api::app::create_app;
use tw_shared::Environment;

#[actix_web::test]
async fn test_reset_request_does_not_reveal_accounts() {
    let ctx = TestContext::new();
    ctx.user("ada@example.com").await;
    let app = test::init_service(create_app(ctx.state.clone(), Environment::Development)).await;

    let mut bodies = Vec::new();
    for email in ["ada@example.com", "nobody@example.com"] {
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/password-reset/request")
            .set_json(json!({ "email": email }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        bodies.push(test::read_body_json::<Value, _>(resp).await);
    }

    assert_eq!(bodies[0], bodies[1]);
    let sent = ctx.wait_for_messages(1).await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].template, "password_reset");
}

#[actix_web::test]
async fn test_reset_request_validates_email() {
    let ctx = TestContext::new();
    let app = test::init_service(create_app(ctx.state.clone(), Environment::Development)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/password-reset/request")
        .set_json(json!({ "email": "not-an-email" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[actix_web::test]
async fn test_reset_completion_revokes_sessions_once() {
    let ctx = TestContext::new();
    let subject = ctx.user("ada@example.com").await;
    ctx.login(subject).await;
    ctx.login(subject).await;
    let app = test::init_service(create_app(ctx.state.clone(), Environment::Development)).await;

    let request = test::TestRequest::post()
        .uri("/api/v1/auth/password-reset/request")
        .set_json(json!({ "email": "ada@example.com" }))
        .to_request();
    test::call_service(&app, request).await;
    let sent = ctx.wait_for_messages(1).await;
    let token = token_from_link(&sent[0].link).to_string();

    let complete = test::TestRequest::post()
        .uri("/api/v1/auth/password-reset/complete")
        .set_json(json!({ "token": token }))
        .to_request();
    let resp = test::call_service(&app, complete).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["revoked_sessions"], 2);
    assert_eq!(ctx.active_count(subject).await, 0);

    let again = test::TestRequest::post()
        .uri("/api/v1/auth/password-reset/complete")
        .set_json(json!({ "token": token }))
        .to_request();
    assert_eq!(
        test::call_service(&app, again).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[actix_web::test]
async fn test_security_alert_link_is_redeemable() {
    let ctx = TestContext::new();
    let subject = ctx.user("ada@example.com").await;
    let forged = ctx.state.codec.issue_refresh_token(subject).unwrap().token;
    let app = test::init_service(create_app(ctx.state.clone(), Environment::Development)).await;

    let refresh = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(json!({ "refresh_token": forged }))
        .to_request();
    assert_eq!(
        test::call_service(&app, refresh).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let sent = ctx.wait_for_messages(1).await;
    assert_eq!(sent[0].template, "security_alert");
    assert_eq!(sent[0].expiry_minutes, 10);

    let complete = test::TestRequest::post()
        .uri("/api/v1/auth/password-reset/complete")
        .set_json(json!({ "token": token_from_link(&sent[0].link) }))
        .to_request();
    assert_eq!(test::call_service(&app, complete).await.status(), StatusCode::OK);
}
