//! Tests for compromise containment

use std::sync::Arc;

use uuid::Uuid;

use super::mocks::{recovery_config, Harness, SentKind};
use crate::domain::entities::user::RecoveryGrant;
use crate::clock::Clock;
use crate::domain::value_objects::RejectReason;
use crate::errors::DomainError;
use crate::repositories::UserRepository;
use crate::services::compromise::CompromiseHandler;

#[tokio::test]
async fn test_contain_revokes_only_the_subject() {
    let h = Harness::new();
    let subject = h.user("ada@example.com").await;
    let bystander = h.user("bob@example.com").await;
    for _ in 0..3 {
        h.engine.issue_pair(subject).await.unwrap();
    }
    h.engine.issue_pair(bystander).await.unwrap();

    let report = h.compromise.contain(subject, RejectReason::Replay).await.unwrap();

    assert_eq!(report.subject_id, subject);
    assert_eq!(report.revoked_sessions, 3);
    assert_eq!(h.active_count(subject).await, 0);
    assert_eq!(h.active_count(bystander).await, 1);

    report.alert_task.await.unwrap();
    let sent = h.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].kind, SentKind::SecurityAlert);
    assert_eq!(sent[0].address, "ada@example.com");
}

#[tokio::test]
async fn test_recovery_grant_matches_alert_link() {
    let h = Harness::new();
    let subject = h.user("ada@example.com").await;

    let report = h.compromise.contain(subject, RejectReason::Reuse).await.unwrap();
    report.alert_task.await.unwrap();

    let token = h.notifier.sent()[0].token().to_string();
    assert!(RecoveryGrant::looks_like_recovery_token(&token));

    let user = UserRepository::find_by_id(h.store.as_ref(), subject)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        user.recovery_token_hash,
        Some(RecoveryGrant::hash_token(&token))
    );
    assert_eq!(
        user.recovery_expires_at,
        Some(h.clock.now() + chrono::Duration::seconds(600))
    );
}

#[tokio::test]
async fn test_alert_failure_does_not_fail_containment() {
    let h = Harness::new();
    let subject = h.user("ada@example.com").await;
    h.engine.issue_pair(subject).await.unwrap();
    h.notifier.fail_deliveries();

    let report = h.compromise.contain(subject, RejectReason::Replay).await.unwrap();

    assert_eq!(report.revoked_sessions, 1);
    report.alert_task.await.unwrap();
    assert_eq!(h.notifier.sent().len(), 1);
}

#[tokio::test]
async fn test_unknown_subject_gets_no_alert() {
    let h = Harness::new();

    let report = h
        .compromise
        .contain(Uuid::new_v4(), RejectReason::Reuse)
        .await
        .unwrap();

    assert_eq!(report.revoked_sessions, 0);
    report.alert_task.await.unwrap();
    assert!(h.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_store_failure_sends_nothing() {
    let h = Harness::new();
    let subject = h.user("ada@example.com").await;
    h.store.simulate_outage(true);

    assert!(h.compromise.contain(subject, RejectReason::Replay).await.is_err());
    assert!(h.notifier.settle().await.is_empty());
}

#[tokio::test]
async fn test_out_of_range_recovery_expiry_is_an_error_not_a_panic() {
    let h = Harness::new();
    let subject = h.user("ada@example.com").await;
    h.engine.issue_pair(subject).await.unwrap();

    let mut config = recovery_config();
    config.token_expiry = 100_000_000_000_000;
    let clock: Arc<dyn Clock> = h.clock.clone();
    let handler = CompromiseHandler::new(
        h.store.clone(),
        h.store.clone(),
        h.notifier.clone(),
        clock,
        config,
    );

    let result = handler.contain(subject, RejectReason::Reuse).await;

    assert!(matches!(result, Err(DomainError::Internal { .. })));
    assert_eq!(h.active_count(subject).await, 1);
    assert!(h.notifier.settle().await.is_empty());
}
