use super::*;

#[test]
fn test_token_error_bridges_into_domain_error() {
    let error: DomainError = TokenError::TokenExpired.into();
    assert!(matches!(error, DomainError::Token(TokenError::TokenExpired)));
    assert_eq!(error.to_string(), "Token expired");
}

#[test]
fn test_infrastructure_classification() {
    assert!(DomainError::Internal {
        message: "pool timed out".to_string()
    }
    .is_infrastructure());
    assert!(DomainError::Token(TokenError::TokenGenerationFailed).is_infrastructure());

    assert!(!DomainError::Unauthorized.is_infrastructure());
    assert!(!DomainError::Token(TokenError::InvalidSignature).is_infrastructure());
}

#[test]
fn test_notification_error_messages() {
    let error = NotificationError::Rejected { status: 503 };
    assert_eq!(error.to_string(), "Notification rejected by provider: 503");
}
