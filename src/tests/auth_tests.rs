use crate::auth::jwt::SESSION_TTL_SECS;
use crate::core::errors::IntelliTaskError;
use crate::core::models::user::RegistrationForm;
use crate::infrastructure::storage::{Storage, in_memory::InMemoryStorage};
use crate::tests::{PASSWORD, create_test_service, create_test_service_with_storage, registration};
use std::sync::Arc;

#[tokio::test]
async fn test_register_returns_profile_and_token() {
    let service = create_test_service();
    let session = service
        .register(registration("  Alice@Example.COM ", "+15551234567"))
        .await
        .unwrap();

    assert_eq!(session.user.email, "alice@example.com");
    assert_eq!(session.user.full_name, "Test User");
    assert_eq!(session.user.phone_number, "+15551234567");

    let claims = service.validate_token(&session.token).unwrap();
    assert_eq!(claims.user_id, session.user.id);
    assert_eq!(claims.email, "alice@example.com");
    assert_eq!(claims.exp - claims.iat, SESSION_TTL_SECS);
}

#[tokio::test]
async fn test_register_stores_only_a_hash() {
    let service = create_test_service();
    let session = service.register(registration("a@example.com", "+15551234567")).await.unwrap();

    let user = service.get_user(&session.user.id).await.unwrap().unwrap();
    assert_ne!(user.password_hash, PASSWORD);
    assert!(user.password_hash.starts_with("$2"));
    assert!(!serde_json::to_string(&user).unwrap().contains(&user.password_hash));
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let service = create_test_service();
    service.register(registration("a@example.com", "+15551234567")).await.unwrap();

    let result = service.register(registration(" A@EXAMPLE.com", "+15557654321")).await;
    assert!(matches!(result, Err(IntelliTaskError::EmailAlreadyRegistered(_))));
}

#[tokio::test]
async fn test_register_duplicate_phone_conflicts() {
    let service = create_test_service();
    service.register(registration("a@example.com", "+15551234567")).await.unwrap();

    let result = service.register(registration("b@example.com", "+15551234567")).await;
    assert!(matches!(result, Err(IntelliTaskError::PhoneAlreadyRegistered(_))));
}

#[tokio::test]
async fn test_register_missing_fields() {
    let service = create_test_service();
    let form = RegistrationForm {
        full_name: Some("Test User".to_string()),
        ..Default::default()
    };
    match service.register(form).await {
        Err(IntelliTaskError::MissingFields(msg)) => assert_eq!(msg, "All fields are required"),
        other => panic!("expected MissingFields, got {:?}", other.map(|s| s.user)),
    }
}

#[tokio::test]
async fn test_register_rejects_weak_password() {
    let service = create_test_service();
    let mut form = registration("a@example.com", "+15551234567");
    form.password = Some("password".to_string());

    let result = service.register(form).await;
    assert!(matches!(result, Err(IntelliTaskError::InvalidInput(field, _)) if field == "password"));
}

#[tokio::test]
async fn test_sign_in_after_sign_up_issues_a_different_valid_token() {
    let service = create_test_service();
    let signup = service.register(registration("a@example.com", "+15551234567")).await.unwrap();

    let signin = service
        .authenticate(Some("A@example.com "), Some(PASSWORD))
        .await
        .unwrap();

    assert_ne!(signin.token, signup.token);
    assert_eq!(signin.user.id, signup.user.id);
    let claims = service.validate_token(&signin.token).unwrap();
    assert_eq!(claims.user_id, signup.user.id);
}

#[tokio::test]
async fn test_wrong_password_and_unknown_email_fail_identically() {
    let service = create_test_service();
    service.register(registration("a@example.com", "+15551234567")).await.unwrap();

    let wrong_password = service.authenticate(Some("a@example.com"), Some("Bb2@bbbb")).await;
    let unknown_email = service.authenticate(Some("nobody@example.com"), Some(PASSWORD)).await;

    assert!(matches!(wrong_password, Err(IntelliTaskError::InvalidCredentials)));
    assert!(matches!(unknown_email, Err(IntelliTaskError::InvalidCredentials)));
}

#[tokio::test]
async fn test_sign_in_requires_email_and_password() {
    let service = create_test_service();
    for (email, password) in [(None, Some(PASSWORD)), (Some("a@example.com"), None), (Some("  "), Some(""))] {
        match service.authenticate(email, password).await {
            Err(IntelliTaskError::MissingFields(msg)) => assert_eq!(msg, "Email and password are required"),
            other => panic!("expected MissingFields, got {:?}", other.map(|s| s.user)),
        }
    }
}

#[tokio::test]
async fn test_sign_in_upgrades_hash_to_configured_cost() {
    let storage = Arc::new(InMemoryStorage::new());
    let old = create_test_service_with_storage(storage.clone());
    let session = old.register(registration("a@example.com", "+15551234567")).await.unwrap();
    let before = storage.get_user(&session.user.id).await.unwrap().unwrap().password_hash;

    let upgraded = create_test_service_with_storage(storage.clone()).with_bcrypt_cost(5);
    upgraded.authenticate(Some("a@example.com"), Some(PASSWORD)).await.unwrap();

    let after = storage.get_user(&session.user.id).await.unwrap().unwrap().password_hash;
    assert_ne!(before, after);
    assert!(after.starts_with("$2b$05$"));
    // The new hash still verifies the same password.
    upgraded.authenticate(Some("a@example.com"), Some(PASSWORD)).await.unwrap();
}

#[test]
fn test_tampered_token_is_rejected() {
    let service = create_test_service();
    assert!(matches!(
        service.validate_token("not.a.token"),
        Err(IntelliTaskError::Unauthorized(_))
    ));
}
