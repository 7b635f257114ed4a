//! Registration tests.
//!
//! A registered identity can log in straight away with the default role of
//! its user type.

use auth_service::errors::AuthError;
use auth_service::events::TOPIC_USER_REGISTERED;
use auth_service::models::{RegistrationRequest, UserType};
use auth_test_utils::{TestAuthEngine, TokenAssertions};
use secrecy::SecretString;

fn request(username: &str, email: &str, document_number: &str) -> RegistrationRequest {
    RegistrationRequest {
        username: username.to_string(),
        email: email.to_string(),
        password: SecretString::from("password123"),
        document_type: "DNI".to_string(),
        document_number: document_number.to_string(),
        phone_number: None,
        user_type: UserType::Customer,
    }
}

#[tokio::test]
async fn test_register_then_login() -> Result<(), anyhow::Error> {
    let engine = TestAuthEngine::new()?;

    let identity = engine
        .service()
        .register(request("alice", "alice@example.com", "70001111"))
        .await?;
    let login = engine.service().login("alice", "password123").await?;

    assert_eq!(login.user.id, identity.id);
    login
        .access_token
        .assert_valid_jwt()
        .assert_has_role("ROLE_CUSTOMER");
    Ok(())
}

#[tokio::test]
async fn test_register_assigns_default_role_per_user_type() -> Result<(), anyhow::Error> {
    let engine = TestAuthEngine::new()?;
    let cases = [
        (UserType::Admin, "ROLE_ADMIN"),
        (UserType::Employee, "ROLE_EMPLOYEE"),
        (UserType::Customer, "ROLE_CUSTOMER"),
        (UserType::YankiUser, "ROLE_YANKI_USER"),
        (UserType::BootcoinUser, "ROLE_BOOTCOIN_USER"),
    ];

    for (i, (user_type, role)) in cases.into_iter().enumerate() {
        let mut req = request(
            &format!("user{i}"),
            &format!("user{i}@example.com"),
            &format!("doc-{i}"),
        );
        req.user_type = user_type;

        let identity = engine.service().register(req).await?;
        assert_eq!(identity.roles, vec![role.to_string()]);
        assert_eq!(identity.user_type, user_type);
        assert!(identity.is_active);
    }
    Ok(())
}

#[tokio::test]
async fn test_register_duplicates_name_the_field() -> Result<(), anyhow::Error> {
    let engine = TestAuthEngine::new()?;
    engine
        .service()
        .register(request("alice", "alice@example.com", "111"))
        .await?;

    let username = engine
        .service()
        .register(request("alice", "new@example.com", "222"))
        .await;
    let email = engine
        .service()
        .register(request("bob", "alice@example.com", "222"))
        .await;
    let document = engine
        .service()
        .register(request("bob", "bob@example.com", "111"))
        .await;

    assert!(matches!(username, Err(AuthError::UserAlreadyExists(f)) if f == "username"));
    assert!(matches!(email, Err(AuthError::UserAlreadyExists(f)) if f == "email"));
    assert!(matches!(document, Err(AuthError::UserAlreadyExists(f)) if f == "document_number"));
    assert_eq!(engine.identities().len().await, 1);
    Ok(())
}

#[tokio::test]
async fn test_register_rejects_short_password() -> Result<(), anyhow::Error> {
    let engine = TestAuthEngine::new()?;
    let req = RegistrationRequest {
        password: SecretString::from("1234567"),
        ..request("alice", "alice@example.com", "111")
    };

    let err = engine.service().register(req).await.unwrap_err();

    assert!(matches!(err, AuthError::InvalidRequest(_)));
    assert_eq!(err.code(), "INVALID_REQUEST");
    Ok(())
}

#[tokio::test]
async fn test_register_publishes_event_without_password() -> Result<(), anyhow::Error> {
    let engine = TestAuthEngine::new()?;

    let identity = engine
        .service()
        .register(request("alice", "alice@example.com", "111"))
        .await?;

    let events = engine.events().payloads_for(TOPIC_USER_REGISTERED);
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event["userId"], identity.id.as_str());
    assert_eq!(event["email"], "alice@example.com");
    assert_eq!(event["documentNumber"], "111");
    assert_eq!(event["userType"], "CUSTOMER");

    let raw = event.to_string();
    assert!(!raw.contains("password123"));
    assert!(!raw.contains(&identity.password_hash));
    Ok(())
}

#[tokio::test]
async fn test_register_trims_fields_and_login_matches() -> Result<(), anyhow::Error> {
    let engine = TestAuthEngine::new()?;

    let identity = engine
        .service()
        .register(request("  alice ", " alice@example.com ", " 70001111 "))
        .await?;
    assert_eq!(identity.username, "alice");
    assert_eq!(identity.email, "alice@example.com");
    assert_eq!(identity.document_number, "70001111");

    let login = engine.service().login(" alice ", "password123").await?;
    assert_eq!(login.user.id, identity.id);
    engine.service().login("alice", "password123").await?;

    let result = engine
        .service()
        .register(request("bob", "ALICE@example.com", "70002222"))
        .await;
    assert!(matches!(result, Err(AuthError::UserAlreadyExists(f)) if f == "email"));
    Ok(())
}

#[tokio::test]
async fn test_register_concurrent_same_email_and_document_admits_one() -> Result<(), anyhow::Error> {
    let engine = TestAuthEngine::new()?;

    let (first, second) = tokio::join!(
        engine
            .service()
            .register(request("alice", "shared@example.com", "70001111")),
        engine
            .service()
            .register(request("bob", "shared@example.com", "70001111")),
    );

    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(outcomes
        .iter()
        .any(|r| matches!(r, Err(AuthError::UserAlreadyExists(f)) if f == "email")));
    assert_eq!(engine.identities().len().await, 1);
    Ok(())
}
