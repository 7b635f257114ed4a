//! Login throttle tests.
//!
//! Five consecutive password mismatches lock the username for the attempt
//! window, even against the correct password. A successful login resets the
//! counter.

use auth_service::errors::AuthError;
use auth_service::services::TokenLifetimes;
use auth_service::AuthSettings;
use auth_test_utils::{TestAuthEngine, TEST_PASSWORD, TEST_WRONG_PASSWORD};
use std::time::Duration;

async fn fail_logins(engine: &TestAuthEngine, username: &str, times: usize) {
    for _ in 0..times {
        let result = engine.service().login(username, TEST_WRONG_PASSWORD).await;
        assert!(
            matches!(result, Err(AuthError::InvalidCredentials)),
            "expected InvalidCredentials, got {:?}",
            result.map(|_| ())
        );
    }
}

/// login("alice", wrong) x5, then the correct password is still refused;
/// once the window elapses the correct password succeeds.
#[tokio::test]
async fn test_throttle_alice_locked_out_then_recovers() -> Result<(), anyhow::Error> {
    let engine = TestAuthEngine::new()?;
    engine.seed_user("alice", TEST_PASSWORD).await;

    fail_logins(&engine, "alice", 5).await;
    assert_eq!(engine.login_attempts("alice").await, 5);

    let sixth = engine.service().login("alice", TEST_PASSWORD).await;
    assert!(matches!(sixth, Err(AuthError::TooManyAttempts)));

    // Blocked attempts do not extend or grow the counter
    assert_eq!(engine.login_attempts("alice").await, 5);

    engine.advance_seconds(15 * 60 + 1);

    let login = engine.service().login("alice", TEST_PASSWORD).await?;
    assert!(!login.access_token.is_empty());
    assert!(!login.refresh_token.is_empty());
    assert_eq!(engine.login_attempts("alice").await, 0);
    Ok(())
}

#[tokio::test]
async fn test_throttle_wrong_password_also_blocked_when_locked() -> Result<(), anyhow::Error> {
    let engine = TestAuthEngine::new()?;
    engine.seed_user("alice", TEST_PASSWORD).await;

    fail_logins(&engine, "alice", 5).await;

    let result = engine.service().login("alice", TEST_WRONG_PASSWORD).await;
    assert!(matches!(result, Err(AuthError::TooManyAttempts)));
    Ok(())
}

#[tokio::test]
async fn test_throttle_success_resets_counter() -> Result<(), anyhow::Error> {
    let engine = TestAuthEngine::new()?;
    engine.seed_user("alice", TEST_PASSWORD).await;

    fail_logins(&engine, "alice", 4).await;
    engine.service().login("alice", TEST_PASSWORD).await?;
    assert_eq!(engine.login_attempts("alice").await, 0);

    // Four more failures are allowed again before the lock
    fail_logins(&engine, "alice", 4).await;
    engine.service().login("alice", TEST_PASSWORD).await?;
    Ok(())
}

#[tokio::test]
async fn test_throttle_window_anchored_at_first_failure() -> Result<(), anyhow::Error> {
    let engine = TestAuthEngine::new()?;
    engine.seed_user("alice", TEST_PASSWORD).await;

    fail_logins(&engine, "alice", 1).await;
    engine.advance_seconds(600);
    fail_logins(&engine, "alice", 4).await;

    let locked = engine.service().login("alice", TEST_PASSWORD).await;
    assert!(matches!(locked, Err(AuthError::TooManyAttempts)));

    // Later failures did not push the expiry out: 900s after the first one
    engine.advance_seconds(301);
    engine.service().login("alice", TEST_PASSWORD).await?;
    Ok(())
}

#[tokio::test]
async fn test_throttle_is_per_username() -> Result<(), anyhow::Error> {
    let engine = TestAuthEngine::new()?;
    engine.seed_user("alice", TEST_PASSWORD).await;
    engine.seed_user("bob", TEST_PASSWORD).await;

    fail_logins(&engine, "alice", 5).await;

    engine.service().login("bob", TEST_PASSWORD).await?;
    assert!(matches!(
        engine.service().login("alice", TEST_PASSWORD).await,
        Err(AuthError::TooManyAttempts)
    ));
    Ok(())
}

#[tokio::test]
async fn test_throttle_honours_configured_limits() -> Result<(), anyhow::Error> {
    let engine = TestAuthEngine::with_settings(AuthSettings {
        lifetimes: TokenLifetimes::default(),
        login_max_attempts: 2,
        login_attempt_window: Duration::from_secs(60),
    })?;
    engine.seed_user("alice", TEST_PASSWORD).await;

    fail_logins(&engine, "alice", 2).await;
    assert!(matches!(
        engine.service().login("alice", TEST_PASSWORD).await,
        Err(AuthError::TooManyAttempts)
    ));

    engine.advance_seconds(61);
    engine.service().login("alice", TEST_PASSWORD).await?;
    Ok(())
}

#[tokio::test]
async fn test_throttle_error_is_not_a_credentials_error() -> Result<(), anyhow::Error> {
    let engine = TestAuthEngine::new()?;
    engine.seed_user("alice", TEST_PASSWORD).await;
    fail_logins(&engine, "alice", 5).await;

    let err = engine
        .service()
        .login("alice", TEST_PASSWORD)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "TOO_MANY_ATTEMPTS");
    assert!(!err.is_infrastructure());
    Ok(())
}
