//! Refresh flow tests.
//!
//! Refresh reuses the refresh token (no rotation) and issues a new access
//! token paired with it.

use auth_service::errors::AuthError;
use auth_service::models::TokenType;
use auth_test_utils::{
    jti_of, TestAuthEngine, TestClaimsBuilder, TokenAssertions, TEST_KEY_ID_1, TEST_PASSWORD,
};

#[tokio::test]
async fn test_refresh_issues_new_access_token() -> Result<(), anyhow::Error> {
    let engine = TestAuthEngine::new()?;
    let alice = engine.seed_user("alice", TEST_PASSWORD).await;
    let login = engine.service().login("alice", TEST_PASSWORD).await?;

    engine.advance_seconds(60);
    let refreshed = engine.service().refresh(&login.refresh_token).await?;

    assert_eq!(refreshed.token_type, "Bearer");
    assert_eq!(refreshed.expires_in, 3600);
    assert_ne!(refreshed.access_token, login.access_token);
    refreshed
        .access_token
        .assert_valid_jwt()
        .assert_token_type("ACCESS")
        .assert_signed_by(TEST_KEY_ID_1)
        .assert_for_subject(&alice.id);

    let claims = engine.service().validate(&refreshed.access_token).await?;
    assert_eq!(claims.token_type, TokenType::Access);
    Ok(())
}

#[tokio::test]
async fn test_refresh_with_access_token_is_invalid() -> Result<(), anyhow::Error> {
    let engine = TestAuthEngine::new()?;
    engine.seed_user("alice", TEST_PASSWORD).await;
    let login = engine.service().login("alice", TEST_PASSWORD).await?;

    let result = engine.service().refresh(&login.access_token).await;

    assert!(
        matches!(result, Err(AuthError::TokenInvalid(_))),
        "an ACCESS token must not be accepted for refresh"
    );
    Ok(())
}

#[tokio::test]
async fn test_refresh_does_not_rotate_refresh_token() -> Result<(), anyhow::Error> {
    let engine = TestAuthEngine::new()?;
    engine.seed_user("alice", TEST_PASSWORD).await;
    let login = engine.service().login("alice", TEST_PASSWORD).await?;

    let first = engine.service().refresh(&login.refresh_token).await?;
    let second = engine.service().refresh(&login.refresh_token).await?;

    assert_ne!(jti_of(&first.access_token), jti_of(&second.access_token));
    Ok(())
}

#[tokio::test]
async fn test_refresh_pairs_new_access_with_presented_refresh() -> Result<(), anyhow::Error> {
    let engine = TestAuthEngine::new()?;
    engine.seed_user("alice", TEST_PASSWORD).await;
    let login = engine.service().login("alice", TEST_PASSWORD).await?;
    let refresh_jti = jti_of(&login.refresh_token);

    let refreshed = engine.service().refresh(&login.refresh_token).await?;

    assert_eq!(
        engine
            .paired_refresh(&jti_of(&refreshed.access_token))
            .await
            .as_deref(),
        Some(refresh_jti.as_str())
    );

    // Logging out the refreshed access token still kills the refresh token
    engine.service().logout(&refreshed.access_token).await?;
    assert!(matches!(
        engine.service().refresh(&login.refresh_token).await,
        Err(AuthError::TokenRevoked)
    ));
    Ok(())
}

#[tokio::test]
async fn test_refresh_rejects_expired_refresh_token() -> Result<(), anyhow::Error> {
    let engine = TestAuthEngine::new()?;
    engine.seed_user("alice", TEST_PASSWORD).await;
    let login = engine.service().login("alice", TEST_PASSWORD).await?;

    engine.advance_seconds(604_800 + 1);

    let result = engine.service().refresh(&login.refresh_token).await;
    assert!(matches!(result, Err(AuthError::TokenInvalid(_))));
    Ok(())
}

#[tokio::test]
async fn test_refresh_for_deactivated_identity_is_invalid_credentials() -> Result<(), anyhow::Error>
{
    let engine = TestAuthEngine::new()?;
    let mut alice = engine.seed_user("alice", TEST_PASSWORD).await;
    let login = engine.service().login("alice", TEST_PASSWORD).await?;

    alice.is_active = false;
    engine.identities().insert(alice).await;

    let result = engine.service().refresh(&login.refresh_token).await;
    assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    Ok(())
}

#[tokio::test]
async fn test_refresh_for_unknown_subject_is_invalid_credentials() -> Result<(), anyhow::Error> {
    let engine = TestAuthEngine::new()?;
    let token = TestClaimsBuilder::refresh()
        .for_subject("ghost")
        .issued_at(engine.clock_timestamp())
        .expires_at(engine.clock_timestamp() + 600)
        .sign();

    let result = engine.service().refresh(&token).await;
    assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    Ok(())
}

#[tokio::test]
async fn test_refresh_pairing_ttl_tracks_refresh_expiry() -> Result<(), anyhow::Error> {
    let engine = TestAuthEngine::new()?;
    engine.seed_user("alice", TEST_PASSWORD).await;
    let login = engine.service().login("alice", TEST_PASSWORD).await?;

    engine.advance_seconds(100_000);
    let refreshed = engine.service().refresh(&login.refresh_token).await?;

    let ttl = engine
        .memory()
        .ttl(&format!("token:pair:{}", jti_of(&refreshed.access_token)))
        .await
        .expect("pairing recorded");
    assert_eq!(ttl.as_secs(), 604_800 - 100_000 + 1);
    Ok(())
}
