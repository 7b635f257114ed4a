//! Logout cascade tests.
//!
//! Logout blacklists the access token, then the paired refresh token. Only
//! the access blacklist write is fatal.

use auth_service::errors::AuthError;
use auth_service::events::TOPIC_USER_LOGOUT;
use auth_service::models::TokenType;
use auth_test_utils::{
    jti_of, TestAuthEngine, TestClaimsBuilder, SIGNING_KEY_2_PEM, TEST_KEY_ID_2, TEST_PASSWORD,
};

#[tokio::test]
async fn test_logout_revokes_access_and_paired_refresh() -> Result<(), anyhow::Error> {
    let engine = TestAuthEngine::new()?;
    let alice = engine.seed_user("alice", TEST_PASSWORD).await;
    let login = engine.service().login("alice", TEST_PASSWORD).await?;
    let access_jti = jti_of(&login.access_token);
    let refresh_jti = jti_of(&login.refresh_token);

    engine.service().logout(&login.access_token).await?;

    assert!(engine.is_blacklisted(&access_jti).await);
    assert!(engine.is_blacklisted(&refresh_jti).await);
    assert!(engine.paired_refresh(&access_jti).await.is_none());
    assert!(engine
        .raw_get(&format!("token:active:{}:{}", alice.id, access_jti))
        .await
        .is_none());

    assert!(matches!(
        engine.service().validate(&login.access_token).await,
        Err(AuthError::TokenRevoked)
    ));
    assert!(matches!(
        engine.service().refresh(&login.refresh_token).await,
        Err(AuthError::TokenRevoked)
    ));
    Ok(())
}

#[tokio::test]
async fn test_logout_blacklist_ttls_cover_token_lifetimes() -> Result<(), anyhow::Error> {
    let engine = TestAuthEngine::new()?;
    engine.seed_user("alice", TEST_PASSWORD).await;
    let login = engine.service().login("alice", TEST_PASSWORD).await?;

    engine.advance_seconds(600);
    engine.service().logout(&login.access_token).await?;

    let access_ttl = engine
        .memory()
        .ttl(&format!("token:blacklist:{}", jti_of(&login.access_token)))
        .await
        .expect("access blacklisted");
    let refresh_ttl = engine
        .memory()
        .ttl(&format!("token:blacklist:{}", jti_of(&login.refresh_token)))
        .await
        .expect("refresh blacklisted");

    // Through the end of the exp second, which is still accepted
    assert_eq!(access_ttl.as_secs(), 3600 - 600 + 1);
    assert_eq!(refresh_ttl.as_secs(), 604_800);

    // The access entry outlives the token itself
    engine.advance_seconds(3000);
    assert!(matches!(
        engine.service().validate(&login.access_token).await,
        Err(AuthError::TokenRevoked)
    ));
    Ok(())
}

#[tokio::test]
async fn test_logout_without_pairing_succeeds() -> Result<(), anyhow::Error> {
    let engine = TestAuthEngine::new()?;
    let token = TestClaimsBuilder::access()
        .issued_at(engine.clock_timestamp())
        .expires_at(engine.clock_timestamp() + 3600)
        .sign();

    engine.service().logout(&token).await?;

    assert!(engine.is_blacklisted(&jti_of(&token)).await);
    assert!(matches!(
        engine.service().validate(&token).await,
        Err(AuthError::TokenRevoked)
    ));
    Ok(())
}

#[tokio::test]
async fn test_logout_is_idempotent() -> Result<(), anyhow::Error> {
    let engine = TestAuthEngine::new()?;
    engine.seed_user("alice", TEST_PASSWORD).await;
    let login = engine.service().login("alice", TEST_PASSWORD).await?;

    engine.service().logout(&login.access_token).await?;
    engine.service().logout(&login.access_token).await?;

    assert!(engine.is_blacklisted(&jti_of(&login.refresh_token)).await);
    Ok(())
}

#[tokio::test]
async fn test_logout_expired_access_token_still_cascades() -> Result<(), anyhow::Error> {
    let engine = TestAuthEngine::new()?;
    engine.seed_user("alice", TEST_PASSWORD).await;
    let login = engine.service().login("alice", TEST_PASSWORD).await?;

    engine.advance_seconds(3601);
    engine.service().logout(&login.access_token).await?;

    // Expired access needs no entry; the refresh sibling is revoked
    assert!(!engine.is_blacklisted(&jti_of(&login.access_token)).await);
    assert!(matches!(
        engine.service().refresh(&login.refresh_token).await,
        Err(AuthError::TokenRevoked)
    ));
    Ok(())
}

#[tokio::test]
async fn test_logout_with_refresh_token_is_invalid_and_writes_nothing() -> Result<(), anyhow::Error>
{
    let engine = TestAuthEngine::new()?;
    engine.seed_user("alice", TEST_PASSWORD).await;
    let login = engine.service().login("alice", TEST_PASSWORD).await?;
    let writes_before = engine.store().write_count();

    let result = engine.service().logout(&login.refresh_token).await;

    assert!(matches!(result, Err(AuthError::TokenInvalid(_))));
    assert_eq!(engine.store().write_count(), writes_before);
    engine.service().validate(&login.access_token).await?;
    Ok(())
}

#[tokio::test]
async fn test_logout_with_foreign_or_unsigned_token_writes_nothing() -> Result<(), anyhow::Error> {
    let engine = TestAuthEngine::new()?;
    let now = engine.clock_timestamp();
    let foreign = TestClaimsBuilder::access()
        .issued_at(now)
        .expires_at(now + 3600)
        .sign_with(SIGNING_KEY_2_PEM, TEST_KEY_ID_2);
    let unsigned = TestClaimsBuilder::access()
        .with_token_type(TokenType::Access)
        .unsigned();

    for token in [foreign, unsigned, "garbage".to_string()] {
        let result = engine.service().logout(&token).await;
        assert!(matches!(result, Err(AuthError::TokenInvalid(_))));
    }

    assert_eq!(engine.store().write_count(), 0);
    assert!(engine.memory().is_empty().await);
    Ok(())
}

#[tokio::test]
async fn test_logout_leaves_other_sessions_alive() -> Result<(), anyhow::Error> {
    let engine = TestAuthEngine::new()?;
    engine.seed_user("alice", TEST_PASSWORD).await;
    let phone = engine.service().login("alice", TEST_PASSWORD).await?;
    let laptop = engine.service().login("alice", TEST_PASSWORD).await?;

    engine.service().logout(&phone.access_token).await?;

    engine.service().validate(&laptop.access_token).await?;
    engine.service().refresh(&laptop.refresh_token).await?;
    Ok(())
}

#[tokio::test]
async fn test_logout_publishes_event() -> Result<(), anyhow::Error> {
    let engine = TestAuthEngine::new()?;
    let alice = engine.seed_user("alice", TEST_PASSWORD).await;
    let login = engine.service().login("alice", TEST_PASSWORD).await?;

    engine.service().logout(&login.access_token).await?;

    let events = engine.events().payloads_for(TOPIC_USER_LOGOUT);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["userId"], alice.id.as_str());
    assert_eq!(events[0]["jti"], jti_of(&login.access_token).as_str());
    Ok(())
}
