//! Chaos tests for concurrent logins, validation and logout
//!
//! These tests validate that the engine stays consistent when many requests
//! hit the same identity at once:
//! - Concurrent failed logins are all counted
//! - Concurrent successful logins get distinct, independently revocable tokens
//! - A logout racing with validation never un-revokes a token

use auth_service::errors::AuthError;
use auth_service::AuthSettings;
use auth_test_utils::{jti_of, TestAuthEngine, TEST_PASSWORD, TEST_WRONG_PASSWORD};
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_concurrent_failed_logins_are_counted_exactly() -> Result<(), anyhow::Error> {
    let engine = TestAuthEngine::with_settings(AuthSettings {
        login_max_attempts: 100,
        login_attempt_window: Duration::from_secs(900),
        ..AuthSettings::default()
    })?;
    engine.seed_user("alice", TEST_PASSWORD).await;

    let attempts = (0..25).map(|_| engine.service().login("alice", TEST_WRONG_PASSWORD));
    let results = join_all(attempts).await;

    assert!(results
        .iter()
        .all(|r| matches!(r, Err(AuthError::InvalidCredentials))));
    assert_eq!(engine.login_attempts("alice").await, 25);
    Ok(())
}

#[tokio::test]
async fn test_concurrent_failures_lock_the_account() -> Result<(), anyhow::Error> {
    let engine = TestAuthEngine::new()?;
    engine.seed_user("alice", TEST_PASSWORD).await;

    let attempts = (0..20).map(|_| engine.service().login("alice", TEST_WRONG_PASSWORD));
    join_all(attempts).await;

    // Every attempt that passed the limit check is counted, so the counter
    // has reached the limit regardless of interleaving
    assert!(engine.login_attempts("alice").await >= 5);
    assert!(matches!(
        engine.service().login("alice", TEST_PASSWORD).await,
        Err(AuthError::TooManyAttempts)
    ));
    Ok(())
}

#[tokio::test]
async fn test_concurrent_logins_issue_distinct_sessions() -> Result<(), anyhow::Error> {
    let engine = TestAuthEngine::new()?;
    engine.seed_user("alice", TEST_PASSWORD).await;

    let logins = (0..10).map(|_| engine.service().login("alice", TEST_PASSWORD));
    let sessions: Vec<_> = join_all(logins)
        .await
        .into_iter()
        .collect::<Result<_, _>>()?;

    let mut jtis = HashSet::new();
    for session in &sessions {
        let access_jti = jti_of(&session.access_token);
        let refresh_jti = jti_of(&session.refresh_token);
        assert!(jtis.insert(access_jti.clone()), "duplicate access jti");
        assert!(jtis.insert(refresh_jti.clone()), "duplicate refresh jti");
        assert_eq!(
            engine.paired_refresh(&access_jti).await.as_deref(),
            Some(refresh_jti.as_str())
        );
        engine.service().validate(&session.access_token).await?;
    }
    Ok(())
}

#[tokio::test]
async fn test_concurrent_logouts_revoke_only_their_own_sessions() -> Result<(), anyhow::Error> {
    let engine = TestAuthEngine::new()?;
    engine.seed_user("alice", TEST_PASSWORD).await;

    let mut sessions = Vec::new();
    for _ in 0..8 {
        sessions.push(engine.service().login("alice", TEST_PASSWORD).await?);
    }
    let (revoked, kept) = sessions.split_at(4);

    let logouts = revoked
        .iter()
        .map(|s| engine.service().logout(&s.access_token));
    for result in join_all(logouts).await {
        result?;
    }

    for session in revoked {
        assert!(matches!(
            engine.service().refresh(&session.refresh_token).await,
            Err(AuthError::TokenRevoked)
        ));
    }
    for session in kept {
        engine.service().validate(&session.access_token).await?;
        engine.service().refresh(&session.refresh_token).await?;
    }
    Ok(())
}

#[tokio::test]
async fn test_logout_racing_validation_stays_revoked() -> Result<(), anyhow::Error> {
    let engine = Arc::new(TestAuthEngine::new()?);
    engine.seed_user("alice", TEST_PASSWORD).await;
    let login = engine.service().login("alice", TEST_PASSWORD).await?;

    let mut handles = Vec::new();
    for i in 0..20 {
        let engine = Arc::clone(&engine);
        let token = login.access_token.clone();
        handles.push(tokio::spawn(async move {
            if i == 10 {
                engine.service().logout(&token).await.map(|_| ())
            } else {
                match engine.service().validate(&token).await {
                    Ok(_) | Err(AuthError::TokenRevoked) => Ok(()),
                    Err(e) => Err(e),
                }
            }
        }));
    }
    for handle in handles {
        handle.await??;
    }

    assert!(matches!(
        engine.service().validate(&login.access_token).await,
        Err(AuthError::TokenRevoked)
    ));
    Ok(())
}
