//! Redis adapter tests.
//!
//! These run against a live Redis given by `REDIS_URL` and are skipped when
//! it is not set.

use auth_service::store::{KvStore, RedisKvStore};
use std::time::Duration;

async fn connect() -> Option<RedisKvStore> {
    let url = std::env::var("REDIS_URL").ok()?;
    match RedisKvStore::connect(&url).await {
        Ok(store) => Some(store),
        Err(e) => panic!("REDIS_URL is set but Redis is unreachable: {e}"),
    }
}

fn unique_key(prefix: &str) -> String {
    format!("test:{}:{}", prefix, uuid::Uuid::new_v4())
}

#[tokio::test]
async fn test_redis_set_get_exists_delete() -> Result<(), anyhow::Error> {
    let Some(store) = connect().await else {
        eprintln!("REDIS_URL not set; skipping");
        return Ok(());
    };
    let key = unique_key("blacklist");

    assert_eq!(store.get(&key).await?, None);
    assert!(!store.exists(&key).await?);

    store.set(&key, "revoked", Duration::from_secs(60)).await?;
    assert_eq!(store.get(&key).await?.as_deref(), Some("revoked"));
    assert!(store.exists(&key).await?);

    store.delete(&key).await?;
    assert!(!store.exists(&key).await?);

    // Deleting an absent key is fine
    store.delete(&key).await?;
    Ok(())
}

#[tokio::test]
async fn test_redis_values_expire() -> Result<(), anyhow::Error> {
    let Some(store) = connect().await else {
        eprintln!("REDIS_URL not set; skipping");
        return Ok(());
    };
    let key = unique_key("pair");

    store.set(&key, "refresh-jti", Duration::from_millis(150)).await?;
    assert!(store.exists(&key).await?);

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(store.get(&key).await?, None);
    Ok(())
}

#[tokio::test]
async fn test_redis_increment_sets_expiry_on_create_only() -> Result<(), anyhow::Error> {
    let Some(store) = connect().await else {
        eprintln!("REDIS_URL not set; skipping");
        return Ok(());
    };
    let key = unique_key("login-attempts");

    assert_eq!(store.increment(&key, Duration::from_millis(300)).await?, 1);
    assert_eq!(store.increment(&key, Duration::from_secs(3600)).await?, 2);
    assert_eq!(store.get(&key).await?.as_deref(), Some("2"));

    // The window is anchored at the first increment
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert!(!store.exists(&key).await?);
    assert_eq!(store.increment(&key, Duration::from_secs(60)).await?, 1);

    store.delete(&key).await?;
    Ok(())
}

#[tokio::test]
async fn test_redis_concurrent_increments_are_exact() -> Result<(), anyhow::Error> {
    let Some(store) = connect().await else {
        eprintln!("REDIS_URL not set; skipping");
        return Ok(());
    };
    let key = unique_key("login-attempts");

    let increments = (0..20).map(|_| store.increment(&key, Duration::from_secs(60)));
    let mut results: Vec<i64> = futures::future::try_join_all(increments).await?;
    results.sort_unstable();

    assert_eq!(results, (1..=20).collect::<Vec<i64>>());
    store.delete(&key).await?;
    Ok(())
}
