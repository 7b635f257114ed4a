//! Redis-backed [`KvStore`].
//!
//! # Connection Pattern
//!
//! `ConnectionManager` is cheap to clone and reconnects on its own after a
//! dropped connection. Each operation clones it; no locking is needed.
//!
//! Backpressure and pool sizing are left to the Redis client.

use super::lua_scripts;
use super::KvStore;
use crate::errors::AuthError;
use crate::observability::metrics::record_store_operation;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, Script};
use std::time::{Duration, Instant};
use tracing::{error, instrument, warn};

#[derive(Clone)]
pub struct RedisKvStore {
    connection: ConnectionManager,
    increment_script: Script,
}

impl RedisKvStore {
    /// Connect to Redis.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Store` if the URL is invalid or the first
    /// connection cannot be established.
    pub async fn connect(redis_url: &str) -> Result<Self, AuthError> {
        let client = Client::open(redis_url).map_err(|e| {
            // Do NOT log redis_url; it may carry a password
            error!(target: "auth.store", error = %e, "Failed to open Redis client");
            AuthError::Store(format!("Failed to open Redis client: {e}"))
        })?;

        let connection = ConnectionManager::new(client).await.map_err(|e| {
            error!(target: "auth.store", error = %e, "Failed to connect to Redis");
            AuthError::Store(format!("Failed to connect to Redis: {e}"))
        })?;

        Ok(Self {
            connection,
            increment_script: Script::new(lua_scripts::INCREMENT_WITH_EXPIRY),
        })
    }
}

/// Redis rejects a zero expiry, so sub-millisecond TTLs round up to 1 ms.
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

fn store_error(operation: &'static str, e: redis::RedisError) -> AuthError {
    warn!(target: "auth.store", operation, error = %e, "Redis operation failed");
    AuthError::Store(format!("Redis {operation} failed: {e}"))
}

fn finish<T>(
    operation: &'static str,
    started: Instant,
    result: Result<T, AuthError>,
) -> Result<T, AuthError> {
    let status = if result.is_ok() { "success" } else { "error" };
    record_store_operation(operation, status, started.elapsed());
    result
}

#[async_trait]
impl KvStore for RedisKvStore {
    #[instrument(skip_all)]
    async fn get(&self, key: &str) -> Result<Option<String>, AuthError> {
        let started = Instant::now();
        let mut conn = self.connection.clone();
        let result = conn
            .get::<_, Option<String>>(key)
            .await
            .map_err(|e| store_error("get", e));
        finish("get", started, result)
    }

    #[instrument(skip_all)]
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), AuthError> {
        let started = Instant::now();
        let mut conn = self.connection.clone();
        let result = conn
            .pset_ex::<_, _, ()>(key, value, ttl_millis(ttl))
            .await
            .map_err(|e| store_error("set", e));
        finish("set", started, result)
    }

    #[instrument(skip_all)]
    async fn increment(&self, key: &str, ttl_on_create: Duration) -> Result<i64, AuthError> {
        let started = Instant::now();
        let mut conn = self.connection.clone();
        let result: Result<i64, AuthError> = self
            .increment_script
            .key(key)
            .arg(ttl_millis(ttl_on_create))
            .invoke_async(&mut conn)
            .await
            .map_err(|e| store_error("increment", e));
        finish("increment", started, result)
    }

    #[instrument(skip_all)]
    async fn delete(&self, key: &str) -> Result<(), AuthError> {
        let started = Instant::now();
        let mut conn = self.connection.clone();
        let result = conn
            .del::<_, ()>(key)
            .await
            .map_err(|e| store_error("delete", e));
        finish("delete", started, result)
    }

    #[instrument(skip_all)]
    async fn exists(&self, key: &str) -> Result<bool, AuthError> {
        let started = Instant::now();
        let mut conn = self.connection.clone();
        let result = conn
            .exists::<_, bool>(key)
            .await
            .map_err(|e| store_error("exists", e));
        finish("exists", started, result)
    }
}
