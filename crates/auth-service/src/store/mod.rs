//! TTL-capable key-value store capability.
//!
//! Every operation is atomic for a single key; nothing here assumes
//! multi-key transactions. Two adapters ship with the crate:
//!
//! - [`redis::RedisKvStore`] for deployments (shared across replicas)
//! - [`memory::MemoryKvStore`] for single-process setups and tests
//!
//! # Key Patterns
//!
//! - `user:login-attempts:{username}` - failed login counter
//! - `token:blacklist:{jti}` - revoked token marker
//! - `token:active:{subject}:{jti}` - active access token registry
//! - `token:pair:{access_jti}` - access jti -> refresh jti

pub mod lua_scripts;
pub mod memory;
pub mod redis;

use crate::errors::AuthError;
use async_trait::async_trait;
use std::time::Duration;

pub use self::memory::MemoryKvStore;
pub use self::redis::RedisKvStore;

#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read a value. Expired and absent keys both return `None`.
    async fn get(&self, key: &str) -> Result<Option<String>, AuthError>;

    /// Write a value that expires after `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), AuthError>;

    /// Atomically increment an integer counter and return the new value.
    ///
    /// When the increment creates the key (result is 1), the expiry `ttl_on_create`
    /// is applied in the same atomic step, so a counter can never be left
    /// without an expiry.
    async fn increment(&self, key: &str, ttl_on_create: Duration) -> Result<i64, AuthError>;

    /// Remove a key. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), AuthError>;

    async fn exists(&self, key: &str) -> Result<bool, AuthError>;
}

pub(crate) fn login_attempts_key(username: &str) -> String {
    format!("user:login-attempts:{username}")
}

pub(crate) fn blacklist_key(jti: &str) -> String {
    format!("token:blacklist:{jti}")
}

pub(crate) fn active_token_key(subject: &str, jti: &str) -> String {
    format!("token:active:{subject}:{jti}")
}

pub(crate) fn pairing_key(access_jti: &str) -> String {
    format!("token:pair:{access_jti}")
}
