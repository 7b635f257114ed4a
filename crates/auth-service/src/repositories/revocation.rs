//! Revocation state: blacklist, active-token registry and access/refresh pairing.
//!
//! Each operation is one store call and is safe to retry. Multi-step
//! sequences built on top of these (logout) order their writes so a crash
//! between steps leaves more tokens blacklisted, never fewer.

use crate::errors::AuthError;
use crate::store::{active_token_key, blacklist_key, pairing_key, KvStore};
use std::sync::Arc;
use std::time::Duration;

const REVOKED_MARKER: &str = "revoked";
const ACTIVE_MARKER: &str = "active";

#[derive(Clone)]
pub struct RevocationStore {
    store: Arc<dyn KvStore>,
}

impl RevocationStore {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// `ttl` must cover the token's remaining lifetime, or the token would
    /// become valid again once the entry expires.
    pub async fn blacklist(&self, jti: &str, ttl: Duration) -> Result<(), AuthError> {
        self.store
            .set(&blacklist_key(jti), REVOKED_MARKER, ttl)
            .await
    }

    pub async fn is_blacklisted(&self, jti: &str) -> Result<bool, AuthError> {
        self.store.exists(&blacklist_key(jti)).await
    }

    /// Informational only. Validation never reads the registry.
    pub async fn register_active(
        &self,
        subject: &str,
        jti: &str,
        ttl: Duration,
    ) -> Result<(), AuthError> {
        self.store
            .set(&active_token_key(subject, jti), ACTIVE_MARKER, ttl)
            .await
    }

    pub async fn unregister_active(&self, subject: &str, jti: &str) -> Result<(), AuthError> {
        self.store.delete(&active_token_key(subject, jti)).await
    }

    pub async fn pair(
        &self,
        access_jti: &str,
        refresh_jti: &str,
        ttl: Duration,
    ) -> Result<(), AuthError> {
        self.store
            .set(&pairing_key(access_jti), refresh_jti, ttl)
            .await
    }

    pub async fn lookup_refresh_for(&self, access_jti: &str) -> Result<Option<String>, AuthError> {
        self.store.get(&pairing_key(access_jti)).await
    }

    pub async fn unpair(&self, access_jti: &str) -> Result<(), AuthError> {
        self.store.delete(&pairing_key(access_jti)).await
    }
}
