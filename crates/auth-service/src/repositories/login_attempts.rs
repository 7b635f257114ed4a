//! Per-identity failed-login counter.
//!
//! The counter lives at `user:login-attempts:{username}` and expires one
//! window after the first failure. Concurrent failures rely on the store's
//! atomic increment; there is no read-modify-write here.

use crate::errors::AuthError;
use crate::observability::hash_for_correlation;
use crate::observability::metrics::record_rate_limit_decision;
use crate::store::{login_attempts_key, KvStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{instrument, warn};

#[derive(Clone)]
pub struct LoginThrottle {
    store: Arc<dyn KvStore>,
    max_attempts: u32,
    window: Duration,
}

impl LoginThrottle {
    pub fn new(store: Arc<dyn KvStore>, max_attempts: u32, window: Duration) -> Self {
        Self {
            store,
            max_attempts,
            window,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Failed attempts inside the current window. Missing or expired is 0.
    ///
    /// # Errors
    ///
    /// A stored value that is not an integer is reported as `AuthError::Store`
    /// so the throttle fails closed.
    pub async fn attempts(&self, username: &str) -> Result<i64, AuthError> {
        match self.store.get(&login_attempts_key(username)).await? {
            None => Ok(0),
            Some(raw) => raw.parse().map_err(|_| {
                AuthError::Store("Login attempt counter is not an integer".to_string())
            }),
        }
    }

    #[instrument(skip_all, fields(username_hash = %hash_for_correlation(username)))]
    pub async fn check_limit(&self, username: &str) -> Result<(), AuthError> {
        let attempts = self.attempts(username).await?;

        if attempts >= i64::from(self.max_attempts) {
            warn!(
                target: "auth.service",
                attempts,
                max_attempts = self.max_attempts,
                "Login rejected: too many failed attempts"
            );
            record_rate_limit_decision("rejected");
            return Err(AuthError::TooManyAttempts);
        }

        record_rate_limit_decision("allowed");
        Ok(())
    }

    /// Count one failed attempt and return the new total.
    pub async fn record_failure(&self, username: &str) -> Result<i64, AuthError> {
        self.store
            .increment(&login_attempts_key(username), self.window)
            .await
    }

    pub async fn reset(&self, username: &str) -> Result<(), AuthError> {
        self.store.delete(&login_attempts_key(username)).await
    }
}
