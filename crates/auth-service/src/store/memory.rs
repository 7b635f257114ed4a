//! In-process [`KvStore`] with TTL semantics.
//!
//! Suitable for a single-process deployment or tests. Expiry is evaluated
//! against the injected [`Clock`], so a simulated clock can expire entries
//! without sleeping. Reads drop the expired key they hit; every
//! [`SWEEP_INTERVAL`] writes a sweep drops all expired keys, so keys that are
//! never read again (most blacklist entries) do not accumulate.

use super::KvStore;
use crate::clock::Clock;
use crate::errors::AuthError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Writes between full sweeps of expired entries.
pub const SWEEP_INTERVAL: u64 = 1024;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct MemoryKvStore {
    entries: Mutex<HashMap<String, Entry>>,
    clock: Arc<dyn Clock>,
    writes: AtomicU64,
}

impl MemoryKvStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
            writes: AtomicU64::new(0),
        }
    }

    fn expiry_from(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
        let ttl = chrono::Duration::from_std(ttl)
            .unwrap_or_else(|_| chrono::Duration::days(365 * 100));
        now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Counts a write and, on every [`SWEEP_INTERVAL`]th one, drops expired
    /// entries. Called with the map lock held.
    fn note_write(&self, entries: &mut HashMap<String, Entry>, now: DateTime<Utc>) {
        let previous = self.writes.fetch_add(1, Ordering::Relaxed);
        if previous % SWEEP_INTERVAL == SWEEP_INTERVAL - 1 {
            let before = entries.len();
            entries.retain(|_, entry| entry.expires_at > now);
            tracing::trace!(
                target: "auth.store",
                removed = before.saturating_sub(entries.len()),
                remaining = entries.len(),
                "Swept expired entries"
            );
        }
    }

    /// Remaining lifetime of a live key, `None` if absent or expired.
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        let now = self.clock.now();
        let entries = self.entries.lock().await;
        entries
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .and_then(|entry| (entry.expires_at - now).to_std().ok())
    }

    /// Number of live keys. Expired entries are not counted.
    pub async fn len(&self) -> usize {
        let now = self.clock.now();
        let entries = self.entries.lock().await;
        entries.values().filter(|e| e.expires_at > now).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AuthError> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), AuthError> {
        let now = self.clock.now();
        let expires_at = Self::expiry_from(now, ttl);
        let mut entries = self.entries.lock().await;
        self.note_write(&mut entries, now);
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn increment(&self, key: &str, ttl_on_create: Duration) -> Result<i64, AuthError> {
        let now = self.clock.now();
        let fresh_expiry = Self::expiry_from(now, ttl_on_create);
        let mut entries = self.entries.lock().await;
        self.note_write(&mut entries, now);

        let current = match entries.get(key) {
            Some(entry) if entry.expires_at > now => Some(entry.clone()),
            _ => None,
        };

        let (count, expires_at) = match current {
            Some(entry) => {
                let count: i64 = entry.value.parse().map_err(|_| {
                    AuthError::Store(format!("Value at {key} is not an integer"))
                })?;
                (count + 1, entry.expires_at)
            }
            None => (1, fresh_expiry),
        };

        entries.insert(
            key.to_string(),
            Entry {
                value: count.to_string(),
                expires_at,
            },
        );
        Ok(count)
    }

    async fn delete(&self, key: &str) -> Result<(), AuthError> {
        let mut entries = self.entries.lock().await;
        entries.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, AuthError> {
        Ok(self.get(key).await?.is_some())
    }
}
