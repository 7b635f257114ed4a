//! Fault-injecting and recording test doubles
//!
//! `FlakyKvStore` and `FlakyIdentityStore` wrap the in-memory adapters and
//! fail selected operations on demand. `RecordingEventSink` keeps every
//! published event; `FailingEventSink` rejects them all.

use async_trait::async_trait;
use auth_service::errors::AuthError;
use auth_service::events::EventSink;
use auth_service::models::{Identity, NewIdentity};
use auth_service::repositories::{IdentityStore, InMemoryIdentityStore};
use auth_service::store::{KvStore, MemoryKvStore};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Store operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KvOperation {
    Get,
    Set,
    Increment,
    Delete,
    Exists,
}

#[derive(Debug, Clone)]
struct FailureRule {
    operation: KvOperation,
    key_prefix: String,
}

/// KV store that fails matching operations with `AuthError::Store`
///
/// # Example
/// ```rust,ignore
/// let store = FlakyKvStore::new(memory);
/// // Pairing writes fail, everything else works
/// store.fail(KvOperation::Set, "token:pair:");
/// ```
pub struct FlakyKvStore {
    inner: Arc<MemoryKvStore>,
    rules: Mutex<Vec<FailureRule>>,
    writes: AtomicUsize,
}

impl FlakyKvStore {
    pub fn new(inner: Arc<MemoryKvStore>) -> Self {
        Self {
            inner,
            rules: Mutex::new(Vec::new()),
            writes: AtomicUsize::new(0),
        }
    }

    /// Fail `operation` on every key starting with `key_prefix` (`""` for all).
    pub fn fail(&self, operation: KvOperation, key_prefix: &str) {
        self.rules.lock().unwrap().push(FailureRule {
            operation,
            key_prefix: key_prefix.to_string(),
        });
    }

    /// Fail every operation on every key.
    pub fn fail_everything(&self) {
        for operation in [
            KvOperation::Get,
            KvOperation::Set,
            KvOperation::Increment,
            KvOperation::Delete,
            KvOperation::Exists,
        ] {
            self.fail(operation, "");
        }
    }

    /// Remove all failure rules.
    pub fn heal(&self) {
        self.rules.lock().unwrap().clear();
    }

    /// Successful `set`, `increment` and `delete` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &Arc<MemoryKvStore> {
        &self.inner
    }

    fn check(&self, operation: KvOperation, key: &str) -> Result<(), AuthError> {
        let rules = self.rules.lock().unwrap();
        if rules
            .iter()
            .any(|r| r.operation == operation && key.starts_with(&r.key_prefix))
        {
            return Err(AuthError::Store(format!(
                "injected {:?} failure for {}",
                operation, key
            )));
        }
        Ok(())
    }

    fn count_write<T>(&self, result: Result<T, AuthError>) -> Result<T, AuthError> {
        if result.is_ok() {
            self.writes.fetch_add(1, Ordering::SeqCst);
        }
        result
    }
}

#[async_trait]
impl KvStore for FlakyKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AuthError> {
        self.check(KvOperation::Get, key)?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), AuthError> {
        self.check(KvOperation::Set, key)?;
        self.count_write(self.inner.set(key, value, ttl).await)
    }

    async fn increment(&self, key: &str, ttl_on_create: Duration) -> Result<i64, AuthError> {
        self.check(KvOperation::Increment, key)?;
        self.count_write(self.inner.increment(key, ttl_on_create).await)
    }

    async fn delete(&self, key: &str) -> Result<(), AuthError> {
        self.check(KvOperation::Delete, key)?;
        self.count_write(self.inner.delete(key).await)
    }

    async fn exists(&self, key: &str) -> Result<bool, AuthError> {
        self.check(KvOperation::Exists, key)?;
        self.inner.exists(key).await
    }
}

/// Identity store that can fail reads or `record_login` on demand
pub struct FlakyIdentityStore {
    inner: Arc<InMemoryIdentityStore>,
    fail_reads: AtomicBool,
    fail_record_login: AtomicBool,
}

impl FlakyIdentityStore {
    pub fn new(inner: Arc<InMemoryIdentityStore>) -> Self {
        Self {
            inner,
            fail_reads: AtomicBool::new(false),
            fail_record_login: AtomicBool::new(false),
        }
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_record_login(&self, fail: bool) {
        self.fail_record_login.store(fail, Ordering::SeqCst);
    }

    fn check_read(&self) -> Result<(), AuthError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AuthError::IdentityStore(
                "injected read failure".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityStore for FlakyIdentityStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Identity>, AuthError> {
        self.check_read()?;
        self.inner.find_by_id(id).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, AuthError> {
        self.check_read()?;
        self.inner.find_by_username(username).await
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, AuthError> {
        self.check_read()?;
        self.inner.exists_by_username(username).await
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, AuthError> {
        self.check_read()?;
        self.inner.exists_by_email(email).await
    }

    async fn exists_by_document_number(&self, document_number: &str) -> Result<bool, AuthError> {
        self.check_read()?;
        self.inner.exists_by_document_number(document_number).await
    }

    async fn create(&self, identity: NewIdentity) -> Result<Identity, AuthError> {
        self.inner.create(identity).await
    }

    async fn record_login(&self, id: &str, at: DateTime<Utc>) -> Result<(), AuthError> {
        if self.fail_record_login.load(Ordering::SeqCst) {
            return Err(AuthError::IdentityStore(
                "injected record_login failure".to_string(),
            ));
        }
        self.inner.record_login(id, at).await
    }
}

/// Event sink that keeps every published event in order
#[derive(Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<(String, serde_json::Value)>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(String, serde_json::Value)> {
        self.events.lock().unwrap().clone()
    }

    /// Payloads published on `topic`, in order.
    pub fn payloads_for(&self, topic: &str) -> Vec<serde_json::Value> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, payload)| payload.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

#[async_trait]
impl EventSink for RecordingEventSink {
    async fn publish(&self, topic: &str, payload: serde_json::Value) -> Result<(), AuthError> {
        self.events
            .lock()
            .unwrap()
            .push((topic.to_string(), payload));
        Ok(())
    }
}

/// Event sink whose every publish fails
#[derive(Debug, Default)]
pub struct FailingEventSink {
    attempts: AtomicUsize,
}

impl FailingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventSink for FailingEventSink {
    async fn publish(&self, _topic: &str, _payload: serde_json::Value) -> Result<(), AuthError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(AuthError::Store("event bus unavailable".to_string()))
    }
}
