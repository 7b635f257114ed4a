//! Engine test harness
//!
//! Provides `TestAuthEngine`: a fully wired `AuthService` over in-memory
//! adapters, a manual clock, and fault-injecting wrappers, so integration
//! tests can drive real flows and then inspect or break the state underneath.

use crate::crypto_fixtures::SIGNING_KEY_1_PEM;
use crate::doubles::{FlakyIdentityStore, FlakyKvStore, RecordingEventSink};
use crate::identity_builder::{test_password_hasher, TestIdentityBuilder};
use crate::test_ids::TEST_KEY_ID_1;
use auth_service::clock::{Clock, ManualClock};
use auth_service::crypto::RsaSigner;
use auth_service::events::EventSink;
use auth_service::models::Identity;
use auth_service::repositories::InMemoryIdentityStore;
use auth_service::store::{KvStore, MemoryKvStore};
use auth_service::{AuthDependencies, AuthService, AuthSettings};
use std::sync::Arc;

/// Test harness wiring the engine for integration tests
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_logout_flow() -> Result<()> {
///     let engine = TestAuthEngine::new()?;
///     engine.seed_user("alice", TEST_PASSWORD).await;
///
///     let login = engine.service().login("alice", TEST_PASSWORD).await?;
///     engine.service().logout(&login.access_token).await?;
///
///     engine.advance_seconds(3601);
///     Ok(())
/// }
/// ```
pub struct TestAuthEngine {
    service: AuthService,
    clock: Arc<ManualClock>,
    store: Arc<FlakyKvStore>,
    identities: Arc<InMemoryIdentityStore>,
    flaky_identities: Arc<FlakyIdentityStore>,
    events: Arc<RecordingEventSink>,
}

impl TestAuthEngine {
    /// Engine with default settings and a recording event sink.
    pub fn new() -> Result<Self, anyhow::Error> {
        Self::with_settings(AuthSettings::default())
    }

    pub fn with_settings(settings: AuthSettings) -> Result<Self, anyhow::Error> {
        Self::build(settings, None)
    }

    /// Engine that publishes to `sink` instead of the recording sink.
    pub fn with_event_sink(sink: Arc<dyn EventSink>) -> Result<Self, anyhow::Error> {
        Self::build(AuthSettings::default(), Some(sink))
    }

    fn build(
        settings: AuthSettings,
        sink: Option<Arc<dyn EventSink>>,
    ) -> Result<Self, anyhow::Error> {
        let clock = Arc::new(ManualClock::starting_now());
        let memory = Arc::new(MemoryKvStore::new(clock.clone()));
        let store = Arc::new(FlakyKvStore::new(memory));
        let identities = Arc::new(InMemoryIdentityStore::new());
        let flaky_identities = Arc::new(FlakyIdentityStore::new(identities.clone()));
        let events = Arc::new(RecordingEventSink::new());

        let signer = RsaSigner::from_pem(SIGNING_KEY_1_PEM, TEST_KEY_ID_1)
            .map_err(|e| anyhow::anyhow!("Failed to load test signing key: {}", e))?;

        let sink: Arc<dyn EventSink> = match sink {
            Some(sink) => sink,
            None => events.clone(),
        };

        let service = AuthService::new(
            AuthDependencies {
                store: store.clone(),
                identities: flaky_identities.clone(),
                signer: Arc::new(signer),
                hasher: Arc::new(test_password_hasher()),
                clock: clock.clone(),
                events: sink,
            },
            settings,
        )
        .map_err(|e| anyhow::anyhow!("Failed to build auth service: {}", e))?;

        Ok(Self {
            service,
            clock,
            store,
            identities,
            flaky_identities,
            events,
        })
    }

    pub fn service(&self) -> &AuthService {
        &self.service
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    /// Simulated now as Unix seconds.
    pub fn clock_timestamp(&self) -> i64 {
        self.clock.now_timestamp()
    }

    /// Move simulated time forward.
    pub fn advance_seconds(&self, seconds: i64) {
        self.clock.advance(chrono::Duration::seconds(seconds));
    }

    /// The store the engine talks to, with fault injection.
    pub fn store(&self) -> &FlakyKvStore {
        &self.store
    }

    /// The backing in-memory store, bypassing fault injection.
    pub fn memory(&self) -> &MemoryKvStore {
        self.store.inner()
    }

    pub fn identities(&self) -> &InMemoryIdentityStore {
        &self.identities
    }

    /// Fault-injection handle on the identity store the engine uses.
    pub fn identity_faults(&self) -> &FlakyIdentityStore {
        &self.flaky_identities
    }

    pub fn events(&self) -> &RecordingEventSink {
        &self.events
    }

    /// Insert an active customer with the given password.
    pub async fn seed_user(&self, username: &str, password: &str) -> Identity {
        self.seed(TestIdentityBuilder::new(username).with_password(password))
            .await
    }

    pub async fn seed(&self, builder: TestIdentityBuilder) -> Identity {
        let identity = builder.build();
        self.identities.insert(identity.clone()).await;
        identity
    }

    /// Raw store value, bypassing fault injection.
    pub async fn raw_get(&self, key: &str) -> Option<String> {
        self.memory().get(key).await.expect("memory store get")
    }

    pub async fn is_blacklisted(&self, jti: &str) -> bool {
        self.memory()
            .exists(&format!("token:blacklist:{}", jti))
            .await
            .expect("memory store exists")
    }

    /// Refresh jti paired with `access_jti`, if any.
    pub async fn paired_refresh(&self, access_jti: &str) -> Option<String> {
        self.raw_get(&format!("token:pair:{}", access_jti)).await
    }

    pub async fn login_attempts(&self, username: &str) -> i64 {
        self.raw_get(&format!("user:login-attempts:{}", username))
            .await
            .map(|v| v.parse().expect("numeric attempt counter"))
            .unwrap_or(0)
    }
}
