//! The engine's produced interface.
//!
//! `AuthService` wires the throttle, credential validator, codec and
//! revocation store into `login`, `register`, `logout`, `refresh`,
//! `validate` and `jwks`. Capabilities are injected once at startup and held
//! for the life of the process.

use crate::clock::{Clock, SystemClock};
use crate::config::{self, Config};
use crate::crypto::{BcryptPasswordHasher, PasswordHasher, RsaSigner, Signer};
use crate::errors::AuthError;
use crate::events::EventSink;
use crate::models::{Claims, Identity, Jwks, LoginResult, RefreshResult, RegistrationRequest};
use crate::repositories::{IdentityStore, LoginThrottle, RevocationStore};
use crate::services::credential_validator::CredentialValidator;
use crate::services::key_management_service;
use crate::services::registration_service::RegistrationService;
use crate::services::token_codec::{TokenCodec, TokenLifetimes};
use crate::services::token_service::TokenIssuer;
use crate::services::token_validator::TokenValidator;
use crate::store::{KvStore, RedisKvStore};
use secrecy::ExposeSecret;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Tunables that are not capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthSettings {
    pub lifetimes: TokenLifetimes,
    pub login_max_attempts: u32,
    pub login_attempt_window: Duration,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            lifetimes: TokenLifetimes::default(),
            login_max_attempts: config::DEFAULT_LOGIN_MAX_ATTEMPTS,
            login_attempt_window: Duration::from_secs(
                config::DEFAULT_LOGIN_ATTEMPT_WINDOW_SECONDS,
            ),
        }
    }
}

impl From<&Config> for AuthSettings {
    fn from(config: &Config) -> Self {
        Self {
            lifetimes: TokenLifetimes {
                access_ttl_seconds: config.access_token_ttl_seconds,
                refresh_ttl_seconds: config.refresh_token_ttl_seconds,
                clock_skew_seconds: config.jwt_clock_skew_seconds,
            },
            login_max_attempts: config.login_max_attempts,
            login_attempt_window: Duration::from_secs(config.login_attempt_window_seconds),
        }
    }
}

/// Capabilities the engine consumes.
#[derive(Clone)]
pub struct AuthDependencies {
    pub store: Arc<dyn KvStore>,
    pub identities: Arc<dyn IdentityStore>,
    pub signer: Arc<dyn Signer>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub clock: Arc<dyn Clock>,
    pub events: Arc<dyn EventSink>,
}

pub struct AuthService {
    issuer: TokenIssuer,
    validator: TokenValidator,
    registration: RegistrationService,
    codec: Arc<TokenCodec>,
}

impl AuthService {
    /// Wire the engine from injected capabilities.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Crypto` if the hasher cannot produce the dummy
    /// hash used for unknown identities.
    pub fn new(deps: AuthDependencies, settings: AuthSettings) -> Result<Self, AuthError> {
        let codec = Arc::new(TokenCodec::new(
            Arc::clone(&deps.signer),
            Arc::clone(&deps.clock),
            settings.lifetimes,
        ));
        let revocations = RevocationStore::new(Arc::clone(&deps.store));
        let throttle = LoginThrottle::new(
            Arc::clone(&deps.store),
            settings.login_max_attempts,
            settings.login_attempt_window,
        );
        let credentials =
            CredentialValidator::new(Arc::clone(&deps.identities), Arc::clone(&deps.hasher))?;

        let issuer = TokenIssuer::new(
            throttle,
            credentials,
            Arc::clone(&codec),
            revocations.clone(),
            Arc::clone(&deps.identities),
            Arc::clone(&deps.events),
        );
        let validator = TokenValidator::new(
            Arc::clone(&codec),
            revocations,
            Arc::clone(&deps.identities),
            Arc::clone(&deps.events),
        );
        let registration =
            RegistrationService::new(deps.identities, deps.hasher, deps.clock, deps.events);

        Ok(Self {
            issuer,
            validator,
            registration,
            codec,
        })
    }

    /// Production wiring: Redis store, RS256 signer from the configured PEM,
    /// bcrypt at the configured cost, and the system clock.
    ///
    /// # Errors
    ///
    /// - `Store` if Redis is unreachable
    /// - `Crypto` if the signing key does not load or the bcrypt cost is out
    ///   of range
    pub async fn from_config(
        config: &Config,
        identities: Arc<dyn IdentityStore>,
        events: Arc<dyn EventSink>,
    ) -> Result<Self, AuthError> {
        let store = RedisKvStore::connect(config.redis_url.expose_secret()).await?;
        let signer = RsaSigner::from_pem(config.jwt_private_key_pem.expose_secret(), &config.jwt_key_id)?;
        let hasher = BcryptPasswordHasher::new(config.bcrypt_cost)?;

        info!(
            target: "auth.service",
            key_id = %config.jwt_key_id,
            access_ttl_seconds = config.access_token_ttl_seconds,
            refresh_ttl_seconds = config.refresh_token_ttl_seconds,
            "Auth engine configured"
        );

        Self::new(
            AuthDependencies {
                store: Arc::new(store),
                identities,
                signer: Arc::new(signer),
                hasher: Arc::new(hasher),
                clock: Arc::new(SystemClock),
                events,
            },
            AuthSettings::from(config),
        )
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError> {
        self.issuer.login(username, password).await
    }

    pub async fn register(&self, request: RegistrationRequest) -> Result<Identity, AuthError> {
        self.registration.register(request).await
    }

    pub async fn logout(&self, access_token: &str) -> Result<(), AuthError> {
        self.validator.logout(access_token).await
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshResult, AuthError> {
        self.validator.refresh(refresh_token).await
    }

    pub async fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        self.validator.validate(token).await
    }

    pub fn jwks(&self) -> Jwks {
        key_management_service::get_jwks(self.codec.signer())
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }
}
