//! Login orchestration.
//!
//! Throttle check, credential check, token issuance, then registry and
//! pairing writes. The registry and pairing writes, the last-login stamp and
//! the login event are best-effort: once tokens are signed, none of those
//! failures abort the login.

use crate::errors::AuthError;
use crate::events::{publish_best_effort, EventSink, UserLoginEvent, TOPIC_USER_LOGIN};
use crate::models::LoginResult;
use crate::observability::metrics::record_login;
use crate::observability::{hash_for_correlation, ErrorCategory};
use crate::repositories::{IdentityStore, LoginThrottle, RevocationStore};
use crate::services::credential_validator::{CredentialCheck, CredentialValidator};
use crate::services::token_codec::TokenCodec;
use crate::services::best_effort;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};

pub const BEARER_TOKEN_TYPE: &str = "Bearer";

pub struct TokenIssuer {
    throttle: LoginThrottle,
    credentials: CredentialValidator,
    codec: Arc<TokenCodec>,
    revocations: RevocationStore,
    identities: Arc<dyn IdentityStore>,
    events: Arc<dyn EventSink>,
}

impl TokenIssuer {
    pub fn new(
        throttle: LoginThrottle,
        credentials: CredentialValidator,
        codec: Arc<TokenCodec>,
        revocations: RevocationStore,
        identities: Arc<dyn IdentityStore>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            throttle,
            credentials,
            codec,
            revocations,
            identities,
            events,
        }
    }

    /// Authenticate and issue an access/refresh pair.
    ///
    /// # Errors
    ///
    /// - `TooManyAttempts` when the throttle limit is reached, even if the
    ///   password is correct
    /// - `InvalidCredentials` for an unknown identity, wrong password or
    ///   inactive account; only a wrong password is counted
    /// - infrastructure errors from the throttle, identity store or signer
    ///
    /// The username is trimmed, as registration stores it, before it keys the
    /// throttle or the lookup.
    #[instrument(skip_all, fields(username_hash = %hash_for_correlation(username.trim())))]
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError> {
        let started = Instant::now();
        let result = self.login_inner(username.trim(), password).await;

        match &result {
            Ok(_) => record_login("success", None, started.elapsed()),
            Err(e) => record_login(
                "error",
                Some(ErrorCategory::from(e).as_str()),
                started.elapsed(),
            ),
        }

        result
    }

    async fn login_inner(&self, username: &str, password: &str) -> Result<LoginResult, AuthError> {
        self.throttle.check_limit(username).await?;

        let identity = match self.credentials.check(username, password).await? {
            CredentialCheck::Valid(identity) => identity,
            CredentialCheck::PasswordMismatch => {
                let attempts = self.throttle.record_failure(username).await?;
                info!(
                    target: "auth.service",
                    attempts,
                    "Login failed: invalid credentials"
                );
                return Err(AuthError::InvalidCredentials);
            }
            CredentialCheck::UnknownIdentity | CredentialCheck::Inactive => {
                info!(target: "auth.service", "Login failed: invalid credentials");
                return Err(AuthError::InvalidCredentials);
            }
        };

        self.throttle.reset(username).await?;

        let access = self.codec.issue_access(&identity)?;
        let refresh = self.codec.issue_refresh(&identity)?;

        best_effort(
            "register_active",
            self.revocations
                .register_active(&identity.id, &access.claims.jti, self.codec.access_ttl())
                .await,
        );
        best_effort(
            "pair",
            self.revocations
                .pair(
                    &access.claims.jti,
                    &refresh.claims.jti,
                    self.codec.refresh_ttl(),
                )
                .await,
        );

        let login_at = self.codec.clock().now();
        best_effort(
            "record_login",
            self.identities.record_login(&identity.id, login_at).await,
        );

        publish_best_effort(
            self.events.as_ref(),
            TOPIC_USER_LOGIN,
            &UserLoginEvent {
                user_id: identity.id.clone(),
                username: identity.username.clone(),
                login_at,
            },
        )
        .await;

        info!(target: "auth.service", jti = %access.claims.jti, "Login succeeded");

        Ok(LoginResult {
            access_token: access.token,
            refresh_token: refresh.token,
            token_type: BEARER_TOKEN_TYPE.to_string(),
            expires_in: self.codec.lifetimes().access_ttl_seconds,
            user: identity.summary(),
        })
    }
}
