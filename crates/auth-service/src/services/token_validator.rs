//! Validation, refresh and logout.
//!
//! A token is either live, rejected by the codec (malformed, foreign or
//! expired), or live but blacklisted. Logout moves a live access token into
//! the blacklist and cascades to its paired refresh token.

use crate::errors::AuthError;
use crate::events::{publish_best_effort, EventSink, UserLogoutEvent, TOPIC_USER_LOGOUT};
use crate::models::{Claims, RefreshResult, TokenType};
use crate::observability::metrics::{record_revocation, record_side_effect_failure, record_token_validation};
use crate::observability::status_of;
use crate::repositories::{IdentityStore, RevocationStore};
use crate::services::best_effort;
use crate::services::token_codec::TokenCodec;
use crate::services::token_service::BEARER_TOKEN_TYPE;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub struct TokenValidator {
    codec: Arc<TokenCodec>,
    revocations: RevocationStore,
    identities: Arc<dyn IdentityStore>,
    events: Arc<dyn EventSink>,
}

impl TokenValidator {
    pub fn new(
        codec: Arc<TokenCodec>,
        revocations: RevocationStore,
        identities: Arc<dyn IdentityStore>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            codec,
            revocations,
            identities,
            events,
        }
    }

    /// Claims of a live, non-revoked token.
    ///
    /// # Errors
    ///
    /// - `TokenInvalid` if the codec rejects the token
    /// - `TokenRevoked` if its jti is blacklisted
    /// - `Store` if the blacklist cannot be read
    #[instrument(skip_all)]
    pub async fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.codec.decode(token)?;
        self.ensure_not_revoked(&claims).await?;
        record_token_validation("success", None);
        Ok(claims)
    }

    async fn ensure_not_revoked(&self, claims: &Claims) -> Result<(), AuthError> {
        let revoked = self
            .revocations
            .is_blacklisted(&claims.jti)
            .await
            .inspect_err(|_| record_token_validation("error", Some("infrastructure")))?;

        if revoked {
            debug!(target: "auth.service", jti = %claims.jti, "Token rejected: revoked");
            record_token_validation("error", Some("revoked"));
            return Err(AuthError::TokenRevoked);
        }
        Ok(())
    }

    /// Issue a new access token for a live refresh token.
    ///
    /// The refresh token is not rotated. The new access token is paired with
    /// it so that logging out the new token still revokes the refresh token.
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshResult, AuthError> {
        let refresh_claims = self.codec.decode(refresh_token)?;

        if refresh_claims.token_type != TokenType::Refresh {
            debug!(
                target: "auth.service",
                token_type = refresh_claims.token_type.as_str(),
                "Refresh rejected: not a refresh token"
            );
            record_token_validation("error", Some("token_type"));
            return Err(AuthError::token_invalid());
        }

        self.ensure_not_revoked(&refresh_claims).await?;

        let identity = match self.identities.find_by_id(&refresh_claims.sub).await? {
            Some(identity) if identity.is_active => identity,
            Some(_) | None => {
                info!(target: "auth.service", "Refresh rejected: identity missing or inactive");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let access = self.codec.issue_access(&identity)?;

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
                    &refresh_claims.jti,
                    self.codec.remaining_ttl(&refresh_claims),
                )
                .await,
        );

        info!(target: "auth.service", jti = %access.claims.jti, "Access token refreshed");

        Ok(RefreshResult {
            access_token: access.token,
            token_type: BEARER_TOKEN_TYPE.to_string(),
            expires_in: self.codec.lifetimes().access_ttl_seconds,
        })
    }

    /// Revoke an access token and cascade to its paired refresh token.
    ///
    /// Only a signature failure or an access-blacklist write failure is
    /// surfaced. A missing pairing is a normal, successful logout.
    ///
    /// # Errors
    ///
    /// - `TokenInvalid` for a bad signature or a non-access token; nothing
    ///   is written in that case
    /// - `Store` if the access token cannot be blacklisted
    #[instrument(skip_all)]
    pub async fn logout(&self, access_token: &str) -> Result<(), AuthError> {
        let claims = self.codec.verify_signature(access_token)?;

        if claims.token_type != TokenType::Access {
            debug!(target: "auth.service", "Logout rejected: not an access token");
            return Err(AuthError::token_invalid());
        }

        // An expired token needs no entry; the codec already rejects it
        if !self.codec.is_expired(&claims) {
            let result = self
                .revocations
                .blacklist(&claims.jti, self.codec.remaining_ttl(&claims))
                .await;
            record_revocation(TokenType::Access.as_str(), status_of(&result));
            result?;
        }

        self.revoke_paired_refresh(&claims.jti).await;

        best_effort(
            "unregister_active",
            self.revocations
                .unregister_active(&claims.sub, &claims.jti)
                .await,
        );

        publish_best_effort(
            self.events.as_ref(),
            TOPIC_USER_LOGOUT,
            &UserLogoutEvent {
                user_id: claims.sub.clone(),
                jti: claims.jti.clone(),
                logout_at: self.codec.clock().now(),
            },
        )
        .await;

        info!(target: "auth.service", jti = %claims.jti, "Logout completed");
        Ok(())
    }

    /// Blacklist the refresh token paired with `access_jti`, then drop the
    /// pairing. Failures are logged and counted, never returned.
    async fn revoke_paired_refresh(&self, access_jti: &str) {
        let refresh_jti = match self.revocations.lookup_refresh_for(access_jti).await {
            Ok(Some(jti)) => jti,
            Ok(None) => {
                debug!(target: "auth.service", "No paired refresh token recorded");
                return;
            }
            Err(e) => {
                warn!(target: "auth.service", error = %e, "Failed to look up paired refresh token");
                record_side_effect_failure("lookup_refresh");
                return;
            }
        };

        let result = self
            .revocations
            .blacklist(&refresh_jti, self.codec.refresh_ttl())
            .await;
        record_revocation(TokenType::Refresh.as_str(), status_of(&result));
        if let Err(e) = result {
            // Keep the pairing so a retried logout can try again
            warn!(target: "auth.service", error = %e, "Failed to blacklist paired refresh token");
            record_side_effect_failure("blacklist_refresh");
            return;
        }

        best_effort("unpair", self.revocations.unpair(access_jti).await);
    }
}
