//! Build, sign, parse and verify token claims.
//!
//! Raw RS256 work is delegated to the [`Signer`]. Everything time-based
//! (`iat`, `exp`, expiry checks, blacklist TTLs) uses the injected [`Clock`].

use crate::clock::Clock;
use crate::crypto::{generate_jti, Signer};
use crate::errors::AuthError;
use crate::models::{Claims, Identity, IssuedToken, TokenType};
use crate::observability::metrics::{record_token_issuance, record_token_validation};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Token lifetimes and validation tolerance, all in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub access_ttl_seconds: i64,
    pub refresh_ttl_seconds: i64,
    /// How far `iat` may sit in the future before a token is rejected.
    pub clock_skew_seconds: i64,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access_ttl_seconds: crate::config::DEFAULT_ACCESS_TOKEN_TTL_SECONDS,
            refresh_ttl_seconds: crate::config::DEFAULT_REFRESH_TOKEN_TTL_SECONDS,
            clock_skew_seconds: crate::config::DEFAULT_CLOCK_SKEW_SECONDS,
        }
    }
}

/// Store TTL for a blacklist entry covering a token that expires at `exp`.
///
/// `exp` itself is still an accepted second, so the entry must last until
/// `exp + 1`. Rounded up to whole seconds with a one second floor.
pub(crate) fn blacklist_ttl(exp: i64, now_millis: i64) -> Duration {
    let remaining_millis = exp
        .saturating_add(1)
        .saturating_mul(1000)
        .saturating_sub(now_millis);
    let seconds = remaining_millis.saturating_add(999).div_euclid(1000).max(1);
    Duration::from_secs(u64::try_from(seconds).unwrap_or(1))
}

pub struct TokenCodec {
    signer: Arc<dyn Signer>,
    clock: Arc<dyn Clock>,
    lifetimes: TokenLifetimes,
}

impl TokenCodec {
    pub fn new(signer: Arc<dyn Signer>, clock: Arc<dyn Clock>, lifetimes: TokenLifetimes) -> Self {
        Self {
            signer,
            clock,
            lifetimes,
        }
    }

    pub fn lifetimes(&self) -> TokenLifetimes {
        self.lifetimes
    }

    pub fn access_ttl(&self) -> Duration {
        Duration::from_secs(u64::try_from(self.lifetimes.access_ttl_seconds).unwrap_or(0))
    }

    pub fn refresh_ttl(&self) -> Duration {
        Duration::from_secs(u64::try_from(self.lifetimes.refresh_ttl_seconds).unwrap_or(0))
    }

    pub fn signer(&self) -> &dyn Signer {
        self.signer.as_ref()
    }

    /// Sign an access token carrying the identity's id, username, email,
    /// roles and user type.
    #[instrument(skip_all)]
    pub fn issue_access(&self, identity: &Identity) -> Result<IssuedToken, AuthError> {
        let now = self.clock.now_timestamp();
        let claims = Claims {
            jti: generate_jti()?,
            sub: identity.id.clone(),
            iat: now,
            exp: now + self.lifetimes.access_ttl_seconds,
            token_type: TokenType::Access,
            username: Some(identity.username.clone()),
            email: Some(identity.email.clone()),
            roles: Some(identity.roles.clone()),
            user_type: Some(identity.user_type),
        };
        self.sign(claims)
    }

    /// Sign a refresh token. Only `jti`, `sub`, `iat`, `exp` and `tokenType`.
    #[instrument(skip_all)]
    pub fn issue_refresh(&self, identity: &Identity) -> Result<IssuedToken, AuthError> {
        let now = self.clock.now_timestamp();
        let claims = Claims {
            jti: generate_jti()?,
            sub: identity.id.clone(),
            iat: now,
            exp: now + self.lifetimes.refresh_ttl_seconds,
            token_type: TokenType::Refresh,
            username: None,
            email: None,
            roles: None,
            user_type: None,
        };
        self.sign(claims)
    }

    fn sign(&self, claims: Claims) -> Result<IssuedToken, AuthError> {
        let token_type = claims.token_type.as_str();
        match self.signer.sign(&claims) {
            Ok(token) => {
                record_token_issuance(token_type, "success");
                Ok(IssuedToken { claims, token })
            }
            Err(e) => {
                record_token_issuance(token_type, "error");
                Err(e)
            }
        }
    }

    /// Verify the signature and all time-based claims.
    ///
    /// Fails with `TokenInvalid` on a bad signature, malformed claims, an
    /// oversized token, `exp < now`, or `iat` beyond the allowed clock skew.
    #[instrument(skip_all)]
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.signer.verify(token).inspect_err(|_| {
            record_token_validation("error", Some("signature"));
        })?;

        let now = self.clock.now_timestamp();

        if claims.exp < now {
            debug!(target: "auth.crypto", exp = claims.exp, now, "Token rejected: expired");
            record_token_validation("error", Some("expired"));
            return Err(AuthError::token_invalid());
        }

        let max_iat = now + self.lifetimes.clock_skew_seconds;
        if claims.iat > max_iat {
            debug!(
                target: "auth.crypto",
                iat = claims.iat,
                now,
                max_allowed = max_iat,
                "Token rejected: iat too far in the future"
            );
            record_token_validation("error", Some("clock_skew"));
            return Err(AuthError::token_invalid());
        }

        Ok(claims)
    }

    /// Signature-checked claims with no expiry enforcement.
    ///
    /// Logout accepts a just-expired access token so its refresh sibling can
    /// still be revoked.
    #[instrument(skip_all)]
    pub fn verify_signature(&self, token: &str) -> Result<Claims, AuthError> {
        self.signer.verify(token)
    }

    /// The token's `jti`. The signature must verify, so unsigned input can
    /// never drive a store lookup. Expiry is not checked.
    ///
    /// For callers that only need the token id, such as a boundary layer
    /// tagging an audit record. Engine flows that also need `sub`, `exp` or
    /// the token type (logout) call [`Self::verify_signature`] once instead.
    pub fn extract_jti(&self, token: &str) -> Result<String, AuthError> {
        Ok(self.verify_signature(token)?.jti)
    }

    /// True once the token's `exp` is in the past.
    pub fn is_expired(&self, claims: &Claims) -> bool {
        claims.exp < self.clock.now_timestamp()
    }

    /// Blacklist TTL for the given claims at the current time.
    pub fn remaining_ttl(&self, claims: &Claims) -> Duration {
        blacklist_ttl(claims.exp, self.clock.now().timestamp_millis())
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }
}
