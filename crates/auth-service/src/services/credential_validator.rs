//! Password and active-flag check for a login attempt.
//!
//! Unknown identity, wrong password and inactive account all surface to the
//! caller as the same `InvalidCredentials`. Internally the outcome is typed so
//! the login flow can count only password mismatches against the throttle.

use crate::crypto::PasswordHasher;
use crate::errors::AuthError;
use crate::models::Identity;
use crate::observability::hash_for_correlation;
use crate::repositories::IdentityStore;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Outcome of a credential check. Only `Valid` lets a login proceed.
#[derive(Debug, Clone)]
pub enum CredentialCheck {
    Valid(Identity),
    UnknownIdentity,
    /// The identity exists and the password did not match its hash.
    PasswordMismatch,
    /// Password matched, but the account is disabled.
    Inactive,
}

pub struct CredentialValidator {
    identities: Arc<dyn IdentityStore>,
    hasher: Arc<dyn PasswordHasher>,
    /// Verified against when the identity is unknown, so that path costs one
    /// hash verification like the others.
    dummy_hash: String,
}

impl CredentialValidator {
    /// # Errors
    ///
    /// Returns `AuthError::Crypto` if the dummy hash cannot be computed.
    pub fn new(
        identities: Arc<dyn IdentityStore>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Result<Self, AuthError> {
        let dummy_hash = hasher.hash("timing-equalization-placeholder")?;
        Ok(Self {
            identities,
            hasher,
            dummy_hash,
        })
    }

    /// Run the hash comparison on the blocking pool.
    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        let password = SecretString::from(password);
        let hash = hash.to_string();

        tokio::task::spawn_blocking(move || hasher.verify(password.expose_secret(), &hash))
            .await
            .map_err(|e| AuthError::Crypto(format!("Password verification task failed: {}", e)))?
    }

    #[instrument(skip_all, fields(username_hash = %hash_for_correlation(username)))]
    pub async fn check(&self, username: &str, password: &str) -> Result<CredentialCheck, AuthError> {
        let identity = self.identities.find_by_username(username).await?;

        let Some(identity) = identity else {
            // Result ignored; this call exists for its cost
            let _ = self.verify_password(password, &self.dummy_hash).await;
            debug!(target: "auth.service", "Credential check failed: unknown identity");
            return Ok(CredentialCheck::UnknownIdentity);
        };

        if !self.verify_password(password, &identity.password_hash).await? {
            debug!(target: "auth.service", "Credential check failed: password mismatch");
            return Ok(CredentialCheck::PasswordMismatch);
        }

        if !identity.is_active {
            debug!(target: "auth.service", "Credential check failed: inactive identity");
            return Ok(CredentialCheck::Inactive);
        }

        Ok(CredentialCheck::Valid(identity))
    }

    /// The identity when the password matches and the account is active,
    /// otherwise `InvalidCredentials`.
    pub async fn validate(&self, username: &str, password: &str) -> Result<Identity, AuthError> {
        match self.check(username, password).await? {
            CredentialCheck::Valid(identity) => Ok(identity),
            CredentialCheck::UnknownIdentity
            | CredentialCheck::PasswordMismatch
            | CredentialCheck::Inactive => Err(AuthError::InvalidCredentials),
        }
    }
}
