//! Observability for the auth engine.
//!
//! # Privacy by Default
//!
//! All instrumentation uses `#[instrument(skip_all)]` and explicit safe field allow-listing.
//! Fields are categorized as:
//! - **SAFE**: Can be logged in plaintext (enums, operation names, jti values)
//! - **HASHED**: Must be SHA-256 hashed for correlation (username, subject id)
//! - **NEVER**: Must never appear in logs (passwords, token strings, keys)
//!
//! Correlation hashing is plain SHA-256. Usernames are enumerable, so the hash
//! limits casual exposure in logs but is not a secrecy guarantee.

pub mod metrics;

use crate::errors::AuthError;
use sha2::{Digest, Sha256};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Hash a field value for correlation in logs (SHA-256, first 8 hex chars)
///
/// Used for usernames and subject ids, which need correlation across log
/// entries but should not be stored in plaintext.
pub fn hash_for_correlation(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let result = hasher.finalize();
    // Take first 8 hex chars (32 bits) - enough for correlation, limits reversibility
    hex::encode(result.get(..4).unwrap_or_default())
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_directives` applies (for
/// example `"auth_service=info"`). Returns `false` if a subscriber was already
/// installed, which is harmless.
pub fn init_tracing(default_directives: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}

/// Error categories for metrics labels (bounded cardinality)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Invalid credentials, throttled, duplicate registration, bad input
    Authentication,
    /// Invalid or revoked token
    Token,
    /// Store, identity store or signer failure
    Infrastructure,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Authentication => "authentication",
            ErrorCategory::Token => "token",
            ErrorCategory::Infrastructure => "infrastructure",
        }
    }
}

impl From<&AuthError> for ErrorCategory {
    fn from(err: &AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::TooManyAttempts
            | AuthError::UserAlreadyExists(_)
            | AuthError::InvalidRequest(_) => ErrorCategory::Authentication,
            AuthError::TokenInvalid(_) | AuthError::TokenRevoked => ErrorCategory::Token,
            AuthError::Store(_) | AuthError::IdentityStore(_) | AuthError::Crypto(_) => {
                ErrorCategory::Infrastructure
            }
        }
    }
}

/// Status label for an operation result.
pub(crate) fn status_of<T>(result: &Result<T, AuthError>) -> &'static str {
    if result.is_ok() {
        "success"
    } else {
        "error"
    }
}
