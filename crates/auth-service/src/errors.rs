use thiserror::Error;

/// Generic message for every token rejection that reaches a caller.
///
/// The precise reason (bad signature, expired, wrong type) is logged at debug
/// level only, so callers cannot probe the validator.
pub const TOKEN_INVALID_MESSAGE: &str = "The token is invalid or expired";

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown identity, password mismatch or inactive account.
    ///
    /// All three collapse into this single variant with a single message.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Too many login attempts. Try again later.")]
    TooManyAttempts,

    #[error("Invalid token: {0}")]
    TokenInvalid(String),

    #[error("Token revoked")]
    TokenRevoked,

    #[error("User already exists: {0}")]
    UserAlreadyExists(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Identity store error: {0}")]
    IdentityStore(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),
}

impl AuthError {
    pub(crate) fn token_invalid() -> Self {
        AuthError::TokenInvalid(TOKEN_INVALID_MESSAGE.to_string())
    }

    /// True for failures of a collaborator (store, identity store, signer)
    /// rather than a domain decision.
    ///
    /// These are never retried here; the boundary layer owns retry and
    /// circuit-breaking policy.
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            AuthError::Store(_) | AuthError::IdentityStore(_) | AuthError::Crypto(_)
        )
    }

    /// Stable machine-readable code for boundary layers.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::TooManyAttempts => "TOO_MANY_ATTEMPTS",
            AuthError::TokenInvalid(_) => "TOKEN_INVALID",
            AuthError::TokenRevoked => "TOKEN_REVOKED",
            AuthError::UserAlreadyExists(_) => "USER_ALREADY_EXISTS",
            AuthError::InvalidRequest(_) => "INVALID_REQUEST",
            AuthError::Store(_) | AuthError::IdentityStore(_) | AuthError::Crypto(_) => {
                "INFRASTRUCTURE_UNAVAILABLE"
            }
        }
    }

    /// Caller-facing message. Infrastructure details are replaced with a
    /// generic sentence so connection strings and key paths never leak.
    pub fn public_message(&self) -> String {
        if self.is_infrastructure() {
            "Service dependencies unavailable".to_string()
        } else {
            self.to_string()
        }
    }
}
