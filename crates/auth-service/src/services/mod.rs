pub mod auth_service;
pub mod credential_validator;
pub mod key_management_service;
pub mod registration_service;
pub mod token_codec;
pub mod token_service;
pub mod token_validator;

pub use auth_service::AuthService;
pub use credential_validator::{CredentialCheck, CredentialValidator};
pub use registration_service::RegistrationService;
pub use token_codec::{TokenCodec, TokenLifetimes};
pub use token_service::TokenIssuer;
pub use token_validator::TokenValidator;

use crate::errors::AuthError;
use crate::observability::metrics::record_side_effect_failure;

/// Log and count a failed best-effort write, then carry on.
pub(crate) fn best_effort(operation: &'static str, result: Result<(), AuthError>) {
    if let Err(e) = result {
        tracing::warn!(
            target: "auth.service",
            operation,
            error = %e,
            "Best-effort side effect failed"
        );
        record_side_effect_failure(operation);
    }
}
