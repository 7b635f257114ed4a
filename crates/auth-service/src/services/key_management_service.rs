use crate::crypto::Signer;
use crate::models::Jwks;
use tracing::instrument;

/// Public key set for third-party verification
///
/// One RSA entry for the signing key loaded at startup. No rotation, so
/// there is never more than one key.
#[instrument(skip_all, fields(kid = signer.key_id()))]
pub fn get_jwks(signer: &dyn Signer) -> Jwks {
    signer.jwks()
}
