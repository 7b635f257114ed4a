#![no_main]

use auth_service::clock::SystemClock;
use auth_service::crypto::RsaSigner;
use auth_service::services::{TokenCodec, TokenLifetimes};
use libfuzzer_sys::fuzz_target;
use std::sync::{Arc, OnceLock};

const SIGNING_KEY_PEM: &str = include_str!("../../../auth-test-utils/fixtures/signing_key_1.pem");

fn codec() -> &'static TokenCodec {
    static CODEC: OnceLock<TokenCodec> = OnceLock::new();
    CODEC.get_or_init(|| {
        let signer = RsaSigner::from_pem(SIGNING_KEY_PEM, "fuzz-key")
            .unwrap_or_else(|e| panic!("fixture key must load: {e}"));
        TokenCodec::new(
            Arc::new(signer),
            Arc::new(SystemClock),
            TokenLifetimes::default(),
        )
    })
}

fuzz_target!(|data: &[u8]| {
    let Ok(token) = std::str::from_utf8(data) else {
        return;
    };

    // Untrusted input must be rejected, never panic
    let codec = codec();
    let _ = codec.decode(token);
    let _ = codec.verify_signature(token);
    let _ = codec.extract_jti(token);

    // Same input split into JWT-shaped segments
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() == 3 {
        use base64::engine::general_purpose::URL_SAFE_NO_PAD;
        use base64::Engine;
        for part in parts {
            let _ = URL_SAFE_NO_PAD.decode(part);
        }
    }
});
