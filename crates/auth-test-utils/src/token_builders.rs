//! Builder patterns for test token construction
//!
//! Produces tokens the engine itself would never issue: arbitrary claim
//! times, foreign keys, unsigned payloads.

use auth_service::crypto::{RsaSigner, Signer};
use auth_service::models::{Claims, TokenType, UserType};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;

use crate::crypto_fixtures::SIGNING_KEY_1_PEM;
use crate::test_ids::TEST_KEY_ID_1;

/// Builder for test JWT claims
///
/// # Example
/// ```rust,ignore
/// let token = TestClaimsBuilder::access()
///     .for_subject("user-1")
///     .issued_at(now - 7200)
///     .expires_at(now - 3600)
///     .sign_with(SIGNING_KEY_1_PEM, TEST_KEY_ID_1);
/// ```
pub struct TestClaimsBuilder {
    claims: Claims,
}

impl TestClaimsBuilder {
    /// Access-token claims with the identity fields filled in.
    pub fn access() -> Self {
        let now = Utc::now().timestamp();
        Self {
            claims: Claims {
                jti: uuid::Uuid::new_v4().simple().to_string(),
                sub: "test-subject".to_string(),
                iat: now,
                exp: now + 3600,
                token_type: TokenType::Access,
                username: Some("test-user".to_string()),
                email: Some("test-user@example.com".to_string()),
                roles: Some(UserType::Customer.default_roles()),
                user_type: Some(UserType::Customer),
            },
        }
    }

    /// Refresh-token claims: no identity fields.
    pub fn refresh() -> Self {
        let mut builder = Self::access();
        builder.claims.token_type = TokenType::Refresh;
        builder.claims.exp = builder.claims.iat + 604_800;
        builder.claims.username = None;
        builder.claims.email = None;
        builder.claims.roles = None;
        builder.claims.user_type = None;
        builder
    }

    pub fn with_jti(mut self, jti: &str) -> Self {
        self.claims.jti = jti.to_string();
        self
    }

    pub fn for_subject(mut self, subject: &str) -> Self {
        self.claims.sub = subject.to_string();
        self
    }

    /// Set issued-at (Unix seconds)
    pub fn issued_at(mut self, timestamp: i64) -> Self {
        self.claims.iat = timestamp;
        self
    }

    /// Set expiry (Unix seconds)
    pub fn expires_at(mut self, timestamp: i64) -> Self {
        self.claims.exp = timestamp;
        self
    }

    pub fn with_token_type(mut self, token_type: TokenType) -> Self {
        self.claims.token_type = token_type;
        self
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    pub fn build(self) -> Claims {
        self.claims
    }

    /// Sign with the given PKCS#8 PEM key.
    pub fn sign_with(self, pem: &str, key_id: &str) -> String {
        RsaSigner::from_pem(pem, key_id)
            .expect("test key loads")
            .sign(&self.claims)
            .expect("test token signs")
    }

    /// Sign with the engine's test key (key 1).
    pub fn sign(self) -> String {
        self.sign_with(SIGNING_KEY_1_PEM, TEST_KEY_ID_1)
    }

    /// `alg: none` token carrying these claims and an empty signature.
    pub fn unsigned(self) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD
            .encode(serde_json::to_vec(&self.claims).expect("claims serialize"));
        format!("{}.{}.", header, payload)
    }
}
