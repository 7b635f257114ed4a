//! Custom test assertions for expressive tests
//!
//! Provides trait-based assertions for token strings. These decode the JWT
//! segments without verifying the signature; signature checks belong to the
//! engine under test.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;

/// JWT header structure
#[derive(Debug, Deserialize)]
struct JwtHeader {
    pub alg: String,
    pub typ: String,
    #[serde(default)]
    pub kid: Option<String>,
}

/// JWT claims structure
#[derive(Debug, Deserialize)]
struct JwtClaims {
    pub jti: String,
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    #[serde(rename = "tokenType")]
    pub token_type: String,
    #[serde(default)]
    pub roles: Option<Vec<String>>,
}

fn segment(token: &str, index: usize) -> Vec<u8> {
    let part = token
        .split('.')
        .nth(index)
        .unwrap_or_else(|| panic!("JWT is missing segment {}", index));
    URL_SAFE_NO_PAD
        .decode(part)
        .unwrap_or_else(|e| panic!("Failed to base64 decode JWT segment {}: {}", index, e))
}

fn header_of(token: &str) -> JwtHeader {
    serde_json::from_slice(&segment(token, 0)).expect("Failed to parse JWT header")
}

fn claims_of(token: &str) -> JwtClaims {
    serde_json::from_slice(&segment(token, 1)).expect("Failed to parse JWT claims")
}

/// Claim `jti` of a token, without verifying it.
pub fn jti_of(token: &str) -> String {
    claims_of(token).jti
}

/// Custom assertions for issued tokens
///
/// # Example
/// ```rust,ignore
/// login.access_token
///     .assert_valid_jwt()
///     .assert_token_type("ACCESS")
///     .assert_has_role("ROLE_CUSTOMER")
///     .assert_signed_by("test-key-2025-01");
/// ```
pub trait TokenAssertions {
    /// Assert that the token is a well-formed RS256 JWT
    fn assert_valid_jwt(&self) -> &Self;

    /// Assert the `tokenType` claim (`ACCESS` or `REFRESH`)
    fn assert_token_type(&self, token_type: &str) -> &Self;

    /// Assert that the token carries the specified role
    fn assert_has_role(&self, role: &str) -> &Self;

    /// Assert that the token carries no roles claim at all
    fn assert_no_roles(&self) -> &Self;

    /// Assert that the token was signed by the specified key
    fn assert_signed_by(&self, key_id: &str) -> &Self;

    /// Assert that `exp - iat` equals the specified seconds
    fn assert_lifetime(&self, seconds: i64) -> &Self;

    /// Assert that the token is for the specified subject
    fn assert_for_subject(&self, subject: &str) -> &Self;
}

impl TokenAssertions for String {
    fn assert_valid_jwt(&self) -> &Self {
        let parts: Vec<_> = self.split('.').collect();
        assert_eq!(
            parts.len(),
            3,
            "JWT must have 3 parts (header.payload.signature), got {}",
            parts.len()
        );

        let header = header_of(self);
        assert_eq!(header.alg, "RS256", "Expected RS256 algorithm");
        assert_eq!(header.typ, "JWT", "Expected JWT type");

        let claims = claims_of(self);
        assert!(!claims.jti.is_empty(), "Token must carry a jti");
        assert!(claims.exp > claims.iat, "Token must expire after issuance");

        self
    }

    fn assert_token_type(&self, token_type: &str) -> &Self {
        let claims = claims_of(self);
        assert_eq!(
            claims.token_type, token_type,
            "Expected tokenType '{}', got '{}'",
            token_type, claims.token_type
        );
        self
    }

    fn assert_has_role(&self, role: &str) -> &Self {
        let claims = claims_of(self);
        let roles = claims.roles.unwrap_or_default();
        assert!(
            roles.iter().any(|r| r == role),
            "Token does not contain role '{}'. Available roles: {:?}",
            role,
            roles
        );
        self
    }

    fn assert_no_roles(&self) -> &Self {
        let claims = claims_of(self);
        assert!(
            claims.roles.is_none(),
            "Expected no roles claim, got {:?}",
            claims.roles
        );
        self
    }

    fn assert_signed_by(&self, key_id: &str) -> &Self {
        let header = header_of(self);
        assert_eq!(
            header.kid.as_deref(),
            Some(key_id),
            "Expected key_id '{}', got {:?}",
            key_id,
            header.kid
        );
        self
    }

    fn assert_lifetime(&self, seconds: i64) -> &Self {
        let claims = claims_of(self);
        assert_eq!(
            claims.exp - claims.iat,
            seconds,
            "Expected token lifetime of {} seconds",
            seconds
        );
        self
    }

    fn assert_for_subject(&self, subject: &str) -> &Self {
        let claims = claims_of(self);
        assert_eq!(
            claims.sub, subject,
            "Expected subject '{}', got '{}'",
            subject, claims.sub
        );
        self
    }
}
