//! Deterministic cryptographic fixtures for testing
//!
//! Two fixed 2048-bit RSA keys in PKCS#8 PEM form. Key 1 is the engine's
//! signing key in every harness; key 2 plays a foreign issuer whose tokens
//! must be rejected.

/// PKCS#8 PEM of the primary test signing key.
pub const SIGNING_KEY_1_PEM: &str = include_str!("../fixtures/signing_key_1.pem");

/// PKCS#8 PEM of a second, unrelated key.
pub const SIGNING_KEY_2_PEM: &str = include_str!("../fixtures/signing_key_2.pem");

/// JWKS `n` of [`SIGNING_KEY_1_PEM`] (base64url, no padding).
pub const SIGNING_KEY_1_MODULUS: &str = "wBL-V0zanxEiSfaGkesQqtn5LkmZ1sjM_t-gbxbcb8v3XZeI0BGmis0CBOwyBJ1gzvutAkeGqt8nMUrsuJKqA8Grn5OkQlbJaoO-aBXMVH-pT_mF5nDtNQnzMNpBmDcotkQ8wup5yRSM51lpk3tk36z_9ovcW-Vf2JXUtTGfgE8MEeBZ9dM8ZzQklPZQ1oRmCtyqGF5KB2EiLg8ig9gGChwo0DEXwSamiPN4JmFVQ5xB4-kD2dOeaVCuIBN0-4s0lcKf1Wn2_sA2uADXyJxgZo7vx-97JMtDL8_eLTttdIFNbAM-lQauZTGuc_pRIa9ub63SNAPgTjqHtK13YsIKYw";

/// JWKS `n` of [`SIGNING_KEY_2_PEM`].
pub const SIGNING_KEY_2_MODULUS: &str = "pnq8KRAUSOHpZVVtjDHt1J24yH5UuKM7tzWW2T0DW-3O91h6hOMrg6ojcUKS3VD5T0_3qqwkjNhm88eKJQYswXI5_77A290eIWtyUM-i1mYWkQz20y9A6RVehBy8mUJoSALN-6kUV8aDK7q85YL0EXm44CilHKiDEvFNCqoe07I_99xMXqsHgIftpZ70TJAu-CHVk9TUrGEmvAhWw0NOSpURW5c-BbuMnywQaGfkKLuKyUgLi9d6LP2r-2oQNUU39-imSz93xPOQ98ypbX2ausQxFhUPSXeBsPoBTvBuZXjh0HYa06NOj2bbKOKEGsyn2SvRfe5wx_5Oqx4Qhx9eVQ";

/// JWKS `e` shared by both keys (65537).
pub const SIGNING_KEY_EXPONENT: &str = "AQAB";
