//! Fixed test IDs for deterministic tests
//!
//! All test IDs are deterministic to ensure reproducible test results.
//! Using fixed UUIDs prevents flaky tests caused by random data.

use uuid::Uuid;

// User IDs (100-199)
pub const TEST_USER_ALICE: Uuid = Uuid::from_u128(100);
pub const TEST_USER_BOB: Uuid = Uuid::from_u128(101);
pub const TEST_USER_CHARLIE: Uuid = Uuid::from_u128(102);

// Signing Key IDs (strings)
pub const TEST_KEY_ID_1: &str = "test-key-2025-01";
pub const TEST_KEY_ID_2: &str = "test-key-2025-02";

// Passwords
pub const TEST_PASSWORD: &str = "correct-horse-battery";
pub const TEST_WRONG_PASSWORD: &str = "wrong-password";

// Documents
pub const TEST_DOCUMENT_TYPE: &str = "DNI";
