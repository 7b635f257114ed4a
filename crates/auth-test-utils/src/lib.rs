//! # Auth Test Utilities
//!
//! Shared test utilities for the banking auth engine.
//!
//! This crate provides:
//! - Deterministic crypto fixtures (fixed RSA keys for reproducible tests)
//! - Test data builders (TestIdentityBuilder, TestClaimsBuilder)
//! - Engine test harness (TestAuthEngine with simulated time)
//! - Fault-injecting doubles (FlakyKvStore, FailingEventSink)
//! - Fixed test IDs (UUIDs, constants)
//! - Custom assertions (TokenAssertions trait)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use auth_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> anyhow::Result<()> {
//!     let engine = TestAuthEngine::new()?;
//!     engine.seed_user("alice", TEST_PASSWORD).await;
//!
//!     let login = engine.service().login("alice", TEST_PASSWORD).await?;
//!     login.access_token
//!         .assert_valid_jwt()
//!         .assert_token_type("ACCESS")
//!         .assert_signed_by(TEST_KEY_ID_1);
//!     Ok(())
//! }
//! ```

pub mod assertions;
pub mod crypto_fixtures;
pub mod doubles;
pub mod engine_harness;
pub mod identity_builder;
pub mod test_ids;
pub mod token_builders;

// Re-export commonly used items
pub use assertions::*;
pub use crypto_fixtures::*;
pub use doubles::*;
pub use engine_harness::*;
pub use identity_builder::*;
pub use test_ids::*;
pub use token_builders::*;
