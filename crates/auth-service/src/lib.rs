//! Banking Auth Engine Library
//!
//! Authenticates users and manages the lifecycle of bearer tokens for the
//! banking platform: login throttling, access/refresh issuance and pairing,
//! validation against revocation state, and the logout revocation cascade.
//!
//! # Modules
//!
//! - `clock` - Injectable time source
//! - `config` - Engine configuration
//! - `crypto` - RS256 signing, bcrypt hashing, jti generation
//! - `errors` - Error types
//! - `events` - Domain events and the sink they go to
//! - `models` - Data models
//! - `observability` - Tracing setup and metrics
//! - `repositories` - Store-backed state and the identity store seam
//! - `services` - Business logic layer
//! - `store` - TTL key-value store (Redis, in-memory)

pub mod clock;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod events;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod services;
pub mod store;

pub use errors::AuthError;
pub use services::auth_service::{AuthDependencies, AuthService, AuthSettings};
