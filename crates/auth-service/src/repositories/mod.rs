//! Store-backed state owned by the engine, plus the identity store seam.

pub mod identities;
pub mod login_attempts;
pub mod revocation;

pub use identities::{IdentityStore, InMemoryIdentityStore};
pub use login_attempts::LoginThrottle;
pub use revocation::RevocationStore;
