//! Builder for test identities
//!
//! Produces fully-populated `Identity` values with a real (cheap) bcrypt hash
//! of the chosen password, ready to insert into an in-memory identity store.

use auth_service::crypto::{BcryptPasswordHasher, PasswordHasher};
use auth_service::models::{Identity, UserType};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::test_ids::{TEST_DOCUMENT_TYPE, TEST_PASSWORD};

/// bcrypt cost used for every test hash. Far below the production floor.
pub const TEST_BCRYPT_COST: u32 = 4;

/// Password hasher for tests: real bcrypt at [`TEST_BCRYPT_COST`].
pub fn test_password_hasher() -> BcryptPasswordHasher {
    BcryptPasswordHasher::with_cost_unchecked(TEST_BCRYPT_COST)
}

/// Builder for test identities
///
/// # Example
/// ```rust,ignore
/// let alice = TestIdentityBuilder::new("alice")
///     .with_id(TEST_USER_ALICE)
///     .with_user_type(UserType::Employee)
///     .inactive()
///     .build();
/// ```
pub struct TestIdentityBuilder {
    id: Uuid,
    username: String,
    password: String,
    user_type: UserType,
    roles: Option<Vec<String>>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl TestIdentityBuilder {
    pub fn new(username: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password: TEST_PASSWORD.to_string(),
            user_type: UserType::Customer,
            roles: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_password(mut self, password: &str) -> Self {
        self.password = password.to_string();
        self
    }

    pub fn with_user_type(mut self, user_type: UserType) -> Self {
        self.user_type = user_type;
        self
    }

    /// Override the default roles for the user type.
    pub fn with_roles(mut self, roles: &[&str]) -> Self {
        self.roles = Some(roles.iter().map(|r| r.to_string()).collect());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }

    pub fn build(self) -> Identity {
        let password_hash = test_password_hasher()
            .hash(&self.password)
            .expect("bcrypt hash of test password");

        Identity {
            id: self.id.to_string(),
            email: format!("{}@example.com", self.username),
            document_type: TEST_DOCUMENT_TYPE.to_string(),
            document_number: format!("doc-{}", self.id.as_u128()),
            phone_number: None,
            customer_id: None,
            roles: self
                .roles
                .unwrap_or_else(|| self.user_type.default_roles()),
            username: self.username,
            password_hash,
            user_type: self.user_type,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.created_at,
            last_login_at: None,
        }
    }
}
