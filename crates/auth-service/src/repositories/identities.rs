//! Identity store seam.
//!
//! Identities are owned by an external user store. The engine reads them on
//! login and refresh, and writes only through `create` (registration) and
//! `record_login`.

use crate::errors::AuthError;
use crate::models::{Identity, NewIdentity};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Identity>, AuthError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, AuthError>;

    async fn exists_by_username(&self, username: &str) -> Result<bool, AuthError>;

    async fn exists_by_email(&self, email: &str) -> Result<bool, AuthError>;

    async fn exists_by_document_number(&self, document_number: &str) -> Result<bool, AuthError>;

    /// Persist a new identity and return it with its assigned id.
    async fn create(&self, identity: NewIdentity) -> Result<Identity, AuthError>;

    /// Stamp `last_login_at` (and `updated_at`) after a successful login.
    async fn record_login(&self, id: &str, at: DateTime<Utc>) -> Result<(), AuthError>;
}

/// Identity store held in process memory, keyed by id.
#[derive(Debug, Default)]
pub struct InMemoryIdentityStore {
    identities: RwLock<HashMap<String, Identity>>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an identity as-is.
    pub async fn insert(&self, identity: Identity) {
        let mut identities = self.identities.write().await;
        identities.insert(identity.id.clone(), identity);
    }

    pub async fn len(&self) -> usize {
        self.identities.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.identities.read().await.is_empty()
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Identity>, AuthError> {
        Ok(self.identities.read().await.get(id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, AuthError> {
        let identities = self.identities.read().await;
        Ok(identities
            .values()
            .find(|identity| identity.username == username)
            .cloned())
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, AuthError> {
        let identities = self.identities.read().await;
        Ok(identities.values().any(|i| i.username == username))
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, AuthError> {
        let identities = self.identities.read().await;
        Ok(identities
            .values()
            .any(|i| i.email.eq_ignore_ascii_case(email)))
    }

    async fn exists_by_document_number(&self, document_number: &str) -> Result<bool, AuthError> {
        let identities = self.identities.read().await;
        Ok(identities
            .values()
            .any(|i| i.document_number == document_number))
    }

    async fn create(&self, new: NewIdentity) -> Result<Identity, AuthError> {
        let mut identities = self.identities.write().await;

        // Re-checked under the write lock; registration's earlier checks can race
        let taken = if identities.values().any(|i| i.username == new.username) {
            Some("username")
        } else if identities
            .values()
            .any(|i| i.email.eq_ignore_ascii_case(&new.email))
        {
            Some("email")
        } else if identities
            .values()
            .any(|i| i.document_number == new.document_number)
        {
            Some("document_number")
        } else {
            None
        };
        if let Some(field) = taken {
            return Err(AuthError::UserAlreadyExists(field.to_string()));
        }

        let identity = Identity {
            id: Uuid::new_v4().to_string(),
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            document_type: new.document_type,
            document_number: new.document_number,
            phone_number: new.phone_number,
            user_type: new.user_type,
            customer_id: None,
            roles: new.roles,
            is_active: new.is_active,
            created_at: new.created_at,
            updated_at: new.created_at,
            last_login_at: None,
        };

        identities.insert(identity.id.clone(), identity.clone());
        Ok(identity)
    }

    async fn record_login(&self, id: &str, at: DateTime<Utc>) -> Result<(), AuthError> {
        let mut identities = self.identities.write().await;
        if let Some(identity) = identities.get_mut(id) {
            identity.last_login_at = Some(at);
            identity.updated_at = at;
        }
        Ok(())
    }
}
