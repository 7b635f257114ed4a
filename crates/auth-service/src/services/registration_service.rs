use crate::clock::Clock;
use crate::crypto::PasswordHasher;
use crate::errors::AuthError;
use crate::events::{publish_best_effort, EventSink, UserRegisteredEvent, TOPIC_USER_REGISTERED};
use crate::models::{Identity, NewIdentity, RegistrationRequest};
use crate::observability::hash_for_correlation;
use crate::repositories::IdentityStore;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tracing::{info, instrument};

pub const MIN_PASSWORD_LENGTH: usize = 8;

pub struct RegistrationService {
    identities: Arc<dyn IdentityStore>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
    events: Arc<dyn EventSink>,
}

impl RegistrationService {
    pub fn new(
        identities: Arc<dyn IdentityStore>,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            identities,
            hasher,
            clock,
            events,
        }
    }

    /// Register a new identity
    ///
    /// Validates input, checks uniqueness (username, then email, then document
    /// number), hashes the password, assigns the default role for the user
    /// type and publishes a registration event. Username, email and document
    /// number are stored trimmed; login trims the username the same way.
    #[instrument(skip_all, fields(username_hash = %hash_for_correlation(&request.username)))]
    pub async fn register(&self, request: RegistrationRequest) -> Result<Identity, AuthError> {
        let username = request.username.trim();
        if username.is_empty() {
            return Err(AuthError::InvalidRequest(
                "Username cannot be empty".to_string(),
            ));
        }

        let email = request.email.trim();
        if !is_valid_email(email) {
            return Err(AuthError::InvalidRequest("Invalid email format".to_string()));
        }

        if request.password.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::InvalidRequest(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        let document_number = request.document_number.trim();
        if document_number.is_empty() {
            return Err(AuthError::InvalidRequest(
                "Document number cannot be empty".to_string(),
            ));
        }

        if self.identities.exists_by_username(username).await? {
            return Err(AuthError::UserAlreadyExists("username".to_string()));
        }
        if self.identities.exists_by_email(email).await? {
            return Err(AuthError::UserAlreadyExists("email".to_string()));
        }
        if self
            .identities
            .exists_by_document_number(document_number)
            .await?
        {
            return Err(AuthError::UserAlreadyExists("document_number".to_string()));
        }

        let password_hash = self.hash_password(request.password).await?;

        let identity = self
            .identities
            .create(NewIdentity {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
                document_type: request.document_type,
                document_number: document_number.to_string(),
                phone_number: request.phone_number,
                user_type: request.user_type,
                roles: request.user_type.default_roles(),
                is_active: true,
                created_at: self.clock.now(),
            })
            .await?;

        publish_best_effort(
            self.events.as_ref(),
            TOPIC_USER_REGISTERED,
            &UserRegisteredEvent {
                user_id: identity.id.clone(),
                username: identity.username.clone(),
                email: identity.email.clone(),
                document_type: identity.document_type.clone(),
                document_number: identity.document_number.clone(),
                phone_number: identity.phone_number.clone(),
                user_type: identity.user_type.to_string(),
                registered_at: identity.created_at,
            },
        )
        .await;

        info!(
            target: "auth.service",
            user_id = %identity.id,
            user_type = identity.user_type.as_str(),
            "Identity registered"
        );

        Ok(identity)
    }

    async fn hash_password(&self, password: SecretString) -> Result<String, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.hash(password.expose_secret()))
            .await
            .map_err(|e| AuthError::Crypto(format!("Password hashing task failed: {}", e)))?
    }
}

/// Basic email validation
fn is_valid_email(email: &str) -> bool {
    // Must have @ with something on both sides, and a dot after @
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return false;
    }

    let (local, domain) = match (parts.first(), parts.get(1)) {
        (Some(l), Some(d)) => (*l, *d),
        _ => return false,
    };

    if local.is_empty() {
        return false;
    }

    // Domain must have at least one dot and no empty parts
    let domain_parts: Vec<&str> = domain.split('.').collect();
    if domain_parts.len() < 2 {
        return false;
    }

    domain_parts.iter().all(|p| !p.is_empty())
}
