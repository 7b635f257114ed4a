use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User type tag carried in access tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserType {
    Admin,
    Employee,
    /// Bank customer; the only type linked to a `customer_id`
    Customer,
    YankiUser,
    BootcoinUser,
}

impl UserType {
    /// Roles assigned at registration
    pub fn default_roles(&self) -> Vec<String> {
        let role = match self {
            UserType::Admin => "ROLE_ADMIN",
            UserType::Employee => "ROLE_EMPLOYEE",
            UserType::Customer => "ROLE_CUSTOMER",
            UserType::YankiUser => "ROLE_YANKI_USER",
            UserType::BootcoinUser => "ROLE_BOOTCOIN_USER",
        };
        vec![role.to_string()]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Admin => "ADMIN",
            UserType::Employee => "EMPLOYEE",
            UserType::Customer => "CUSTOMER",
            UserType::YankiUser => "YANKI_USER",
            UserType::BootcoinUser => "BOOTCOIN_USER",
        }
    }
}

impl FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(UserType::Admin),
            "EMPLOYEE" => Ok(UserType::Employee),
            "CUSTOMER" => Ok(UserType::Customer),
            "YANKI_USER" => Ok(UserType::YankiUser),
            "BOOTCOIN_USER" => Ok(UserType::BootcoinUser),
            _ => Err(format!("Invalid user type: {}", s)),
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An authenticatable principal, owned by the identity store.
#[derive(Clone)]
pub struct Identity {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub document_type: String,
    pub document_number: String,
    pub phone_number: Option<String>,
    pub user_type: UserType,
    pub customer_id: Option<String>,
    pub roles: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("document_type", &self.document_type)
            .field("document_number", &self.document_number)
            .field("phone_number", &self.phone_number)
            .field("user_type", &self.user_type)
            .field("customer_id", &self.customer_id)
            .field("roles", &self.roles)
            .field("is_active", &self.is_active)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .field("last_login_at", &self.last_login_at)
            .finish()
    }
}

impl Identity {
    pub fn summary(&self) -> IdentitySummary {
        IdentitySummary {
            id: self.id.clone(),
            username: self.username.clone(),
            roles: self.roles.clone(),
            user_type: self.user_type,
        }
    }
}

/// The part of an identity returned to a caller after login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySummary {
    pub id: String,
    pub username: String,
    pub roles: Vec<String>,
    pub user_type: UserType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

/// JWT claims for both token types.
///
/// Refresh tokens carry only `jti`, `sub`, `iat`, `exp` and `tokenType`; the
/// identity fields are access-token only.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub jti: String,
    /// Identity id
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(rename = "tokenType")]
    pub token_type: TokenType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
    #[serde(
        rename = "userType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub user_type: Option<UserType>,
}

impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Claims")
            .field("jti", &self.jti)
            .field("sub", &"[REDACTED]")
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .field("token_type", &self.token_type)
            .field("username", &self.username.as_ref().map(|_| "[REDACTED]"))
            .field("roles", &self.roles)
            .field("user_type", &self.user_type)
            .finish_non_exhaustive()
    }
}

/// A freshly signed token together with the claims it carries
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub claims: Claims,
    pub token: String,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LoginResult {
    pub access_token: String,
    pub refresh_token: String,
    /// Always `"Bearer"`
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
    pub user: IdentitySummary,
}

impl fmt::Debug for LoginResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginResult")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("user", &self.user)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct RefreshResult {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl fmt::Debug for RefreshResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshResult")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Input to registration. `Debug` never shows the password.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    pub username: String,
    pub email: String,
    pub password: SecretString,
    pub document_type: String,
    pub document_number: String,
    pub phone_number: Option<String>,
    pub user_type: UserType,
}

/// Identity fields handed to the identity store on registration
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub document_type: String,
    pub document_number: String,
    pub phone_number: Option<String>,
    pub user_type: UserType,
    pub roles: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// JWKS response (RFC 7517)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwks {
    pub keys: Vec<JsonWebKey>,
}

/// RSA JSON Web Key (RFC 7517)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonWebKey {
    pub kid: String, // Key ID
    pub kty: String, // Key Type ("RSA")
    pub alg: String, // Algorithm ("RS256")
    #[serde(rename = "use")]
    pub use_: String, // Public key use ("sig")
    pub n: String,   // Modulus (base64url, no padding)
    pub e: String,   // Exponent (base64url, no padding)
}
