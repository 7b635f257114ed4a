//! Auth engine configuration.
//!
//! Configuration is loaded from environment variables. The Redis URL and the
//! signing key are held as secrets and redacted in Debug output.

use secrecy::SecretString;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default `kid` published in token headers and the JWKS.
pub const DEFAULT_KEY_ID: &str = "auth-service-key-1";

/// Default access token lifetime (1 hour).
pub const DEFAULT_ACCESS_TOKEN_TTL_SECONDS: i64 = 3600;

/// Default refresh token lifetime (7 days).
pub const DEFAULT_REFRESH_TOKEN_TTL_SECONDS: i64 = 604_800;

/// Default tolerance for `iat` values in the future.
pub const DEFAULT_CLOCK_SKEW_SECONDS: i64 = 300;

/// Upper bound on the configurable clock skew.
pub const MAX_CLOCK_SKEW_SECONDS: i64 = 600;

pub const DEFAULT_BCRYPT_COST: u32 = 12;
pub const MIN_BCRYPT_COST: u32 = 10;
pub const MAX_BCRYPT_COST: u32 = 14;

/// Failed logins allowed inside one window before the throttle rejects.
pub const DEFAULT_LOGIN_MAX_ATTEMPTS: u32 = 5;

/// Throttle window (15 minutes).
pub const DEFAULT_LOGIN_ATTEMPT_WINDOW_SECONDS: u64 = 900;

#[derive(Clone)]
pub struct Config {
    /// Redis connection URL. May embed a password.
    pub redis_url: SecretString,

    /// PKCS#8 PEM of the RSA signing key.
    pub jwt_private_key_pem: SecretString,

    pub jwt_key_id: String,

    pub access_token_ttl_seconds: i64,

    pub refresh_token_ttl_seconds: i64,

    /// Maximum allowed distance of `iat` into the future.
    pub jwt_clock_skew_seconds: i64,

    pub bcrypt_cost: u32,

    pub login_max_attempts: u32,

    pub login_attempt_window_seconds: u64,
}

/// Custom Debug implementation that redacts sensitive fields.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("redis_url", &"[REDACTED]")
            .field("jwt_private_key_pem", &"[REDACTED]")
            .field("jwt_key_id", &self.jwt_key_id)
            .field("access_token_ttl_seconds", &self.access_token_ttl_seconds)
            .field("refresh_token_ttl_seconds", &self.refresh_token_ttl_seconds)
            .field("jwt_clock_skew_seconds", &self.jwt_clock_skew_seconds)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("login_max_attempts", &self.login_max_attempts)
            .field(
                "login_attempt_window_seconds",
                &self.login_attempt_window_seconds,
            )
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Failed to read signing key file: {0}")]
    KeyFile(String),

    #[error("Invalid token lifetime configuration: {0}")]
    InvalidTokenTtl(String),

    #[error("Invalid JWT clock skew configuration: {0}")]
    InvalidJwtClockSkew(String),

    #[error("Invalid bcrypt cost configuration: {0}")]
    InvalidBcryptCost(String),

    #[error("Invalid login throttle configuration: {0}")]
    InvalidLoginThrottle(String),
}

/// Parse an optional numeric variable, falling back to `default` when unset.
fn parse_or<T>(vars: &HashMap<String, String>, name: &str, default: T) -> Result<T, String>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match vars.get(name) {
        Some(value_str) => value_str.trim().parse().map_err(|e| {
            format!(
                "{} must be a valid integer, got '{}': {}",
                name, value_str, e
            )
        }),
        None => Ok(default),
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let redis_url = vars
            .get("REDIS_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("REDIS_URL".to_string()))?;
        let redis_url = SecretString::from(redis_url.as_str());

        // Inline PEM wins over a key file path
        let jwt_private_key_pem = match (vars.get("JWT_PRIVATE_KEY"), vars.get("JWT_PRIVATE_KEY_PATH"))
        {
            (Some(pem), _) if !pem.trim().is_empty() => SecretString::from(pem.as_str()),
            (_, Some(path)) => {
                let pem = std::fs::read_to_string(path).map_err(|e| {
                    // Path is not secret; key contents are
                    ConfigError::KeyFile(format!("{}: {}", path, e))
                })?;
                SecretString::from(pem)
            }
            _ => {
                return Err(ConfigError::MissingEnvVar(
                    "JWT_PRIVATE_KEY or JWT_PRIVATE_KEY_PATH".to_string(),
                ))
            }
        };

        let jwt_key_id = vars
            .get("JWT_KEY_ID")
            .cloned()
            .unwrap_or_else(|| DEFAULT_KEY_ID.to_string());

        let access_token_ttl_seconds: i64 = parse_or(
            vars,
            "JWT_ACCESS_TOKEN_TTL_SECONDS",
            DEFAULT_ACCESS_TOKEN_TTL_SECONDS,
        )
        .map_err(ConfigError::InvalidTokenTtl)?;

        let refresh_token_ttl_seconds: i64 = parse_or(
            vars,
            "JWT_REFRESH_TOKEN_TTL_SECONDS",
            DEFAULT_REFRESH_TOKEN_TTL_SECONDS,
        )
        .map_err(ConfigError::InvalidTokenTtl)?;

        if access_token_ttl_seconds <= 0 {
            return Err(ConfigError::InvalidTokenTtl(format!(
                "JWT_ACCESS_TOKEN_TTL_SECONDS must be positive, got {}",
                access_token_ttl_seconds
            )));
        }

        if refresh_token_ttl_seconds <= access_token_ttl_seconds {
            return Err(ConfigError::InvalidTokenTtl(format!(
                "JWT_REFRESH_TOKEN_TTL_SECONDS ({}) must exceed JWT_ACCESS_TOKEN_TTL_SECONDS ({})",
                refresh_token_ttl_seconds, access_token_ttl_seconds
            )));
        }

        let jwt_clock_skew_seconds: i64 = parse_or(
            vars,
            "JWT_CLOCK_SKEW_SECONDS",
            DEFAULT_CLOCK_SKEW_SECONDS,
        )
        .map_err(ConfigError::InvalidJwtClockSkew)?;

        if !(0..=MAX_CLOCK_SKEW_SECONDS).contains(&jwt_clock_skew_seconds) {
            return Err(ConfigError::InvalidJwtClockSkew(format!(
                "JWT_CLOCK_SKEW_SECONDS must be between 0 and {}, got {}",
                MAX_CLOCK_SKEW_SECONDS, jwt_clock_skew_seconds
            )));
        }

        let bcrypt_cost: u32 = parse_or(vars, "BCRYPT_COST", DEFAULT_BCRYPT_COST)
            .map_err(ConfigError::InvalidBcryptCost)?;

        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&bcrypt_cost) {
            return Err(ConfigError::InvalidBcryptCost(format!(
                "BCRYPT_COST must be between {} and {}, got {}",
                MIN_BCRYPT_COST, MAX_BCRYPT_COST, bcrypt_cost
            )));
        }

        let login_max_attempts: u32 =
            parse_or(vars, "LOGIN_MAX_ATTEMPTS", DEFAULT_LOGIN_MAX_ATTEMPTS)
                .map_err(ConfigError::InvalidLoginThrottle)?;

        if login_max_attempts == 0 {
            return Err(ConfigError::InvalidLoginThrottle(
                "LOGIN_MAX_ATTEMPTS must be greater than 0".to_string(),
            ));
        }

        let login_attempt_window_seconds: u64 = parse_or(
            vars,
            "LOGIN_ATTEMPT_WINDOW_SECONDS",
            DEFAULT_LOGIN_ATTEMPT_WINDOW_SECONDS,
        )
        .map_err(ConfigError::InvalidLoginThrottle)?;

        if login_attempt_window_seconds == 0 {
            return Err(ConfigError::InvalidLoginThrottle(
                "LOGIN_ATTEMPT_WINDOW_SECONDS must be greater than 0".to_string(),
            ));
        }

        Ok(Config {
            redis_url,
            jwt_private_key_pem,
            jwt_key_id,
            access_token_ttl_seconds,
            refresh_token_ttl_seconds,
            jwt_clock_skew_seconds,
            bcrypt_cost,
            login_max_attempts,
            login_attempt_window_seconds,
        })
    }
}
