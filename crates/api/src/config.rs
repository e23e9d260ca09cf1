//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DIRECTORIO_SECRET_KEY` - Token signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `DIRECTORIO_DATABASE_URL` - `PostgreSQL` connection string, falls back to
//!   `DATABASE_URL`. Without either the API runs on an in-memory store.
//! - `DIRECTORIO_HOST` - Bind address (default: 127.0.0.1)
//! - `DIRECTORIO_PORT` - Listen port (default: 8000)
//! - `DIRECTORIO_JWT_ALGORITHM` - `HS256`, `HS384` or `HS512` (default: `HS256`)
//! - `DIRECTORIO_TOKEN_TTL_MINUTES` - Access token lifetime (default: 1500,
//!   at most 525600, one year)
//! - `DIRECTORIO_BOOTSTRAP_USERNAME` / `DIRECTORIO_BOOTSTRAP_PASSWORD` - Account
//!   created at startup if missing
//! - `DIRECTORIO_LOG_JSON` - Emit JSON logs when `true` or `1`
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use chrono::Duration;
use jsonwebtoken::Algorithm;
use secrecy::SecretString;
use thiserror::Error;

use crate::services::auth::{DEFAULT_TOKEN_TTL_MINUTES, MAX_TOKEN_TTL_MINUTES};

const MIN_SECRET_KEY_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_PORT: u16 = 8000;

/// Substrings that mark a secret as a placeholder (case-insensitive).
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    /// A variable could not be parsed or is out of range.
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    /// A secret failed the strength checks.
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Account ensured at startup.
#[derive(Clone)]
pub struct BootstrapUser {
    pub username: String,
    pub password: SecretString,
}

impl std::fmt::Debug for BootstrapUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapUser")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// API configuration.
#[derive(Debug, Clone)]
pub struct DirectorioConfig {
    /// `PostgreSQL` connection URL; `None` selects the in-memory store
    pub database_url: Option<SecretString>,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Token signing secret
    pub secret_key: SecretString,
    /// HMAC algorithm for access tokens
    pub jwt_algorithm: Algorithm,
    /// Access token lifetime
    pub token_ttl: Duration,
    /// Account created at startup if missing
    pub bootstrap_user: Option<BootstrapUser>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Emit JSON formatted logs
    pub log_json: bool,
}

impl DirectorioConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the secret key fails validation (length, placeholder, entropy).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// See [`DirectorioConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = EnvReader { lookup: &lookup };

        let database_url = env
            .optional("DIRECTORIO_DATABASE_URL")
            .or_else(|| env.optional("DATABASE_URL"))
            .map(SecretString::from);

        let host = env.parsed("DIRECTORIO_HOST", IpAddr::V4(Ipv4Addr::LOCALHOST))?;
        let port = env.parsed("DIRECTORIO_PORT", DEFAULT_PORT)?;

        let secret_key = env.required("DIRECTORIO_SECRET_KEY")?;
        check_secret_key(&secret_key, "DIRECTORIO_SECRET_KEY")?;

        let jwt_algorithm = match env.optional("DIRECTORIO_JWT_ALGORITHM") {
            None => Algorithm::HS256,
            Some(raw) => parse_algorithm(&raw).ok_or_else(|| {
                ConfigError::InvalidEnvVar(
                    "DIRECTORIO_JWT_ALGORITHM".to_owned(),
                    format!("unsupported algorithm {raw:?} (expected HS256, HS384 or HS512)"),
                )
            })?,
        };

        let ttl_minutes: i64 =
            env.parsed("DIRECTORIO_TOKEN_TTL_MINUTES", DEFAULT_TOKEN_TTL_MINUTES)?;
        let token_ttl = (1..=MAX_TOKEN_TTL_MINUTES)
            .contains(&ttl_minutes)
            .then(|| Duration::try_minutes(ttl_minutes))
            .flatten()
            .ok_or_else(|| {
                ConfigError::InvalidEnvVar(
                    "DIRECTORIO_TOKEN_TTL_MINUTES".to_owned(),
                    format!("must be between 1 and {MAX_TOKEN_TTL_MINUTES} (got {ttl_minutes})"),
                )
            })?;

        let bootstrap_user = match (
            env.optional("DIRECTORIO_BOOTSTRAP_USERNAME"),
            env.optional("DIRECTORIO_BOOTSTRAP_PASSWORD"),
        ) {
            (Some(username), Some(password)) => Some(BootstrapUser {
                username,
                password: SecretString::from(password),
            }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::MissingEnvVar(
                    "DIRECTORIO_BOOTSTRAP_PASSWORD".to_owned(),
                ));
            }
            (None, Some(_)) => {
                return Err(ConfigError::MissingEnvVar(
                    "DIRECTORIO_BOOTSTRAP_USERNAME".to_owned(),
                ));
            }
        };

        let log_json = env
            .optional("DIRECTORIO_LOG_JSON")
            .is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"));

        Ok(Self {
            database_url,
            host,
            port,
            secret_key: SecretString::from(secret_key),
            jwt_algorithm,
            token_ttl,
            bootstrap_user,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
            log_json,
        })
    }

    /// Configuration with defaults everywhere except the secret key.
    ///
    /// Uses the in-memory store and binds an ephemeral port. The secret is
    /// not validated.
    #[must_use]
    pub fn with_defaults(secret_key: SecretString) -> Self {
        Self {
            database_url: None,
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            secret_key,
            jwt_algorithm: Algorithm::HS256,
            token_ttl: Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES),
            bootstrap_user: None,
            sentry_dsn: None,
            sentry_environment: None,
            log_json: false,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct EnvReader<'a, F: Fn(&str) -> Option<String>> {
    lookup: &'a F,
}

impl<F: Fn(&str) -> Option<String>> EnvReader<'_, F> {
    /// Non-empty value of `key`.
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_owned()))
    }

    fn parsed<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key).map_or(Ok(default), |raw| {
            raw.trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))
        })
    }
}

fn parse_algorithm(raw: &str) -> Option<Algorithm> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "HS256" => Some(Algorithm::HS256),
        "HS384" => Some(Algorithm::HS384),
        "HS512" => Some(Algorithm::HS512),
        _ => None,
    }
}

/// Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    let mut counts: HashMap<char, u32> = HashMap::new();
    let mut total = 0_u32;
    for c in s.chars() {
        *counts.entry(c).or_default() += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }

    let total = f64::from(total);
    counts
        .values()
        .map(|&n| {
            let p = f64::from(n) / total;
            -p * p.log2()
        })
        .sum()
}

/// Reject secrets that are short, look like placeholders, or have low entropy.
fn check_secret_key(value: &str, var_name: &str) -> Result<(), ConfigError> {
    let insecure = |reason: String| ConfigError::InsecureSecret(var_name.to_owned(), reason);

    let length = value.chars().count();
    if length < MIN_SECRET_KEY_LENGTH {
        return Err(insecure(format!(
            "must be at least {MIN_SECRET_KEY_LENGTH} characters (got {length})"
        )));
    }

    let lower = value.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(insecure(format!(
            "appears to be a placeholder (contains '{pattern}')"
        )));
    }

    let entropy = shannon_entropy(value);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(insecure(format!(
            "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
        )));
    }

    Ok(())
}
