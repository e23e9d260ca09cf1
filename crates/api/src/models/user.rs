//! User account shapes.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use directorio_core::{UserId, Username};

use super::ValidationError;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum length of an email address.
const MAX_EMAIL_LENGTH: usize = 254;

/// A stored user account.
#[derive(Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: Option<String>,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Registration input.
#[derive(Clone, Deserialize)]
pub struct UserIn {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    pub password: String,
    pub password_confirm: String,
}

impl fmt::Debug for UserIn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserIn")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl UserIn {
    /// Check the fields that do not involve hashing.
    ///
    /// Returns the parsed username and the normalized email.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for an invalid username or email, a short
    /// password, or a confirmation that does not match.
    pub fn validate(&self) -> Result<(Username, Option<String>), ValidationError> {
        let username = Username::parse(self.username.trim())
            .map_err(|e| ValidationError::new("username", e.to_string()))?;

        let email = match self.email.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(validate_email(raw)?),
        };

        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ValidationError::new(
                "password",
                format!("must be at least {MIN_PASSWORD_LENGTH} characters"),
            ));
        }

        if self.password != self.password_confirm {
            return Err(ValidationError::new(
                "password_confirm",
                "passwords do not match",
            ));
        }

        Ok((username, email))
    }
}

fn validate_email(raw: &str) -> Result<String, ValidationError> {
    if raw.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::new(
            "email",
            format!("must be at most {MAX_EMAIL_LENGTH} characters"),
        ));
    }

    let dotted = |domain: &str| {
        !domain.contains('@') && domain.contains('.') && domain.split('.').all(|l| !l.is_empty())
    };

    match raw.split_once('@') {
        Some((local, domain)) if !local.is_empty() && dotted(domain) => Ok(raw.to_lowercase()),
        _ => Err(ValidationError::new("email", "is not a valid email address")),
    }
}

/// Storage input for a user; the password is already hashed.
#[derive(Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: Username,
    pub email: Option<String>,
    pub password_hash: String,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserOut {
    pub id: UserId,
    pub username: Username,
    pub email: Option<String>,
}

impl From<User> for UserOut {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
        }
    }
}

impl From<&User> for UserOut {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            username: u.username.clone(),
            email: u.email.clone(),
        }
    }
}
