//! Authentication service.
//!
//! Password login, access token issue, and resolution of a bearer token to
//! the user it names.

mod bearer;
mod error;
mod password;
mod token;

pub use bearer::parse_bearer_header;
pub use error::AuthError;
pub use password::{hash_password, sanitize_password, verify_password};

use password::verify_dummy_password;
pub use token::{
    AccessToken, Claims, DEFAULT_TOKEN_TTL_MINUTES, MAX_TOKEN_TTL_MINUTES, TOKEN_TYPE, TokenError,
    TokenKeys,
};

use directorio_core::Username;

use crate::db::{RepositoryError, StoreHandle, UserRepository};
use crate::models::{User, UserIn};

/// Authentication service.
///
/// Borrows the request's store handle for the user lookups it needs.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(conn: &'a mut StoreHandle) -> Self {
        Self {
            users: UserRepository::new(conn),
        }
    }

    /// Check a username and password.
    ///
    /// Returns `None` for an unknown or malformed username, or a wrong
    /// password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the lookup fails.
    pub async fn authenticate(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, AuthError> {
        let user = match Username::parse(username.trim()) {
            Ok(username) => self.users.get_by_username(&username).await?,
            Err(_) => None,
        };

        let Some(user) = user else {
            // Same Argon2 cost as a wrong password for a known user.
            verify_dummy_password(password);
            return Ok(None);
        };

        Ok(verify_password(password, &user.password_hash).then_some(user))
    }

    /// Authenticate and issue an access token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::IncorrectLogin` if the credentials do not match.
    /// Returns `AuthError::Token` if the token cannot be signed.
    pub async fn login(
        &mut self,
        keys: &TokenKeys,
        username: &str,
        password: &str,
    ) -> Result<AccessToken, AuthError> {
        let user = self
            .authenticate(username, password)
            .await?
            .ok_or(AuthError::IncorrectLogin)?;

        tracing::info!(user_id = %user.id, "access token issued");
        Ok(keys.issue(&user.username)?)
    }

    /// Resolve a bearer token to the user it names.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::CredentialsInvalid` if the token is invalid or
    /// expired, or names a user that does not exist.
    /// Returns `AuthError::Repository` if the lookup fails.
    pub async fn resolve_authenticated_user(
        &mut self,
        keys: &TokenKeys,
        token: &str,
    ) -> Result<User, AuthError> {
        let claims = keys.verify(token).map_err(|e| {
            tracing::debug!(error = %e, "rejected access token");
            AuthError::CredentialsInvalid
        })?;

        let username = Username::parse(&claims.sub).map_err(|_| AuthError::CredentialsInvalid)?;

        self.users
            .get_by_username(&username)
            .await?
            .ok_or(AuthError::CredentialsInvalid)
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if the input is invalid.
    /// Returns `AuthError::UserAlreadyExists` if the username or email is taken.
    pub async fn register(&mut self, input: UserIn) -> Result<User, AuthError> {
        let new = sanitize_password(input)?;

        self.users.create(&new).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
            other => AuthError::Repository(other),
        })
    }

    /// Return the user with `username`, creating it if missing.
    ///
    /// An existing user keeps its current password.
    ///
    /// # Errors
    ///
    /// See [`AuthService::register`].
    pub async fn ensure_user(&mut self, username: &str, password: &str) -> Result<User, AuthError> {
        if let Ok(parsed) = Username::parse(username)
            && let Some(existing) = self.users.get_by_username(&parsed).await?
        {
            return Ok(existing);
        }

        self.register(UserIn {
            username: username.to_owned(),
            email: None,
            password: password.to_owned(),
            password_confirm: password.to_owned(),
        })
        .await
    }
}
