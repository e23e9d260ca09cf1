//! Authentication error types.

use thiserror::Error;

use super::token::TokenError;
use crate::db::RepositoryError;
use crate::models::ValidationError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Bearer token missing, malformed, expired, or naming an unknown user.
    #[error("could not validate credentials")]
    CredentialsInvalid,

    /// Wrong username or password at login.
    #[error("incorrect username or password")]
    IncorrectLogin,

    /// Registration input failed validation.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Token could not be issued.
    #[error("token error: {0}")]
    Token(#[from] TokenError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
