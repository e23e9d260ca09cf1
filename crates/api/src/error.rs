//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding. All route handlers return `Result<T, AppError>`; the
//! client message travels to the envelope as an [`ErrorDetail`] extension.

use axum::{
    extract::rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::ValidationError;
use crate::response::ErrorDetail;
use crate::services::auth::AuthError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request could not be understood or failed validation.
    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

fn repository_status(err: &RepositoryError) -> StatusCode {
    match err {
        RepositoryError::Conflict(_) => StatusCode::CONFLICT,
        RepositoryError::InvalidReference(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn repository_message(err: &RepositoryError) -> String {
    match err {
        RepositoryError::Conflict(msg) | RepositoryError::InvalidReference(msg) => msg.clone(),
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
            "Internal server error".to_owned()
        }
    }
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Database(err) | Self::Auth(AuthError::Repository(err)) => repository_status(err),
            Self::Auth(err) => match err {
                AuthError::CredentialsInvalid | AuthError::IncorrectLogin => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::PasswordHash | AuthError::Token(_) | AuthError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    /// Client-facing message. Never exposes internal details.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Database(err) | Self::Auth(AuthError::Repository(err)) => {
                repository_message(err)
            }
            Self::Auth(err) => match err {
                AuthError::CredentialsInvalid => "Could not validate credentials".to_owned(),
                AuthError::IncorrectLogin => "Incorrect username or password".to_owned(),
                AuthError::Validation(e) => e.to_string(),
                AuthError::UserAlreadyExists => "User already exists".to_owned(),
                AuthError::PasswordHash | AuthError::Token(_) | AuthError::Repository(_) => {
                    "Internal server error".to_owned()
                }
            },
            Self::NotFound(msg) | Self::Validation(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let message = self.message();
        let mut response = (status, message.clone()).into_response();
        response.extensions_mut().insert(ErrorDetail(message));

        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        response
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the authenticated user.
pub fn set_sentry_user(user_id: &impl ToString, username: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            username: Some(username.to_owned()),
            ..Default::default()
        }));
    });
}
