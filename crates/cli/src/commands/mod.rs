//! CLI subcommand implementations.

pub mod migrate;
pub mod user;

use secrecy::SecretString;
use thiserror::Error;

use directorio_api::services::auth::AuthError;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// User could not be created.
    #[error("{0}")]
    User(#[from] AuthError),

    /// Could not reach the store.
    #[error("Store error: {0}")]
    Store(#[from] directorio_api::db::RepositoryError),
}

/// Read the database URL, preferring `DIRECTORIO_DATABASE_URL`.
pub fn database_url() -> Result<SecretString, CommandError> {
    dotenvy::dotenv().ok();

    std::env::var("DIRECTORIO_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("DIRECTORIO_DATABASE_URL"))
}
