//! Storage for the directory.
//!
//! # Backends
//!
//! - `PostgreSQL` when a database URL is configured
//! - an in-process [`MemoryStore`] otherwise (local runs and tests)
//!
//! # Tables
//!
//! - `direccion` - postal addresses
//! - `persona` - people, optionally referencing a `direccion`
//! - `app_user` - API accounts
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p directorio-cli -- migrate
//! ```
//!
//! Repositories borrow a [`StoreHandle`], which is acquired once per request
//! and released when the request finishes.

pub mod direcciones;
pub mod memory;
pub mod personas;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use serde::Deserialize;
use sqlx::migrate::{MigrateError, Migrator};
use sqlx::pool::PoolConnection;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres};
use thiserror::Error;

pub use direcciones::DireccionRepository;
pub use memory::MemoryStore;
pub use personas::PersonaRepository;
pub use users::UserRepository;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Default page size for list operations.
pub const DEFAULT_LIMIT: u32 = 100;

/// Largest page size a client may request.
pub const MAX_LIMIT: u32 = 1000;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A reference points at a row that does not exist.
    #[error("invalid reference: {0}")]
    InvalidReference(String),
}

impl RepositoryError {
    /// Map a sqlx error, turning constraint violations into domain errors.
    pub(crate) fn from_write(e: sqlx::Error, conflict: &str, reference: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return Self::Conflict(conflict.to_owned());
            }
            if db_err.is_foreign_key_violation() {
                return Self::InvalidReference(reference.to_owned());
            }
        }
        Self::Database(e)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Apply pending migrations.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails or the history diverges.
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

/// Shared storage backend. Cheap to clone.
#[derive(Clone, Debug)]
pub enum Store {
    /// `PostgreSQL` connection pool.
    Postgres(PgPool),
    /// Process-local tables, lost on exit.
    Memory(MemoryStore),
}

impl Store {
    /// Acquire a handle for one unit of work.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if no connection is available
    /// within the pool's acquire timeout.
    pub async fn acquire(&self) -> Result<StoreHandle, RepositoryError> {
        match self {
            Self::Postgres(pool) => Ok(StoreHandle::Postgres(pool.acquire().await?)),
            Self::Memory(mem) => Ok(StoreHandle::Memory(mem.clone())),
        }
    }

    /// Check that the backend is reachable.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the database does not answer.
    pub async fn ping(&self) -> Result<(), RepositoryError> {
        match self {
            Self::Postgres(pool) => {
                sqlx::query("SELECT 1").execute(pool).await?;
                Ok(())
            }
            Self::Memory(_) => Ok(()),
        }
    }

    /// Short backend name for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Memory(_) => "memory",
        }
    }
}

/// A request-scoped handle on the store.
///
/// For `PostgreSQL` this holds a pooled connection, which goes back to the
/// pool when the handle is dropped.
#[derive(Debug)]
pub enum StoreHandle {
    /// A connection checked out of the pool.
    Postgres(PoolConnection<Postgres>),
    /// A clone of the shared in-memory store.
    Memory(MemoryStore),
}

/// Offset/limit pagination for list operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Page {
    /// Rows to skip, default 0.
    #[serde(default)]
    pub offset: u32,
    /// Rows to return, default [`DEFAULT_LIMIT`].
    #[serde(default = "default_limit")]
    pub limit: u32,
}

const fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

impl Default for Page {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Page {
    /// A page starting at `offset` with up to `limit` rows.
    #[must_use]
    pub const fn new(offset: u32, limit: u32) -> Self {
        Self { offset, limit }
    }

    /// The page with its limit capped at [`MAX_LIMIT`].
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            offset: self.offset,
            limit: self.limit.min(MAX_LIMIT),
        }
    }

    pub(crate) fn sql_offset(self) -> i64 {
        i64::from(self.offset)
    }

    pub(crate) fn sql_limit(self) -> i64 {
        i64::from(self.limit)
    }

    pub(crate) fn skip(self) -> usize {
        usize::try_from(self.offset).unwrap_or(usize::MAX)
    }

    pub(crate) fn take(self) -> usize {
        usize::try_from(self.limit).unwrap_or(usize::MAX)
    }
}
