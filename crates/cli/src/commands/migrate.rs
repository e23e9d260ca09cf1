//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! directorio migrate
//! ```
//!
//! # Environment Variables
//!
//! - `DIRECTORIO_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//!
//! Migrations live in `crates/api/migrations/` and are embedded at build time.

use directorio_api::db;

use super::{CommandError, database_url};

/// Apply pending migrations.
pub async fn run() -> Result<(), CommandError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running migrations...");
    db::run_migrations(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
