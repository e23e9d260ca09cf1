//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! directorio user create -u ana -e ana@example.com -p 'long password' --password-confirm 'long password'
//! ```

use directorio_api::db::{self, Store};
use directorio_api::models::UserIn;
use directorio_api::services::auth::AuthService;

use super::{CommandError, database_url};

/// Validate `input` and store the user. Returns the new user's ID.
pub async fn create(input: UserIn) -> Result<i32, CommandError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to database...");
    let store = Store::Postgres(db::create_pool(&database_url).await?);

    let mut conn = store.acquire().await?;
    let user = AuthService::new(&mut conn).register(input).await?;

    tracing::info!(user_id = %user.id, username = %user.username, "User created");
    Ok(user.id.as_i32())
}
