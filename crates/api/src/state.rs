//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::DirectorioConfig;
use crate::db::Store;
use crate::services::auth::TokenKeys;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: DirectorioConfig,
    store: Store,
    tokens: TokenKeys,
}

impl AppState {
    /// Create a new application state, deriving token keys from the config.
    #[must_use]
    pub fn new(config: DirectorioConfig, store: Store) -> Self {
        let tokens = TokenKeys::new(&config.secret_key, config.jwt_algorithm, config.token_ttl);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                tokens,
            }),
        }
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &DirectorioConfig {
        &self.inner.config
    }

    /// Get a reference to the storage backend.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    /// Get a reference to the token signing keys.
    #[must_use]
    pub fn tokens(&self) -> &TokenKeys {
        &self.inner.tokens
    }
}
