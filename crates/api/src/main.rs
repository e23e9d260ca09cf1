//! Directorio API server.
//!
//! Serves the persona/direccion directory on port 8000 by default.
//!
//! # Storage
//!
//! With `DIRECTORIO_DATABASE_URL` (or `DATABASE_URL`) set, data lives in
//! `PostgreSQL`. Without it the server falls back to an in-memory store that
//! is lost on exit.

#![cfg_attr(not(test), forbid(unsafe_code))]

use secrecy::ExposeSecret;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{Layer, layer::SubscriberExt, util::SubscriberInitExt};

use directorio_api::config::DirectorioConfig;
use directorio_api::db::{self, MemoryStore, Store};
use directorio_api::services::auth::AuthService;
use directorio_api::state::AppState;

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &DirectorioConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing(config: &DirectorioConfig) {
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "directorio_api=info,tower_http=debug".into());

    let fmt_layer = if config.log_json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

async fn open_store(config: &DirectorioConfig) -> Store {
    match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url)
                .await
                .expect("Failed to create database pool");
            tracing::info!("Database pool created");
            // Migrations are run explicitly: `directorio migrate`
            Store::Postgres(pool)
        }
        None => {
            tracing::warn!("No database URL configured, using in-memory store");
            Store::Memory(MemoryStore::new())
        }
    }
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = DirectorioConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);
    init_tracing(&config);

    let store = open_store(&config).await;

    if let Some(bootstrap) = &config.bootstrap_user {
        let mut conn = store.acquire().await.expect("Failed to acquire store");
        let user = AuthService::new(&mut conn)
            .ensure_user(&bootstrap.username, bootstrap.password.expose_secret())
            .await
            .expect("Failed to create bootstrap user");
        tracing::info!(user_id = %user.id, username = %user.username, "bootstrap user ready");
    }

    let addr = config.socket_addr();
    let state = AppState::new(config, store);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!("directorio-api listening on {}", addr);

    directorio_api::serve(listener, state, shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
