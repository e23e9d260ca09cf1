//! Integration tests for Directorio.
//!
//! # Running Tests
//!
//! ```bash
//! # In-memory store, no external services
//! cargo test -p directorio-integration-tests
//!
//! # Include the PostgreSQL-backed tests
//! DIRECTORIO_TEST_DATABASE_URL=postgres://... cargo test -p directorio-integration-tests -- --ignored
//! ```
//!
//! [`TestServer`] runs the real router on an ephemeral port so tests talk
//! HTTP exactly like a client would.

use std::net::SocketAddr;

use reqwest::{Client, StatusCode};
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::oneshot;

use directorio_api::config::DirectorioConfig;
use directorio_api::db::{MemoryStore, Store};
use directorio_api::services::auth::AuthService;
use directorio_api::state::AppState;

/// Signing secret used by every test server.
pub const TEST_SECRET_KEY: &str = "kP9#mQ2$vL5nR8@xT3wY6zB1cF4hJ7gE";

/// Seeded account available on every test server.
pub const TEST_USERNAME: &str = "ana";
/// Password of [`TEST_USERNAME`].
pub const TEST_PASSWORD: &str = "correct-horse";

/// Decoded response envelope.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub status: u16,
    pub data: Option<Value>,
    pub detail: Option<String>,
}

/// An API server bound to `127.0.0.1:0`, stopped when dropped.
pub struct TestServer {
    addr: SocketAddr,
    client: Client,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    /// Start a server on a fresh in-memory store.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot bind or the seed user cannot be created.
    pub async fn start() -> Self {
        Self::start_with_store(Store::Memory(MemoryStore::new())).await
    }

    /// Start a server on `store`, seeding [`TEST_USERNAME`] if missing.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot bind or the seed user cannot be created.
    pub async fn start_with_store(store: Store) -> Self {
        let config = DirectorioConfig::with_defaults(SecretString::from(TEST_SECRET_KEY));

        let mut conn = store.acquire().await.expect("Failed to acquire store");
        AuthService::new(&mut conn)
            .ensure_user(TEST_USERNAME, TEST_PASSWORD)
            .await
            .expect("Failed to seed test user");
        drop(conn);

        let state = AppState::new(config, store);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        let (tx, rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let shutdown = async {
                let _ = rx.await;
            };
            directorio_api::serve(listener, state, shutdown)
                .await
                .expect("Test server failed");
        });

        Self {
            addr,
            client: Client::new(),
            shutdown: Some(tx),
        }
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Shared HTTP client.
    #[must_use]
    pub const fn client(&self) -> &Client {
        &self.client
    }

    /// Log in with form credentials and return the raw response.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn login(&self, username: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/token"))
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .expect("Failed to send login request")
    }

    /// Log in as the seeded user and return the access token.
    ///
    /// # Panics
    ///
    /// Panics if login fails.
    pub async fn token(&self) -> String {
        let resp = self.login(TEST_USERNAME, TEST_PASSWORD).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let envelope = read_envelope(resp).await;
        envelope
            .data
            .as_ref()
            .and_then(|d| d["access_token"].as_str())
            .expect("Login response has no access_token")
            .to_owned()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Decode a response body as an [`Envelope`].
///
/// # Panics
///
/// Panics if the body is not an envelope.
pub async fn read_envelope(resp: reqwest::Response) -> Envelope {
    resp.json().await.expect("Response body is not an envelope")
}
