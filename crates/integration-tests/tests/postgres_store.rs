//! The HTTP flow against a real `PostgreSQL` store.
//!
//! These tests require a reachable database:
//!
//! ```bash
//! DIRECTORIO_TEST_DATABASE_URL=postgres://localhost/directorio_test \
//!     cargo test -p directorio-integration-tests -- --ignored
//! ```
//!
//! Migrations are applied before each test. Rows are never deleted, so names
//! carry a random suffix.

use reqwest::StatusCode;
use secrecy::SecretString;
use serde_json::json;
use uuid::Uuid;

use directorio_api::db::{self, Store};
use directorio_integration_tests::{TestServer, read_envelope};

async fn postgres_server() -> TestServer {
    let url = std::env::var("DIRECTORIO_TEST_DATABASE_URL")
        .expect("DIRECTORIO_TEST_DATABASE_URL must be set");
    let pool = db::create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect to test database");
    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    TestServer::start_with_store(Store::Postgres(pool)).await
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database (DIRECTORIO_TEST_DATABASE_URL)"]
async fn test_postgres_persona_round_trip() {
    let server = postgres_server().await;
    let token = server.token().await;
    let client = server.client();
    let calle = format!("Main {}", Uuid::new_v4());

    let resp = client
        .post(server.url("/direccion/create"))
        .bearer_auth(&token)
        .json(&json!({"calle": calle, "numero": 5}))
        .send()
        .await
        .expect("Failed to create direccion");
    assert_eq!(resp.status(), StatusCode::OK);
    let direccion = read_envelope(resp).await.data.expect("direccion data");

    let resp = client
        .post(server.url("/persona/create"))
        .bearer_auth(&token)
        .json(&json!({"nombre": "Ana", "apellido": "Garcia", "direccion_id": direccion["id"]}))
        .send()
        .await
        .expect("Failed to create persona");
    assert_eq!(resp.status(), StatusCode::OK);
    let persona = read_envelope(resp).await.data.expect("persona data");
    assert_eq!(persona["direccion"]["calle"], calle.as_str());

    let resp = client
        .put(server.url(&format!("/persona/update/{}", persona["id"])))
        .bearer_auth(&token)
        .json(&json!({"nombre": "Ana", "apellido": "Garcia", "direccion_id": 0}))
        .send()
        .await
        .expect("Failed to update persona");
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = read_envelope(resp).await.data.expect("persona data");
    assert!(updated["direccion"].is_null());
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database (DIRECTORIO_TEST_DATABASE_URL)"]
async fn test_postgres_dangling_reference_is_422() {
    let server = postgres_server().await;
    let token = server.token().await;

    let resp = server
        .client()
        .post(server.url("/persona/create"))
        .bearer_auth(&token)
        .json(&json!({"nombre": "Ana", "apellido": "Garcia", "direccion_id": i32::MAX}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database (DIRECTORIO_TEST_DATABASE_URL)"]
async fn test_postgres_readiness_reports_store() {
    let server = postgres_server().await;

    let resp = server
        .client()
        .get(server.url("/health/ready"))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), StatusCode::OK);
    let data = read_envelope(resp).await.data.expect("readiness data");
    assert_eq!(data["store"], "postgres");
}
