//! End-to-end persona and direccion flows over HTTP.
//!
//! Runs against an in-process server backed by the in-memory store.

use reqwest::StatusCode;
use serde_json::json;

use directorio_integration_tests::{TestServer, read_envelope};

// ============================================================================
// Create / Read / Update
// ============================================================================

#[tokio::test]
async fn test_persona_with_direccion_round_trip() {
    let server = TestServer::start().await;
    let token = server.token().await;
    let client = server.client();

    let resp = client
        .post(server.url("/direccion/create/"))
        .bearer_auth(&token)
        .json(&json!({"calle": "Main", "numero": 5}))
        .send()
        .await
        .expect("Failed to create direccion");
    assert_eq!(resp.status(), StatusCode::OK);
    let direccion = read_envelope(resp).await.data.expect("direccion data");
    let direccion_id = direccion["id"].as_i64().expect("direccion id");
    assert_eq!(direccion["calle"], "Main");

    let resp = client
        .post(server.url("/persona/create/"))
        .bearer_auth(&token)
        .json(&json!({"nombre": "Ana", "apellido": "Garcia", "direccion_id": direccion_id}))
        .send()
        .await
        .expect("Failed to create persona");
    assert_eq!(resp.status(), StatusCode::OK);
    let persona = read_envelope(resp).await.data.expect("persona data");
    let persona_id = persona["id"].as_i64().expect("persona id");
    assert_eq!(persona["direccion"], direccion);

    let resp = client
        .get(server.url(&format!("/persona/{persona_id}/")))
        .send()
        .await
        .expect("Failed to get persona");
    assert_eq!(resp.status(), StatusCode::OK);
    let envelope = read_envelope(resp).await;
    assert_eq!(envelope.status, 200);
    assert!(envelope.detail.is_none());
    assert_eq!(envelope.data.expect("persona data")["direccion"], direccion);

    let resp = client
        .put(server.url(&format!("/persona/update/{persona_id}/")))
        .bearer_auth(&token)
        .json(&json!({"nombre": "Ana Maria", "apellido": "Garcia", "direccion_id": 0}))
        .send()
        .await
        .expect("Failed to update persona");
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = read_envelope(resp).await.data.expect("persona data");
    assert_eq!(updated["nombre"], "Ana Maria");
    assert!(updated["direccion_id"].is_null());
    assert!(updated["direccion"].is_null());
}

#[tokio::test]
async fn test_persona_without_direccion() {
    let server = TestServer::start().await;
    let token = server.token().await;

    let resp = server
        .client()
        .post(server.url("/persona/create"))
        .bearer_auth(&token)
        .json(&json!({"nombre": "Luis", "apellido": "Perez", "direccion_id": 0}))
        .send()
        .await
        .expect("Failed to create persona");
    assert_eq!(resp.status(), StatusCode::OK);
    let persona = read_envelope(resp).await.data.expect("persona data");
    assert!(persona["direccion_id"].is_null());
    assert!(persona["direccion"].is_null());
}

// ============================================================================
// List & Pagination
// ============================================================================

#[tokio::test]
async fn test_persona_list_pagination() {
    let server = TestServer::start().await;
    let token = server.token().await;

    for nombre in ["Ana", "Luis", "Marta"] {
        let resp = server
            .client()
            .post(server.url("/persona/create"))
            .bearer_auth(&token)
            .json(&json!({"nombre": nombre, "apellido": "Garcia"}))
            .send()
            .await
            .expect("Failed to create persona");
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = server
        .client()
        .get(server.url("/persona/?offset=1&limit=2"))
        .send()
        .await
        .expect("Failed to list personas");
    assert_eq!(resp.status(), StatusCode::OK);
    let data = read_envelope(resp).await.data.expect("list data");
    let names: Vec<_> = data
        .as_array()
        .expect("list is an array")
        .iter()
        .map(|p| p["nombre"].as_str().unwrap_or_default().to_owned())
        .collect();
    assert_eq!(names, ["Luis", "Marta"]);
}

#[tokio::test]
async fn test_direccion_list_defaults() {
    let server = TestServer::start().await;

    let resp = server
        .client()
        .get(server.url("/direccion/list/"))
        .send()
        .await
        .expect("Failed to list direcciones");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(read_envelope(resp).await.data, Some(json!([])));
}

// ============================================================================
// Error envelopes
// ============================================================================

#[tokio::test]
async fn test_missing_persona_is_404() {
    let server = TestServer::start().await;

    let resp = server
        .client()
        .get(server.url("/persona/12345"))
        .send()
        .await
        .expect("Failed to get persona");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let envelope = read_envelope(resp).await;
    assert_eq!(envelope.status, 404);
    assert!(envelope.data.is_none());
    assert_eq!(envelope.detail.as_deref(), Some("Persona not found"));
}

#[tokio::test]
async fn test_invalid_input_is_422() {
    let server = TestServer::start().await;
    let token = server.token().await;

    let resp = server
        .client()
        .post(server.url("/direccion/create"))
        .bearer_auth(&token)
        .json(&json!({"calle": "Main", "numero": -1}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let envelope = read_envelope(resp).await;
    assert_eq!(envelope.status, 422);
    assert!(envelope.detail.is_some());

    let resp = server
        .client()
        .post(server.url("/persona/create"))
        .bearer_auth(&token)
        .json(&json!({"nombre": "Ana", "apellido": "Garcia", "direccion_id": 99}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_method_not_allowed_is_enveloped() {
    let server = TestServer::start().await;

    let resp = server
        .client()
        .delete(server.url("/persona/1"))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    let envelope = read_envelope(resp).await;
    assert_eq!(envelope.status, 405);
    assert!(envelope.data.is_none());
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = TestServer::start().await;

    let resp = server
        .client()
        .get(server.url("/health"))
        .header("x-request-id", "it-123")
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.headers()["x-request-id"], "it-123");

    let resp = server
        .client()
        .get(server.url("/health"))
        .send()
        .await
        .expect("Failed to send request");
    assert!(resp.headers().contains_key("x-request-id"));
}
