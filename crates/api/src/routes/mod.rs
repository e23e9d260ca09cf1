//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness
//! GET  /health/ready           - Store reachability
//!
//! # Persona
//! GET  /persona                - List (offset, limit)
//! GET  /persona/{id}           - Show
//! POST /persona/create         - Create (auth)
//! PUT  /persona/update/{id}    - Update (auth)
//!
//! # Direccion
//! GET  /direccion/list         - List (offset, limit)
//! GET  /direccion/{id}         - Show
//! POST /direccion/create       - Create (auth)
//!
//! # Auth
//! POST /token                  - Password login (form, rate limited)
//! GET  /users/me               - Current user (auth)
//! ```
//!
//! Trailing slashes are trimmed before routing, so `/persona/1/` reaches
//! `/persona/{id}`.

pub mod auth;
pub mod direcciones;
pub mod extract;
pub mod health;
pub mod personas;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::error::AppError;
use crate::middleware::login_rate_limiter;
use crate::state::AppState;

/// Create the API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/persona", get(personas::list))
        .route("/persona/create", post(personas::create))
        .route("/persona/update/{id}", put(personas::update))
        .route("/persona/{id}", get(personas::show))
        .route("/direccion/list", get(direcciones::list))
        .route("/direccion/create", post(direcciones::create))
        .route("/direccion/{id}", get(direcciones::show))
        .route("/token", post(auth::login).layer(login_rate_limiter()))
        .route("/users/me", get(auth::me))
        .fallback(not_found)
}

async fn not_found() -> AppError {
    AppError::NotFound("Not found".to_owned())
}
