//! Directorio API library.
//!
//! A small directory of personas and their addresses (direcciones) behind a
//! JSON HTTP API. Reads are public; mutations need a bearer token obtained
//! from `POST /token`. Every response body is wrapped in the
//! `{status, data, detail}` envelope.
//!
//! The binary in `main.rs` wires configuration, tracing and Sentry around
//! [`app`]; integration tests drive the same router through [`serve`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    Router, ServiceExt,
    extract::Request,
    http::Response,
    middleware::from_fn,
};
use tokio::net::TcpListener;
use tower::Layer;
use tower_http::{
    normalize_path::{NormalizePath, NormalizePathLayer},
    trace::{DefaultOnResponse, OnResponse, TraceLayer},
};
use tracing::Span;

use crate::middleware::request_id_middleware;
use crate::response::envelope_middleware;
use crate::state::AppState;

/// Build the full application: routes, envelope, request ids, tracing and
/// Sentry, with trailing slashes trimmed before routing.
pub fn app(state: AppState) -> NormalizePath<Router> {
    let router = routes::routes()
        .layer(from_fn(envelope_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        user_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(|response: &Response<_>, latency: Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    span.record(
                        "latency_ms",
                        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                    );
                    DefaultOnResponse::default().on_response(response, latency, span);
                }),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}

/// Serve [`app`] on `listener` until `shutdown` resolves.
///
/// Peer addresses are attached as `ConnectInfo` for the login rate limiter.
///
/// # Errors
///
/// Returns the I/O error that stopped the server.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let service =
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app(state));

    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown)
        .await
}
