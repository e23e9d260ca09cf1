//! Request ID middleware for tracing and correlation.
//!
//! Reuses an upstream `x-request-id` when it is short printable ASCII,
//! otherwise generates a UUID v4. The ID is recorded on the request span,
//! tagged in Sentry, and echoed in the response headers.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_REQUEST_ID_LENGTH: usize = 128;

fn accept_upstream(value: &HeaderValue) -> Option<String> {
    let id = value.to_str().ok()?.trim();
    let usable = !id.is_empty()
        && id.len() <= MAX_REQUEST_ID_LENGTH
        && id.bytes().all(|b| b.is_ascii_graphic());
    usable.then(|| id.to_owned())
}

/// Middleware that ensures every request has a request ID.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(accept_upstream)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    Span::current().record("request_id", request_id.as_str());

    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}
