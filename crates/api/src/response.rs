//! Response envelope.
//!
//! Every response body leaves the server as
//!
//! ```json
//! { "status": 200, "data": { ... }, "detail": null }
//! ```
//!
//! Handlers return plain `Json<T>` or an `AppError`; [`envelope_middleware`]
//! does the wrapping. An `AppError` marks its response with an
//! [`ErrorDetail`] extension so the middleware can use the client message
//! without parsing the body. Responses produced by the framework itself
//! (unknown methods, extractor rejections) have their body text, or the
//! status reason phrase, moved into `detail`.

use axum::{
    Json,
    body::{Body, to_bytes},
    extract::Request,
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Largest body the middleware will buffer when rewriting a response.
const MAX_REWRITE_BODY: usize = 2 * 1024 * 1024;

/// Client-facing error message attached to error responses.
#[derive(Debug, Clone)]
pub struct ErrorDetail(pub String);

/// Uniform response wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T = serde_json::Value> {
    /// HTTP status code, repeated from the response line.
    pub status: u16,
    /// Handler payload; `null` on errors.
    pub data: Option<T>,
    /// Error message; `null` on success.
    pub detail: Option<String>,
}

impl<T> Envelope<T> {
    /// A success envelope carrying `data`.
    #[must_use]
    pub const fn success(status: StatusCode, data: Option<T>) -> Self {
        Self {
            status: status.as_u16(),
            data,
            detail: None,
        }
    }

    /// An error envelope with no data.
    #[must_use]
    pub fn failure(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            data: None,
            detail: Some(detail.into()),
        }
    }
}

/// Handler result with a JSON body.
pub type ApiResult<T> = Result<Json<T>, crate::error::AppError>;

fn build(status: StatusCode, detail: Option<String>, bytes: &[u8]) -> Envelope {
    if let Some(detail) = detail {
        return Envelope::failure(status, detail);
    }

    if status.is_success() {
        let data = (!bytes.is_empty()).then(|| {
            serde_json::from_slice(bytes).unwrap_or_else(|_| {
                serde_json::Value::String(String::from_utf8_lossy(bytes).into_owned())
            })
        });
        return Envelope::success(status, data);
    }

    let text = String::from_utf8_lossy(bytes);
    let text = text.trim();
    if text.is_empty() {
        Envelope::failure(status, status.canonical_reason().unwrap_or("Error"))
    } else {
        Envelope::failure(status, text)
    }
}

/// Wrap every response body in an [`Envelope`], keeping the status code.
pub async fn envelope_middleware(request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    let (mut parts, body) = response.into_parts();
    let detail = parts.extensions.remove::<ErrorDetail>().map(|d| d.0);

    let bytes = match to_bytes(body, MAX_REWRITE_BODY).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(error = %e, "failed to buffer response body");
            let envelope =
                Envelope::<()>::failure(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(envelope)).into_response();
        }
    };

    let envelope = build(parts.status, detail, &bytes);
    let body = match serde_json::to_vec(&envelope) {
        Ok(body) => body,
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize envelope");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );

    Response::from_parts(parts, Body::from(body))
}
