//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Trailing slash normalization
//! 2. Sentry layers (hub per request, transactions)
//! 3. `TraceLayer` (request span)
//! 4. Request ID
//! 5. Response envelope
//!
//! Authentication is per-handler through the extractors in [`auth`].
//! `POST /token` additionally carries the [`rate_limit`] layer.

pub mod auth;
pub mod rate_limit;
pub mod request_id;

pub use auth::{RequestContext, RequireAuth};
pub use rate_limit::login_rate_limiter;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
