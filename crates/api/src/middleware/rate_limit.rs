//! Login rate limiting using governor and `tower_governor`.
//!
//! `POST /token` is limited per client IP: a burst of 5 attempts, then one
//! more every 6 seconds. Rejections are plain 429 responses that the envelope
//! middleware wraps like any other error.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Key extractor for the client IP.
///
/// Proxy headers win over the socket peer. Requests with neither (in-process
/// tests) share the unspecified address.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor;

fn header_ip<T>(req: &Request<T>, name: &str) -> Option<IpAddr> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let ip = header_ip(req, "x-forwarded-for")
            .or_else(|| header_ip(req, "x-real-ip"))
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip())
            })
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        Ok(ip)
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create the rate limiter for `POST /token`: ~10 attempts per minute per IP.
///
/// # Panics
///
/// This function will not panic. `per_second(6)` and `burst_size(5)` are
/// both non-zero, which is all `GovernorConfigBuilder` checks.
#[must_use]
pub fn login_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_second(6) // Replenish 1 attempt every 6 seconds
        .burst_size(5)
        .finish()
        .expect("rate limiter config with per_second(6) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config))
}
