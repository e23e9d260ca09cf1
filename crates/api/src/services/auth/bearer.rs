//! `Authorization: Bearer <token>` header parsing.

use axum::http::HeaderValue;

use super::AuthError;

/// Extract the token from an `Authorization` header value.
///
/// The scheme is matched case-insensitively. A missing header, another
/// scheme, or an empty token is rejected.
///
/// # Errors
///
/// Returns `AuthError::CredentialsInvalid` if no usable bearer token is present.
pub fn parse_bearer_header(header: Option<&HeaderValue>) -> Result<&str, AuthError> {
    let value = header
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::CredentialsInvalid)?;

    let (scheme, token) = value
        .trim()
        .split_once(' ')
        .ok_or(AuthError::CredentialsInvalid)?;

    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::CredentialsInvalid);
    }

    Ok(token)
}
