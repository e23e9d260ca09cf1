//! Signed access tokens (JWT, HMAC).
//!
//! A token carries the username as `sub`, plus `iat` and `exp` as Unix
//! seconds. A token is valid while `now < exp`; there is no leeway.

use core::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use directorio_core::Username;

/// Default token lifetime in minutes.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 1500;

/// Longest accepted token lifetime in minutes (one year).
pub const MAX_TOKEN_TTL_MINUTES: i64 = 525_600;

/// Token type reported to clients.
pub const TOKEN_TYPE: &str = "bearer";

/// Errors from issuing or verifying a token.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Signing the claims failed.
    #[error("failed to sign token: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),

    /// Expiry does not fit in a timestamp.
    #[error("token expiry out of range")]
    ExpiryOutOfRange,

    /// Bad signature, wrong algorithm, or malformed token.
    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    /// The token's `exp` has passed.
    #[error("token has expired")]
    Expired,
}

/// JWT claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Username of the token holder.
    pub sub: String,
    /// Expiry, Unix seconds.
    pub exp: i64,
    /// Issue time, Unix seconds.
    pub iat: i64,
}

/// Response body of a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    /// Signed JWT.
    pub access_token: String,
    /// Always `bearer`.
    pub token_type: String,
}

/// Signing and verification keys derived from the server secret.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    ttl: Duration,
}

impl fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenKeys")
            .field("algorithm", &self.algorithm)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenKeys {
    /// Build keys for an HMAC algorithm.
    #[must_use]
    pub fn new(secret: &SecretString, algorithm: Algorithm, ttl: Duration) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            algorithm,
            ttl,
        }
    }

    /// Issue a token for `username` with the configured lifetime.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Encoding` if signing fails.
    pub fn issue(&self, username: &Username) -> Result<AccessToken, TokenError> {
        self.issue_at(username, self.ttl, Utc::now())
    }

    /// Issue a token with an explicit lifetime and issue time.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::ExpiryOutOfRange` if `now + ttl` overflows.
    /// Returns `TokenError::Encoding` if signing fails.
    pub fn issue_at(
        &self,
        username: &Username,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<AccessToken, TokenError> {
        let expires = now
            .checked_add_signed(ttl)
            .ok_or(TokenError::ExpiryOutOfRange)?;
        let claims = Claims {
            sub: username.as_str().to_owned(),
            iat: now.timestamp(),
            exp: expires.timestamp(),
        };

        let access_token = encode(&Header::new(self.algorithm), &claims, &self.encoding)
            .map_err(TokenError::Encoding)?;

        Ok(AccessToken {
            access_token,
            token_type: TOKEN_TYPE.to_owned(),
        })
    }

    /// Verify a token's signature, algorithm and expiry.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` for a bad signature, algorithm, or shape.
    /// Returns `TokenError::Expired` once `exp` has passed.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token as of `now`.
    ///
    /// # Errors
    ///
    /// See [`TokenKeys::verify`].
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        // Expiry is checked below against `now`, without leeway.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(TokenError::Invalid)?
            .claims;

        if claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn keys(algorithm: Algorithm) -> TokenKeys {
        let secret = SecretString::from("kP9#mQ2$vL5nR8@xT3wY6zB1cF4hJ7gE");
        TokenKeys::new(&secret, algorithm, Duration::minutes(30))
    }

    fn ana() -> Username {
        Username::parse("ana").unwrap()
    }

    #[test]
    fn issued_token_verifies() {
        let keys = keys(Algorithm::HS256);
        let token = keys.issue(&ana()).unwrap();
        assert_eq!(token.token_type, "bearer");

        let claims = keys.verify(&token.access_token).unwrap();
        assert_eq!(claims.sub, "ana");
        assert_eq!(claims.exp - claims.iat, 30 * 60);
    }

    #[test]
    fn token_expires_exactly_at_exp() {
        let keys = keys(Algorithm::HS256);
        let issued = Utc::now();
        let token = keys
            .issue_at(&ana(), Duration::minutes(1), issued)
            .unwrap()
            .access_token;

        let before = issued + Duration::seconds(59);
        assert!(keys.verify_at(&token, before).is_ok());

        let at = issued + Duration::minutes(1);
        assert!(matches!(
            keys.verify_at(&token, at),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn overflowing_expiry_is_an_error() {
        let keys = keys(Algorithm::HS256);
        let result = keys.issue_at(&ana(), Duration::days(100_000_000), Utc::now());
        assert!(matches!(result, Err(TokenError::ExpiryOutOfRange)));

        let longest = Duration::minutes(MAX_TOKEN_TTL_MINUTES);
        assert!(keys.issue_at(&ana(), longest, Utc::now()).is_ok());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let keys = keys(Algorithm::HS256);
        let mut token = keys.issue(&ana()).unwrap().access_token;
        token.push('x');
        assert!(matches!(keys.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn other_secret_is_rejected() {
        let token = keys(Algorithm::HS256).issue(&ana()).unwrap().access_token;
        let other = TokenKeys::new(
            &SecretString::from("Zq8!rT4@pW1#nB6$sV3%yH9^kM2&cJ5*"),
            Algorithm::HS256,
            Duration::minutes(30),
        );
        assert!(matches!(other.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn other_algorithm_is_rejected() {
        let token = keys(Algorithm::HS512).issue(&ana()).unwrap().access_token;
        assert!(matches!(
            keys(Algorithm::HS256).verify(&token),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(keys(Algorithm::HS256).verify("not.a.jwt").is_err());
        assert!(keys(Algorithm::HS256).verify("").is_err());
    }

    #[test]
    fn debug_hides_keys() {
        let debug = format!("{:?}", keys(Algorithm::HS384));
        assert!(debug.contains("HS384"));
        assert!(!debug.contains("kP9"));
    }
}
