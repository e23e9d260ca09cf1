//! Password hashing with Argon2id.

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use super::AuthError;
use crate::models::{NewUser, UserIn};

/// Hash a password using Argon2id with a random salt.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Check a plain password against a stored hash.
///
/// A hash that cannot be parsed never matches.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}

/// Hash checked when the username is unknown, so a miss costs as much as a
/// wrong password.
static DUMMY_HASH: LazyLock<String> =
    LazyLock::new(|| hash_password("directorio-dummy-password").unwrap_or_default());

/// Run a full Argon2 verification that never matches a real account.
pub(crate) fn verify_dummy_password(password: &str) -> bool {
    verify_password(password, &DUMMY_HASH)
}

/// Validate registration input and replace the password with its hash.
///
/// # Errors
///
/// Returns `AuthError::Validation` if the input is invalid.
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn sanitize_password(input: UserIn) -> Result<NewUser, AuthError> {
    let (username, email) = input.validate()?;
    let password_hash = hash_password(&input.password)?;

    Ok(NewUser {
        username,
        email,
        password_hash,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn dummy_hash_is_a_real_argon2_hash() {
        assert!(PasswordHash::new(&DUMMY_HASH).is_ok());
        assert!(!verify_dummy_password("correct-horse"));
    }

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("correct-horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct-horse", &hash));
        assert!(!verify_password("wrong-horse", &hash));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("correct-horse").unwrap();
        let b = hash_password("correct-horse").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-hash"));
        assert!(!verify_password("", ""));
    }

    #[test]
    fn sanitize_replaces_password() {
        let new = sanitize_password(UserIn {
            username: "ana".to_owned(),
            email: None,
            password: "correct-horse".to_owned(),
            password_confirm: "correct-horse".to_owned(),
        })
        .unwrap();

        assert_eq!(new.username.as_str(), "ana");
        assert_ne!(new.password_hash, "correct-horse");
        assert!(verify_password("correct-horse", &new.password_hash));
    }

    #[test]
    fn sanitize_rejects_mismatch() {
        let err = sanitize_password(UserIn {
            username: "ana".to_owned(),
            email: None,
            password: "correct-horse".to_owned(),
            password_confirm: "battery-staple".to_owned(),
        })
        .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }
}
