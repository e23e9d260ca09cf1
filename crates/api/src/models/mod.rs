//! Domain records and their wire shapes.
//!
//! Each entity has three representations:
//!
//! - the storage record (`Persona`, `Direccion`, `User`) as read from the store
//! - an input shape (`PersonaIn`, ...) deserialized from request bodies and
//!   validated into a storage input (`NewPersona`, ...)
//! - an output shape (`PersonaOut`, ...) serialized into responses
//!
//! Conversions between them are explicit, so the wire format can change
//! without touching the repositories and vice versa.

pub mod direccion;
pub mod persona;
pub mod user;

use thiserror::Error;

pub use direccion::{Direccion, DireccionIn, DireccionOut, NewDireccion};
pub use persona::{NewPersona, Persona, PersonaIn, PersonaOut};
pub use user::{NewUser, User, UserIn, UserOut};

/// Maximum length for free-text fields (names, street).
pub const MAX_TEXT_LENGTH: usize = 200;

/// An input value failed validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Name of the offending field as it appears on the wire.
    pub field: &'static str,
    /// Human-readable reason.
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Trim a required text field and check it is non-empty and not too long.
pub(crate) fn required_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    if trimmed.chars().count() > MAX_TEXT_LENGTH {
        return Err(ValidationError::new(
            field,
            format!("must be at most {MAX_TEXT_LENGTH} characters"),
        ));
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn required_text_trims() {
        assert_eq!(required_text("nombre", "  Ana ").as_deref(), Ok("Ana"));
    }

    #[test]
    fn required_text_rejects_blank() {
        let err = required_text("nombre", "   ").unwrap_err();
        assert_eq!(err.field, "nombre");
        assert_eq!(err.to_string(), "nombre: must not be empty");
    }

    #[test]
    fn required_text_rejects_long_values() {
        let long = "x".repeat(MAX_TEXT_LENGTH + 1);
        assert!(required_text("calle", &long).is_err());
    }
}
