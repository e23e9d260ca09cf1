//! Direccion (postal address) shapes.

use serde::{Deserialize, Serialize};

use directorio_core::DireccionId;

use super::{ValidationError, required_text};

/// A stored address.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Direccion {
    pub id: DireccionId,
    pub calle: String,
    pub numero: i32,
}

/// Request body for creating an address.
#[derive(Debug, Clone, Deserialize)]
pub struct DireccionIn {
    pub calle: String,
    pub numero: i32,
}

/// Validated storage input for an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDireccion {
    pub calle: String,
    pub numero: i32,
}

impl DireccionIn {
    /// Validate the request body into a storage input.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if `calle` is blank or too long, or if
    /// `numero` is negative.
    pub fn into_new(self) -> Result<NewDireccion, ValidationError> {
        let calle = required_text("calle", &self.calle)?;
        if self.numero < 0 {
            return Err(ValidationError::new("numero", "must not be negative"));
        }
        Ok(NewDireccion {
            calle,
            numero: self.numero,
        })
    }
}

/// Response body for an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DireccionOut {
    pub id: DireccionId,
    pub calle: String,
    pub numero: i32,
}

impl From<Direccion> for DireccionOut {
    fn from(d: Direccion) -> Self {
        Self {
            id: d.id,
            calle: d.calle,
            numero: d.numero,
        }
    }
}
