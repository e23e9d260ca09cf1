//! Persona shapes.
//!
//! Clients reference a Direccion by id and use `0` to mean "none"; that
//! sentinel never reaches the store. See [`PersonaIn::into_new`].

use serde::{Deserialize, Serialize};

use directorio_core::{DireccionId, PerfilId, PersonaId};

use super::{Direccion, DireccionOut, ValidationError, required_text};

/// A stored persona, with its referenced address loaded alongside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    pub id: PersonaId,
    pub nombre: String,
    pub apellido: String,
    pub direccion_id: Option<DireccionId>,
    pub perfil_id: Option<PerfilId>,
    pub direccion: Option<Direccion>,
}

/// Request body for creating or updating a persona.
#[derive(Debug, Clone, Deserialize)]
pub struct PersonaIn {
    pub nombre: String,
    pub apellido: String,
    #[serde(default)]
    pub direccion_id: Option<i32>,
    #[serde(default)]
    pub perfil_id: Option<i32>,
}

/// Validated storage input for a persona.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPersona {
    pub nombre: String,
    pub apellido: String,
    pub direccion_id: Option<DireccionId>,
    pub perfil_id: Option<PerfilId>,
}

impl PersonaIn {
    /// Validate the request body into a storage input.
    ///
    /// Zero-valued references are normalized to `None`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if a name is blank or too long, or if a
    /// reference is negative.
    pub fn into_new(self) -> Result<NewPersona, ValidationError> {
        let nombre = required_text("nombre", &self.nombre)?;
        let apellido = required_text("apellido", &self.apellido)?;

        if self.direccion_id.is_some_and(|id| id < 0) {
            return Err(ValidationError::new("direccion_id", "must not be negative"));
        }

        Ok(NewPersona {
            nombre,
            apellido,
            direccion_id: DireccionId::from_reference(self.direccion_id),
            perfil_id: PerfilId::from_reference(self.perfil_id),
        })
    }
}

/// Response body for a persona, with the address nested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaOut {
    pub id: PersonaId,
    pub nombre: String,
    pub apellido: String,
    pub direccion_id: Option<DireccionId>,
    pub perfil_id: Option<PerfilId>,
    pub direccion: Option<DireccionOut>,
}

impl From<Persona> for PersonaOut {
    fn from(p: Persona) -> Self {
        Self {
            id: p.id,
            nombre: p.nombre,
            apellido: p.apellido,
            direccion_id: p.direccion_id,
            perfil_id: p.perfil_id,
            direccion: p.direccion.map(DireccionOut::from),
        }
    }
}
