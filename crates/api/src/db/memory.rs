//! In-process store used when no database is configured.
//!
//! Mirrors the `PostgreSQL` schema: serial ids starting at 1, a unique
//! username, a unique email when present, and a foreign key from
//! `persona.direccion_id` to `direccion.id`.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use directorio_core::{DireccionId, PerfilId, PersonaId, UserId};

use crate::models::{Direccion, User};

/// Persona row as stored; the address is joined on read.
#[derive(Debug, Clone)]
pub(crate) struct PersonaRow {
    pub id: PersonaId,
    pub nombre: String,
    pub apellido: String,
    pub direccion_id: Option<DireccionId>,
    pub perfil_id: Option<PerfilId>,
}

#[derive(Debug, Default)]
pub(crate) struct Tables {
    pub direcciones: BTreeMap<DireccionId, Direccion>,
    pub personas: BTreeMap<PersonaId, PersonaRow>,
    pub users: BTreeMap<UserId, User>,
    last_direccion: i32,
    last_persona: i32,
    last_user: i32,
}

impl Tables {
    pub(crate) const fn next_direccion_id(&mut self) -> DireccionId {
        self.last_direccion += 1;
        DireccionId::new(self.last_direccion)
    }

    pub(crate) const fn next_persona_id(&mut self) -> PersonaId {
        self.last_persona += 1;
        PersonaId::new(self.last_persona)
    }

    pub(crate) const fn next_user_id(&mut self) -> UserId {
        self.last_user += 1;
        UserId::new(self.last_user)
    }
}

/// Shared in-memory tables behind an async mutex.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().await
    }
}
