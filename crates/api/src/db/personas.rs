//! Persona repository.
//!
//! Every read joins the referenced `direccion`, so callers always receive a
//! [`Persona`] with its address loaded.

use directorio_core::{DireccionId, PerfilId, PersonaId};

use super::memory::{PersonaRow, Tables};
use super::{Page, RepositoryError, StoreHandle};
use crate::models::{Direccion, NewPersona, Persona};

const CONFLICT: &str = "persona already exists";
const INVALID_DIRECCION: &str = "direccion_id does not reference an existing direccion";

/// Persona joined with its address columns.
#[derive(Debug, sqlx::FromRow)]
struct PersonaJoinRow {
    id: PersonaId,
    nombre: String,
    apellido: String,
    direccion_id: Option<DireccionId>,
    perfil_id: Option<PerfilId>,
    direccion_calle: Option<String>,
    direccion_numero: Option<i32>,
}

impl TryFrom<PersonaJoinRow> for Persona {
    type Error = RepositoryError;

    fn try_from(r: PersonaJoinRow) -> Result<Self, Self::Error> {
        let direccion = match (r.direccion_id, r.direccion_calle, r.direccion_numero) {
            (None, _, _) => None,
            (Some(id), Some(calle), Some(numero)) => Some(Direccion { id, calle, numero }),
            (Some(id), _, _) => {
                return Err(RepositoryError::DataCorruption(format!(
                    "persona {} references missing direccion {id}",
                    r.id
                )));
            }
        };

        Ok(Self {
            id: r.id,
            nombre: r.nombre,
            apellido: r.apellido,
            direccion_id: r.direccion_id,
            perfil_id: r.perfil_id,
            direccion,
        })
    }
}

fn join_direccion(tables: &Tables, row: &PersonaRow) -> Result<Persona, RepositoryError> {
    let direccion = match row.direccion_id {
        None => None,
        Some(id) => Some(tables.direcciones.get(&id).cloned().ok_or_else(|| {
            RepositoryError::DataCorruption(format!(
                "persona {} references missing direccion {id}",
                row.id
            ))
        })?),
    };

    Ok(Persona {
        id: row.id,
        nombre: row.nombre.clone(),
        apellido: row.apellido.clone(),
        direccion_id: row.direccion_id,
        perfil_id: row.perfil_id,
        direccion,
    })
}

fn check_reference(tables: &Tables, new: &NewPersona) -> Result<(), RepositoryError> {
    match new.direccion_id {
        Some(id) if !tables.direcciones.contains_key(&id) => {
            Err(RepositoryError::InvalidReference(INVALID_DIRECCION.to_owned()))
        }
        _ => Ok(()),
    }
}

/// Repository for persona storage.
pub struct PersonaRepository<'a> {
    conn: &'a mut StoreHandle,
}

impl<'a> PersonaRepository<'a> {
    /// Create a new persona repository.
    #[must_use]
    pub const fn new(conn: &'a mut StoreHandle) -> Self {
        Self { conn }
    }

    /// Get a persona by ID, with its address loaded.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the referenced address is missing.
    pub async fn get(&mut self, id: PersonaId) -> Result<Option<Persona>, RepositoryError> {
        match &mut *self.conn {
            StoreHandle::Postgres(conn) => {
                let row = sqlx::query_as::<_, PersonaJoinRow>(
                    r"
                    SELECT p.id, p.nombre, p.apellido, p.direccion_id, p.perfil_id,
                           d.calle AS direccion_calle, d.numero AS direccion_numero
                    FROM persona p
                    LEFT JOIN direccion d ON d.id = p.direccion_id
                    WHERE p.id = $1
                    ",
                )
                .bind(id)
                .fetch_optional(&mut **conn)
                .await?;

                row.map(Persona::try_from).transpose()
            }
            StoreHandle::Memory(mem) => {
                let tables = mem.lock().await;
                tables
                    .personas
                    .get(&id)
                    .map(|row| join_direccion(&tables, row))
                    .transpose()
            }
        }
    }

    /// List personas ordered by ID, with their addresses loaded.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a referenced address is missing.
    pub async fn list(&mut self, page: Page) -> Result<Vec<Persona>, RepositoryError> {
        match &mut *self.conn {
            StoreHandle::Postgres(conn) => {
                let rows = sqlx::query_as::<_, PersonaJoinRow>(
                    r"
                    SELECT p.id, p.nombre, p.apellido, p.direccion_id, p.perfil_id,
                           d.calle AS direccion_calle, d.numero AS direccion_numero
                    FROM persona p
                    LEFT JOIN direccion d ON d.id = p.direccion_id
                    ORDER BY p.id
                    OFFSET $1 LIMIT $2
                    ",
                )
                .bind(page.sql_offset())
                .bind(page.sql_limit())
                .fetch_all(&mut **conn)
                .await?;

                rows.into_iter().map(Persona::try_from).collect()
            }
            StoreHandle::Memory(mem) => {
                let tables = mem.lock().await;
                tables
                    .personas
                    .values()
                    .skip(page.skip())
                    .take(page.take())
                    .map(|row| join_direccion(&tables, row))
                    .collect()
            }
        }
    }

    /// Insert a new persona.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if `direccion_id` does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&mut self, new: &NewPersona) -> Result<Persona, RepositoryError> {
        match &mut *self.conn {
            StoreHandle::Postgres(conn) => {
                let row = sqlx::query_as::<_, PersonaJoinRow>(
                    r"
                    WITH inserted AS (
                        INSERT INTO persona (nombre, apellido, direccion_id, perfil_id)
                        VALUES ($1, $2, $3, $4)
                        RETURNING id, nombre, apellido, direccion_id, perfil_id
                    )
                    SELECT i.id, i.nombre, i.apellido, i.direccion_id, i.perfil_id,
                           d.calle AS direccion_calle, d.numero AS direccion_numero
                    FROM inserted i
                    LEFT JOIN direccion d ON d.id = i.direccion_id
                    ",
                )
                .bind(&new.nombre)
                .bind(&new.apellido)
                .bind(new.direccion_id)
                .bind(new.perfil_id)
                .fetch_one(&mut **conn)
                .await
                .map_err(|e| RepositoryError::from_write(e, CONFLICT, INVALID_DIRECCION))?;

                Persona::try_from(row)
            }
            StoreHandle::Memory(mem) => {
                let mut tables = mem.lock().await;
                check_reference(&tables, new)?;

                let row = PersonaRow {
                    id: tables.next_persona_id(),
                    nombre: new.nombre.clone(),
                    apellido: new.apellido.clone(),
                    direccion_id: new.direccion_id,
                    perfil_id: new.perfil_id,
                };
                let persona = join_direccion(&tables, &row)?;
                tables.personas.insert(row.id, row);
                Ok(persona)
            }
        }
    }

    /// Replace the fields of an existing persona.
    ///
    /// Returns `None` if no persona has the given ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if `direccion_id` does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &mut self,
        id: PersonaId,
        new: &NewPersona,
    ) -> Result<Option<Persona>, RepositoryError> {
        match &mut *self.conn {
            StoreHandle::Postgres(conn) => {
                let row = sqlx::query_as::<_, PersonaJoinRow>(
                    r"
                    WITH updated AS (
                        UPDATE persona
                        SET nombre = $2, apellido = $3, direccion_id = $4, perfil_id = $5
                        WHERE id = $1
                        RETURNING id, nombre, apellido, direccion_id, perfil_id
                    )
                    SELECT u.id, u.nombre, u.apellido, u.direccion_id, u.perfil_id,
                           d.calle AS direccion_calle, d.numero AS direccion_numero
                    FROM updated u
                    LEFT JOIN direccion d ON d.id = u.direccion_id
                    ",
                )
                .bind(id)
                .bind(&new.nombre)
                .bind(&new.apellido)
                .bind(new.direccion_id)
                .bind(new.perfil_id)
                .fetch_optional(&mut **conn)
                .await
                .map_err(|e| RepositoryError::from_write(e, CONFLICT, INVALID_DIRECCION))?;

                row.map(Persona::try_from).transpose()
            }
            StoreHandle::Memory(mem) => {
                let mut tables = mem.lock().await;
                if !tables.personas.contains_key(&id) {
                    return Ok(None);
                }
                check_reference(&tables, new)?;

                let row = PersonaRow {
                    id,
                    nombre: new.nombre.clone(),
                    apellido: new.apellido.clone(),
                    direccion_id: new.direccion_id,
                    perfil_id: new.perfil_id,
                };
                let persona = join_direccion(&tables, &row)?;
                tables.personas.insert(id, row);
                Ok(Some(persona))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::{DireccionRepository, MemoryStore};
    use crate::models::NewDireccion;

    fn new_persona(nombre: &str, direccion_id: Option<DireccionId>) -> NewPersona {
        NewPersona {
            nombre: nombre.to_owned(),
            apellido: "Garcia".to_owned(),
            direccion_id,
            perfil_id: None,
        }
    }

    async fn seed_direccion(conn: &mut StoreHandle) -> Direccion {
        DireccionRepository::new(conn)
            .create(&NewDireccion {
                calle: "Main".to_owned(),
                numero: 5,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn create_loads_direccion() {
        let mut conn = StoreHandle::Memory(MemoryStore::new());
        let direccion = seed_direccion(&mut conn).await;

        let mut repo = PersonaRepository::new(&mut conn);
        let persona = repo
            .create(&new_persona("Ana", Some(direccion.id)))
            .await
            .unwrap();

        assert_eq!(persona.id, PersonaId::new(1));
        assert_eq!(persona.direccion, Some(direccion));
        assert_eq!(repo.get(persona.id).await.unwrap(), Some(persona));
    }

    #[tokio::test]
    async fn create_without_direccion() {
        let mut conn = StoreHandle::Memory(MemoryStore::new());
        let mut repo = PersonaRepository::new(&mut conn);

        let persona = repo.create(&new_persona("Ana", None)).await.unwrap();
        assert_eq!(persona.direccion_id, None);
        assert_eq!(persona.direccion, None);
    }

    #[tokio::test]
    async fn create_with_unknown_direccion_is_rejected() {
        let mut conn = StoreHandle::Memory(MemoryStore::new());
        let mut repo = PersonaRepository::new(&mut conn);

        let err = repo
            .create(&new_persona("Ana", Some(DireccionId::new(42))))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidReference(_)));
        assert!(repo.list(Page::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_replaces_fields() {
        let mut conn = StoreHandle::Memory(MemoryStore::new());
        let direccion = seed_direccion(&mut conn).await;

        let mut repo = PersonaRepository::new(&mut conn);
        let persona = repo.create(&new_persona("Ana", None)).await.unwrap();

        let updated = repo
            .update(persona.id, &new_persona("Maria", Some(direccion.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.id, persona.id);
        assert_eq!(updated.nombre, "Maria");
        assert_eq!(updated.direccion, Some(direccion));

        let cleared = repo
            .update(persona.id, &new_persona("Maria", None))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cleared.direccion, None);
    }

    #[tokio::test]
    async fn update_missing_returns_none() {
        let mut conn = StoreHandle::Memory(MemoryStore::new());
        let mut repo = PersonaRepository::new(&mut conn);

        let result = repo
            .update(PersonaId::new(7), &new_persona("Ana", None))
            .await
            .unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn list_pages_in_id_order() {
        let mut conn = StoreHandle::Memory(MemoryStore::new());
        let mut repo = PersonaRepository::new(&mut conn);
        for name in ["A", "B", "C"] {
            repo.create(&new_persona(name, None)).await.unwrap();
        }

        let all = repo.list(Page::default()).await.unwrap();
        let names: Vec<&str> = all.iter().map(|p| p.nombre.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);

        let tail = repo.list(Page::new(2, 10)).await.unwrap();
        assert_eq!(tail.len(), 1);
        assert_eq!(tail[0].nombre, "C");
    }
}
