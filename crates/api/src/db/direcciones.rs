//! Direccion repository.

use directorio_core::DireccionId;

use super::{Page, RepositoryError, StoreHandle};
use crate::models::{Direccion, NewDireccion};

/// Repository for address storage.
pub struct DireccionRepository<'a> {
    conn: &'a mut StoreHandle,
}

impl<'a> DireccionRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(conn: &'a mut StoreHandle) -> Self {
        Self { conn }
    }

    /// Get an address by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&mut self, id: DireccionId) -> Result<Option<Direccion>, RepositoryError> {
        match &mut *self.conn {
            StoreHandle::Postgres(conn) => {
                let row = sqlx::query_as::<_, Direccion>(
                    "SELECT id, calle, numero FROM direccion WHERE id = $1",
                )
                .bind(id)
                .fetch_optional(&mut **conn)
                .await?;
                Ok(row)
            }
            StoreHandle::Memory(mem) => Ok(mem.lock().await.direcciones.get(&id).cloned()),
        }
    }

    /// List addresses ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&mut self, page: Page) -> Result<Vec<Direccion>, RepositoryError> {
        match &mut *self.conn {
            StoreHandle::Postgres(conn) => {
                let rows = sqlx::query_as::<_, Direccion>(
                    r"
                    SELECT id, calle, numero
                    FROM direccion
                    ORDER BY id
                    OFFSET $1 LIMIT $2
                    ",
                )
                .bind(page.sql_offset())
                .bind(page.sql_limit())
                .fetch_all(&mut **conn)
                .await?;
                Ok(rows)
            }
            StoreHandle::Memory(mem) => Ok(mem
                .lock()
                .await
                .direcciones
                .values()
                .skip(page.skip())
                .take(page.take())
                .cloned()
                .collect()),
        }
    }

    /// Insert a new address and return it with its assigned ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&mut self, new: &NewDireccion) -> Result<Direccion, RepositoryError> {
        match &mut *self.conn {
            StoreHandle::Postgres(conn) => {
                let row = sqlx::query_as::<_, Direccion>(
                    r"
                    INSERT INTO direccion (calle, numero)
                    VALUES ($1, $2)
                    RETURNING id, calle, numero
                    ",
                )
                .bind(&new.calle)
                .bind(new.numero)
                .fetch_one(&mut **conn)
                .await
                .map_err(|e| {
                    RepositoryError::from_write(e, "direccion already exists", "invalid direccion")
                })?;
                Ok(row)
            }
            StoreHandle::Memory(mem) => {
                let mut tables = mem.lock().await;
                let direccion = Direccion {
                    id: tables.next_direccion_id(),
                    calle: new.calle.clone(),
                    numero: new.numero,
                };
                tables.direcciones.insert(direccion.id, direccion.clone());
                Ok(direccion)
            }
        }
    }
}
