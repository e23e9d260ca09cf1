//! User repository for database operations.

use chrono::Utc;

use directorio_core::Username;

use super::{RepositoryError, StoreHandle};
use crate::models::{NewUser, User};

/// Repository for user database operations.
pub struct UserRepository<'a> {
    conn: &'a mut StoreHandle,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(conn: &'a mut StoreHandle) -> Self {
        Self { conn }
    }

    /// Get a user by their username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_username(
        &mut self,
        username: &Username,
    ) -> Result<Option<User>, RepositoryError> {
        match &mut *self.conn {
            StoreHandle::Postgres(conn) => {
                let user = sqlx::query_as::<_, User>(
                    r"
                    SELECT id, username, email, password_hash, created_at
                    FROM app_user
                    WHERE username = $1
                    ",
                )
                .bind(username)
                .fetch_optional(&mut **conn)
                .await?;
                Ok(user)
            }
            StoreHandle::Memory(mem) => Ok(mem
                .lock()
                .await
                .users
                .values()
                .find(|u| &u.username == username)
                .cloned()),
        }
    }

    /// Create a new user with an already hashed password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username or email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&mut self, new: &NewUser) -> Result<User, RepositoryError> {
        match &mut *self.conn {
            StoreHandle::Postgres(conn) => {
                let user = sqlx::query_as::<_, User>(
                    r"
                    INSERT INTO app_user (username, email, password_hash)
                    VALUES ($1, $2, $3)
                    RETURNING id, username, email, password_hash, created_at
                    ",
                )
                .bind(&new.username)
                .bind(new.email.as_deref())
                .bind(&new.password_hash)
                .fetch_one(&mut **conn)
                .await
                .map_err(|e| RepositoryError::from_write(e, "user already exists", "invalid user"))?;
                Ok(user)
            }
            StoreHandle::Memory(mem) => {
                let mut tables = mem.lock().await;
                let taken = tables.users.values().any(|u| {
                    u.username == new.username
                        || (new.email.is_some() && u.email == new.email)
                });
                if taken {
                    return Err(RepositoryError::Conflict("user already exists".to_owned()));
                }

                let user = User {
                    id: tables.next_user_id(),
                    username: new.username.clone(),
                    email: new.email.clone(),
                    password_hash: new.password_hash.clone(),
                    created_at: Utc::now(),
                };
                tables.users.insert(user.id, user.clone());
                Ok(user)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use directorio_core::UserId;

    use super::*;
    use crate::db::MemoryStore;

    fn new_user(username: &str, email: Option<&str>) -> NewUser {
        NewUser {
            username: Username::parse(username).unwrap(),
            email: email.map(str::to_owned),
            password_hash: "hash".to_owned(),
        }
    }

    #[tokio::test]
    async fn create_then_lookup() {
        let mut conn = StoreHandle::Memory(MemoryStore::new());
        let mut repo = UserRepository::new(&mut conn);

        let user = repo.create(&new_user("ana", None)).await.unwrap();
        assert_eq!(user.id, UserId::new(1));

        let by_name = repo.get_by_username(&user.username).await.unwrap();
        assert_eq!(by_name, Some(user));

        let missing = Username::parse("nobody").unwrap();
        assert_eq!(repo.get_by_username(&missing).await.unwrap(), None);
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let mut conn = StoreHandle::Memory(MemoryStore::new());
        let mut repo = UserRepository::new(&mut conn);

        repo.create(&new_user("ana", None)).await.unwrap();
        let err = repo.create(&new_user("ana", None)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let mut conn = StoreHandle::Memory(MemoryStore::new());
        let mut repo = UserRepository::new(&mut conn);

        repo.create(&new_user("ana", Some("a@example.com")))
            .await
            .unwrap();
        let err = repo
            .create(&new_user("maria", Some("a@example.com")))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        // Accounts without email never collide on it.
        repo.create(&new_user("luis", None)).await.unwrap();
        repo.create(&new_user("eva", None)).await.unwrap();
    }
}
