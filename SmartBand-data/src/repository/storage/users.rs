use rusqlite::OptionalExtension;
use tracing::debug;

use crate::database::DatabasePool;
use crate::models::user::{NewUser, User};
use crate::repository::RepositoryError;
use super::{user_from_sqlite, DatabaseStorage, USER_COLUMNS};

impl DatabaseStorage {
    /// Insert a user; a taken username is a conflict
    pub async fn create_user(pool: &DatabasePool, user: &NewUser) -> Result<User, RepositoryError> {
        debug!("Storing user in database: username={}", user.username);
        let taken = format!("username {}", user.username);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                let created = conn.query_row(
                    &format!(
                        "INSERT INTO users (username, password, email) VALUES (?1, ?2, ?3)
                         RETURNING {}",
                        USER_COLUMNS
                    ),
                    (&user.username, &user.password_hash, &user.email),
                    user_from_sqlite,
                ).map_err(|e| RepositoryError::from_sqlite_constraint(e, &taken))?;
                Ok(created)
            },

            DatabasePool::Memory(storage) => storage.create_user(user),

            #[cfg(feature = "postgres")]
            DatabasePool::PostgreSQL(pool) => {
                let client = super::pg::client(pool).await?;
                let row = client.query_one(
                    format!(
                        "INSERT INTO users (username, password, email) VALUES ($1, $2, $3)
                         RETURNING {}",
                        USER_COLUMNS
                    ).as_str(),
                    &[&user.username, &user.password_hash, &user.email],
                ).await
                .map_err(|e| RepositoryError::from_postgres_constraint(e, &taken))?;
                Ok(super::pg::user(&row))
            },
        }
    }

    /// Look a user up by login name
    pub async fn find_user(pool: &DatabasePool, username: &str) -> Result<Option<User>, RepositoryError> {
        debug!("Getting user from database: username={}", username);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                let user = conn.query_row(
                    &format!("SELECT {} FROM users WHERE username = ?1", USER_COLUMNS),
                    [username],
                    user_from_sqlite,
                ).optional()?;
                Ok(user)
            },

            DatabasePool::Memory(storage) => storage.find_user(username),

            #[cfg(feature = "postgres")]
            DatabasePool::PostgreSQL(pool) => {
                let client = super::pg::client(pool).await?;
                let row = client.query_opt(
                    format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS).as_str(),
                    &[&username],
                ).await?;
                Ok(row.as_ref().map(super::pg::user))
            },
        }
    }
}
