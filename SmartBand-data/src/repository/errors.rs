use std::sync::PoisonError;
use thiserror::Error;
use crate::database::DatabaseError;

/// Error type for repository operations
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// PostgreSQL error
    #[cfg(feature = "postgres")]
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// Lock error
    #[error("Lock error: {0}")]
    Lock(String),

    /// A row the operation depends on does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint was violated
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl<T> From<PoisonError<T>> for RepositoryError {
    fn from(error: PoisonError<T>) -> Self {
        RepositoryError::Lock(error.to_string())
    }
}

impl RepositoryError {
    /// Map a SQLite constraint failure onto the repository vocabulary
    pub(crate) fn from_sqlite_constraint(error: rusqlite::Error, what: &str) -> Self {
        match &error {
            rusqlite::Error::SqliteFailure(failure, _)
                if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY {
                    RepositoryError::NotFound(what.to_string())
                } else {
                    RepositoryError::Conflict(what.to_string())
                }
            }
            _ => RepositoryError::Sqlite(error),
        }
    }
}

#[cfg(feature = "postgres")]
impl RepositoryError {
    /// Map a PostgreSQL constraint failure onto the repository vocabulary
    pub(crate) fn from_postgres_constraint(error: tokio_postgres::Error, what: &str) -> Self {
        use tokio_postgres::error::SqlState;

        match error.code() {
            Some(code) if *code == SqlState::FOREIGN_KEY_VIOLATION => {
                RepositoryError::NotFound(what.to_string())
            }
            Some(code) if *code == SqlState::UNIQUE_VIOLATION => {
                RepositoryError::Conflict(what.to_string())
            }
            _ => RepositoryError::Postgres(error),
        }
    }
}
