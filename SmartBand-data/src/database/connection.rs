//! Database connection module for the SmartBand API
//!
//! This module provides database connectivity with support for multiple backends:
//! - SQLite (default)
//! - In-memory storage (tests and local demos)
//! - PostgreSQL (optional, `postgres` feature)
//!
//! The pool is built once by the process entry point and handed to every
//! repository. Nothing in this crate keeps a global handle.

use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

use super::migrations;
use crate::repository::InMemoryStorage;

/// Supported database types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    /// SQLite database (file-based)
    Sqlite,
    /// Process-local storage, lost on restart
    Memory,
    /// PostgreSQL database
    #[cfg(feature = "postgres")]
    PostgreSQL,
}

impl DatabaseType {
    /// Convert from string to database type
    pub fn parse(s: &str) -> Result<Self, DatabaseError> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(DatabaseType::Sqlite),
            "memory" | "in-memory" => Ok(DatabaseType::Memory),
            #[cfg(feature = "postgres")]
            "postgresql" | "postgres" => Ok(DatabaseType::PostgreSQL),
            _ => Err(DatabaseError::UnsupportedDatabaseType(s.to_string())),
        }
    }
}

/// Database error
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Environment variable not found
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    /// Invalid configuration value
    #[error("Database configuration error: {0}")]
    ConfigError(String),

    /// SQLite error
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),

    /// Connection pool error
    #[error("Connection pool error: {0}")]
    PoolError(#[from] r2d2::Error),

    /// PostgreSQL error
    #[cfg(feature = "postgres")]
    #[error("PostgreSQL error: {0}")]
    PostgresError(#[from] tokio_postgres::Error),

    /// Unsupported database type
    #[error("Unsupported database type: {0}")]
    UnsupportedDatabaseType(String),

    /// Migration error
    #[error("Database migration error: {0}")]
    MigrationError(String),

    /// Generic connection error
    #[error("Failed to connect to database: {0}")]
    ConnectionError(String),
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database type (sqlite, memory, postgresql)
    pub db_type: DatabaseType,
    /// Connection string for PostgreSQL
    pub connection_string: Option<String>,
    /// Path to SQLite database file
    pub sqlite_path: String,
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// Connection timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: DatabaseType::Sqlite,
            connection_string: None,
            sqlite_path: "data/smartband.db".to_string(),
            max_connections: 10,
            timeout_seconds: 30,
        }
    }
}

impl DatabaseConfig {
    /// Create a new database configuration from environment variables
    pub fn from_env() -> Result<Self, DatabaseError> {
        let defaults = Self::default();

        let db_type_str = env::var("DB_TYPE").unwrap_or_else(|_| "sqlite".to_string());
        let db_type = DatabaseType::parse(&db_type_str)?;

        let sqlite_path = env::var("DB_SQLITE_PATH").unwrap_or(defaults.sqlite_path);

        // Either a full URL or the discrete DB_HOST/DB_USER/... variables
        let connection_string = env::var("DB_CONNECTION").ok().or_else(connection_string_from_parts);

        #[cfg(feature = "postgres")]
        {
            if db_type == DatabaseType::PostgreSQL && connection_string.is_none() {
                return Err(DatabaseError::EnvVarNotFound("DB_CONNECTION or DB_HOST".to_string()));
            }
        }

        let max_connections = parse_env_or("DB_MAX_CONNECTIONS", defaults.max_connections)?;
        let timeout_seconds = parse_env_or("DB_TIMEOUT_SECONDS", defaults.timeout_seconds)?;

        if max_connections == 0 {
            return Err(DatabaseError::ConfigError("DB_MAX_CONNECTIONS must be at least 1".to_string()));
        }

        info!(
            "Database configuration: type={:?}, max_connections={}, timeout={}s",
            db_type, max_connections, timeout_seconds
        );

        Ok(DatabaseConfig {
            db_type,
            connection_string,
            sqlite_path,
            max_connections,
            timeout_seconds,
        })
    }
}

/// Build a PostgreSQL URL from DB_HOST, DB_USER, DB_PASS, DB_NAME and DB_PORT
fn connection_string_from_parts() -> Option<String> {
    let host = env::var("DB_HOST").ok()?;
    let user = env::var("DB_USER").unwrap_or_else(|_| "postgres".to_string());
    let password = env::var("DB_PASS").unwrap_or_default();
    let name = env::var("DB_NAME").unwrap_or_else(|_| "smartband".to_string());
    let port = env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string());

    Some(format!(
        "host={} port={} user={} password={} dbname={}",
        host, port, user, password, name
    ))
}

fn parse_env_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T, DatabaseError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| DatabaseError::ConfigError(format!("{} has an invalid value: {}", key, raw))),
        Err(_) => Ok(default),
    }
}

/// SQLite connection pool type
pub type SqlitePool = r2d2::Pool<r2d2_sqlite::SqliteConnectionManager>;

/// Database connection pool enum for different database types
#[derive(Clone)]
pub enum DatabasePool {
    /// SQLite connection pool
    SQLite(Arc<SqlitePool>),

    /// In-memory storage
    Memory(InMemoryStorage),

    /// PostgreSQL connection pool
    #[cfg(feature = "postgres")]
    PostgreSQL(Arc<deadpool_postgres::Pool>),
}

impl fmt::Debug for DatabasePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabasePool::SQLite(pool) => {
                let state = pool.state();
                write!(f, "DatabasePool::SQLite(connections={}, idle={})", state.connections, state.idle_connections)
            },
            DatabasePool::Memory(_) => write!(f, "DatabasePool::Memory"),
            #[cfg(feature = "postgres")]
            DatabasePool::PostgreSQL(_) => write!(f, "DatabasePool::PostgreSQL"),
        }
    }
}

impl DatabasePool {
    /// Build the pool described by `config` and run migrations against it
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        info!("Initializing database pool with type: {:?}", config.db_type);

        let pool = match config.db_type {
            DatabaseType::Sqlite => initialize_sqlite_pool(config)?,
            DatabaseType::Memory => DatabasePool::Memory(InMemoryStorage::new()),
            #[cfg(feature = "postgres")]
            DatabaseType::PostgreSQL => initialize_postgres_pool(config)?,
        };

        pool.run_migrations().await?;
        Ok(pool)
    }

    /// A migrated SQLite database that lives for as long as the pool does.
    ///
    /// The pool holds exactly one connection: every `:memory:` connection is a
    /// separate database, so a larger pool would scatter rows across them.
    pub fn sqlite_in_memory() -> Result<Self, DatabaseError> {
        let manager = r2d2_sqlite::SqliteConnectionManager::memory()
            .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));

        let pool = r2d2::Pool::builder()
            .max_size(1)
            .build(manager)?;

        let conn = pool.get()?;
        migrations::run_sqlite_migrations(&conn)?;
        drop(conn);

        Ok(DatabasePool::SQLite(Arc::new(pool)))
    }

    /// Run schema migrations for the active backend
    async fn run_migrations(&self) -> Result<(), DatabaseError> {
        info!("Running database migrations");

        match self {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                migrations::run_sqlite_migrations(&conn)?;
            },
            DatabasePool::Memory(_) => {},
            #[cfg(feature = "postgres")]
            DatabasePool::PostgreSQL(pool) => {
                let client = pool.get().await
                    .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;
                migrations::run_postgres_migrations(&client).await?;
            },
        }

        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Check that the backend answers a trivial query
    pub async fn ping(&self) -> Result<(), DatabaseError> {
        match self {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
                Ok(())
            },
            DatabasePool::Memory(_) => Ok(()),
            #[cfg(feature = "postgres")]
            DatabasePool::PostgreSQL(pool) => {
                let client = pool.get().await
                    .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;
                client.query_one("SELECT 1", &[]).await?;
                Ok(())
            },
        }
    }

    /// Human readable description of the backing store
    pub fn connection_info(&self) -> String {
        match self {
            DatabasePool::SQLite(pool) => {
                let state = pool.state();
                let location = pool.get()
                    .ok()
                    .and_then(|conn| {
                        conn.query_row("PRAGMA database_list", [], |row| row.get::<_, String>(2)).ok()
                    })
                    .map(|path| if path.is_empty() { ":memory:".to_string() } else { path })
                    .unwrap_or_else(|| "unknown path".to_string());

                format!(
                    "SQLite database at {} (connections: active={}, idle={})",
                    location, state.connections, state.idle_connections
                )
            },
            DatabasePool::Memory(_) => "In-memory storage".to_string(),
            #[cfg(feature = "postgres")]
            DatabasePool::PostgreSQL(pool) => {
                let status = pool.status();
                format!("PostgreSQL database (size={}, available={})", status.size, status.available)
            },
        }
    }
}

/// Initialize SQLite connection pool
fn initialize_sqlite_pool(config: &DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    use rusqlite::OpenFlags;
    use std::fs;
    use std::path::Path;

    info!("Initializing SQLite database at: {}", config.sqlite_path);

    if let Some(parent) = Path::new(&config.sqlite_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            info!("Creating parent directory: {:?}", parent);
            fs::create_dir_all(parent).map_err(|e| {
                error!("Failed to create directory {:?}: {}", parent, e);
                DatabaseError::ConnectionError(format!("cannot create {:?}: {}", parent, e))
            })?;
        }
    }

    let manager = r2d2_sqlite::SqliteConnectionManager::file(&config.sqlite_path)
        .with_flags(OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE)
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));

    let pool = r2d2::Pool::builder()
        .max_size(config.max_connections)
        .connection_timeout(Duration::from_secs(config.timeout_seconds))
        .build(manager)
        .map_err(|e| {
            error!("Failed to create SQLite connection pool: {}", e);
            DatabaseError::PoolError(e)
        })?;

    info!("SQLite connection pool created successfully");
    Ok(DatabasePool::SQLite(Arc::new(pool)))
}

/// Initialize PostgreSQL connection pool
#[cfg(feature = "postgres")]
fn initialize_postgres_pool(config: &DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
    use std::str::FromStr;

    let connection_string = config.connection_string
        .as_ref()
        .ok_or_else(|| DatabaseError::EnvVarNotFound("DB_CONNECTION".to_string()))?;

    let pg_config = tokio_postgres::Config::from_str(connection_string)
        .map_err(|e| DatabaseError::ConfigError(format!("Invalid PostgreSQL connection string: {}", e)))?;

    let manager = Manager::from_config(
        pg_config,
        tokio_postgres::NoTls,
        ManagerConfig { recycling_method: RecyclingMethod::Fast },
    );

    let pool = Pool::builder(manager)
        .max_size(config.max_connections as usize)
        .build()
        .map_err(|e| DatabaseError::ConnectionError(format!("Failed to create PostgreSQL pool: {}", e)))?;

    info!("PostgreSQL connection pool created successfully");
    Ok(DatabasePool::PostgreSQL(Arc::new(pool)))
}
