// Schema migrations, one module per backend

mod sqlite;
pub use sqlite::run_migrations as run_sqlite_migrations;

#[cfg(feature = "postgres")]
mod postgres;
#[cfg(feature = "postgres")]
pub use postgres::run_migrations as run_postgres_migrations;
