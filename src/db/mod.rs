//! Database layer for Aristosys.
//!
//! Provides SQLite connection pooling and query modules
//! for clients, saved job descriptions and screening reports.

mod clients;
mod jobs;
mod pool;
mod reports;

// Re-export all query modules
pub use clients::*;
pub use jobs::*;
pub use pool::{create_pool_with_config, health_check, PoolConfig};
pub use reports::*;

use crate::{Error, Result};
use tracing::info;

/// Type alias for the SQLite connection pool.
pub type DbPool = sqlx::SqlitePool;

/// Initialize the database connection pool.
///
/// Creates parent directories if needed and configures SQLite with
/// WAL journaling, foreign keys and a busy timeout. `:memory:` gets a
/// single long-lived connection.
pub async fn init_pool(path: &str) -> Result<DbPool> {
    let pool = create_pool_with_config(path, PoolConfig::for_path(path)).await?;

    info!("Database pool initialized: {}", path);

    Ok(pool)
}

/// Initialize the database schema.
///
/// Applies the complete schema from schema.sql. Uses IF NOT EXISTS
/// clauses so it's safe to run multiple times.
pub async fn initialize_schema(pool: &DbPool) -> Result<()> {
    let schema = include_str!("../../schema.sql");

    info!("Initializing database schema");

    // Split by semicolons and execute each statement
    for statement in schema.split(';') {
        // Strip comment lines, keeping only actual SQL
        let clean_stmt: String = statement
            .lines()
            .filter(|line| !line.trim().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n");
        let clean_stmt = clean_stmt.trim();
        if clean_stmt.is_empty() {
            continue;
        }
        sqlx::query(clean_stmt).execute(pool).await?;
    }

    info!("Database schema initialized successfully");

    Ok(())
}

/// Map an insert failure, turning a dangling reference into a client error.
pub(crate) fn map_insert_error(err: sqlx::Error, what: &str) -> Error {
    match err {
        sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
            Error::InvalidInput(format!("{} references an unknown record", what))
        }
        _ => Error::Database(err),
    }
}

#[cfg(test)]
pub(crate) async fn setup_test_db() -> DbPool {
    let pool = init_pool(":memory:").await.unwrap();
    initialize_schema(&pool).await.unwrap();
    pool
}
