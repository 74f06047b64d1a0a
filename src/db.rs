/// Database layer
///
/// Manages the SQLite connection pool and embedded migrations for the
/// durable item store.
use crate::error::{ServiceError, ServiceResult};
use sqlx::sqlite::SqlitePool;
use std::path::Path;

/// Create a SQLite connection pool
pub async fn create_pool(path: &Path) -> ServiceResult<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let pool = SqlitePool::connect_with(
        sqlx::sqlite::SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(std::time::Duration::from_secs(5)),
    )
    .await
    .map_err(ServiceError::Database)?;

    Ok(pool)
}

/// Run migrations, embedded at compile time from ./migrations
pub async fn run_migrations(pool: &SqlitePool) -> ServiceResult<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| ServiceError::Storage(format!("Migration failed: {}", e)))?;

    Ok(())
}

/// In-memory pool for tests. Capped at one connection: each connection to
/// `sqlite::memory:` would otherwise see its own empty database.
#[cfg(test)]
pub async fn memory_pool() -> SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}
