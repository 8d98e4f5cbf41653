//! Persistence for dashboards and live sessions.
//!
//! - [`store`] -- the row store abstraction and its backings.
//! - [`models`] -- typed views over raw rows.
//! - [`repositories`] -- scan-based lookups and writes used by the API.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod repositories;
pub mod store;

use store::{MemoryRowStore, PgRowStore, RowStore, StoreError};

pub type DbPool = sqlx::PgPool;

/// `STORAGE_URL` value selecting the in-process store.
pub const MEMORY_STORAGE_URL: &str = "memory://";

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Verify the database answers a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply the embedded schema migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Open the row store named by a storage URL.
///
/// `memory://` gives a fresh in-process store; `postgres://` and
/// `postgresql://` URLs connect, check, and migrate a PostgreSQL database.
pub async fn open_store(storage_url: &str) -> Result<Arc<dyn RowStore>, StoreError> {
    if storage_url == MEMORY_STORAGE_URL {
        tracing::warn!("Using in-memory row store; data is lost on restart");
        return Ok(Arc::new(MemoryRowStore::new()));
    }

    if !(storage_url.starts_with("postgres://") || storage_url.starts_with("postgresql://")) {
        return Err(StoreError::Unavailable(format!(
            "Unsupported storage URL scheme: {storage_url}"
        )));
    }

    let pool = create_pool(storage_url)
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;
    tracing::info!("Database connection pool created");

    health_check(&pool)
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;
    tracing::info!("Database health check passed");

    run_migrations(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Arc::new(PgRowStore::new(pool)))
}
