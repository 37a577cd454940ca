//! PostgreSQL persistence for the Orta Novias backend.
//!
//! Models live in [`models`], queries in [`repositories`]. Schema changes
//! are plain SQL files under `db/migrations/` at the workspace root.

use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod repositories;

pub type DbPool = sqlx::PgPool;

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

/// Apply any pending migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}

/// Server-side figures reported by the monitoring endpoints.
#[derive(Debug, Clone, Default, sqlx::FromRow, serde::Serialize)]
pub struct DatabaseStats {
    /// Backends connected to the current database.
    pub active_connections: i64,
    pub size_bytes: i64,
}

/// Connection count and on-disk size of the current database.
pub async fn database_stats(pool: &DbPool) -> Result<DatabaseStats, sqlx::Error> {
    sqlx::query_as::<_, DatabaseStats>(
        "SELECT \
            (SELECT COUNT(*) FROM pg_stat_activity WHERE datname = current_database()) \
                AS active_connections, \
            pg_database_size(current_database()) AS size_bytes",
    )
    .fetch_one(pool)
    .await
}
