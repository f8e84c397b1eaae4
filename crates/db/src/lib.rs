//! PostgreSQL persistence for asset allocation.
//!
//! Repositories are thin, one per table, and speak in row models and
//! `sqlx::Error`. [`store::PgStore`] adapts them to the collaborator ports
//! defined in `assetrack_core::ports` and translates database errors into
//! [`CoreError`](assetrack_core::error::CoreError).

use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

pub mod error;
pub mod models;
pub mod repositories;
pub mod store;

pub type DbPool = sqlx::PgPool;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../db/migrations");

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to verify the pool can reach the database.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply any pending migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}
