//! PostgreSQL persistence for the ELS annotation backend.
//!
//! Follows the repository pattern: zero-sized repo structs with async
//! methods over `&PgPool`. [`PgProgressStore`] adapts the repo to the
//! `els_core::ProgressStore` trait the engine is built against.

pub mod models;
pub mod repositories;
pub mod store;

pub use store::PgProgressStore;

use sqlx::postgres::PgPoolOptions;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Cheap connectivity probe.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply any pending migrations from `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!().run(pool).await
}
