//! PostgreSQL pool for the loan store
//!
//! The server opens one pool at boot, applies the schema in `migrations/`
//! (clients, loans, loan collections, users) and checks it once before
//! accepting requests. Repositories in [`crate::repository::PgStore`] share
//! the pool.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::config::Config;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Failed to connect to database: {0}")]
    ConnectionError(String),

    #[error("Failed to run migrations: {0}")]
    MigrationError(String),

    #[error("Database health check failed: {0}")]
    HealthCheckError(String),
}

pub async fn create_pool(config: &Config) -> Result<PgPool, DbError> {
    tracing::info!(
        url = %config.database_url_masked(),
        max_connections = config.db_max_connections,
        "Connecting to loan store"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(600))
        .connect(&config.database_url)
        .await
        .map_err(|e| DbError::ConnectionError(e.to_string()))?;


    Ok(pool)
}

/// Apply the embedded schema migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    let migrator = sqlx::migrate!("./migrations");

    migrator
        .run(pool)
        .await
        .map_err(|e| DbError::MigrationError(e.to_string()))?;

    tracing::info!(migrations = migrator.iter().count(), "Schema up to date");

    Ok(())
}

/// Probe the migrated schema; returns how many API users exist
pub async fn check_health(pool: &PgPool) -> Result<i64, DbError> {
    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
        .map_err(|e| DbError::HealthCheckError(e.to_string()))?;

    Ok(users)
}
