//! Database connection management

use std::time::Duration;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use tracing::info;
use crate::config::DatabaseConfig;
use crate::utils::errors::BotError;

pub type DatabasePool = Pool<Postgres>;

const IDLE_TIMEOUT: Duration = Duration::from_secs(600);
const MAX_LIFETIME: Duration = Duration::from_secs(1800);

/// Pool options derived from the database settings
pub fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
        .idle_timeout(IDLE_TIMEOUT)
        .max_lifetime(MAX_LIFETIME)
}

/// Connect a pool and make sure the database answers
pub async fn create_pool(config: &DatabaseConfig) -> Result<DatabasePool, BotError> {
    let pool = pool_options(config).connect(&config.url).await?;
    health_check(&pool).await?;

    info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Database pool ready"
    );
    Ok(pool)
}

/// Apply the embedded `users` migrations
pub async fn run_migrations(pool: &DatabasePool) -> Result<(), BotError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}

pub async fn health_check(pool: &DatabasePool) -> Result<(), BotError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
