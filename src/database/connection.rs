//! Postgres pool setup, migrations and health check

use std::time::Duration;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use crate::config::DatabaseConfig;
use crate::utils::errors::SchoolDeskError;

pub type DatabasePool = Pool<Postgres>;

/// Zero means "no limit" for the optional pool timeouts
fn optional_duration(seconds: u64) -> Option<Duration> {
    (seconds > 0).then(|| Duration::from_secs(seconds))
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
        .idle_timeout(optional_duration(config.idle_timeout_seconds))
        .max_lifetime(optional_duration(config.max_lifetime_seconds))
}

/// Connect a pool for the configured database and verify it answers
pub async fn create_pool(config: &DatabaseConfig) -> Result<DatabasePool, SchoolDeskError> {
    let pool = pool_options(config).connect(&config.url).await?;
    health_check(&pool).await?;

    tracing::info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Database pool ready"
    );
    Ok(pool)
}

/// Apply the embedded schema migrations
pub async fn run_migrations(pool: &DatabasePool) -> Result<(), SchoolDeskError> {
    tracing::info!("Applying schema migrations");
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Schema is up to date");
    Ok(())
}

pub async fn health_check(pool: &DatabasePool) -> Result<(), SchoolDeskError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_timeouts_disable_limits() {
        assert_eq!(optional_duration(0), None);
        assert_eq!(optional_duration(600), Some(Duration::from_secs(600)));
    }

    #[test]
    fn test_pool_options_follow_settings() {
        let mut config = crate::config::Settings::default().database;
        config.max_connections = 4;
        config.acquire_timeout_seconds = 5;
        let options = pool_options(&config);
        assert_eq!(options.get_max_connections(), 4);
        assert_eq!(options.get_acquire_timeout(), Duration::from_secs(5));
        assert_eq!(options.get_idle_timeout(), Some(Duration::from_secs(600)));
    }
}
