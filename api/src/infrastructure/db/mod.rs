use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::bootstrap::config::Config;

pub type PgPool = sqlx::PgPool;

/// Startup fails fast when Postgres does not answer within this window.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

pub mod repositories;

fn pool_options(cfg: &Config) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(cfg.database_max_connections.max(1))
        .acquire_timeout(ACQUIRE_TIMEOUT)
}

pub async fn connect_pool(cfg: &Config) -> anyhow::Result<PgPool> {
    let pool = pool_options(cfg)
        .connect(&cfg.database_url)
        .await
        .context("failed to connect to the users database")?;
    tracing::info!(
        max_connections = cfg.database_max_connections,
        "database_pool_ready"
    );
    Ok(pool)
}

/// Applies the users and token blacklist tables embedded from `./migrations`.
pub async fn migrate(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("failed to apply database migrations")?;
    tracing::info!("database_migrations_applied");
    Ok(())
}
