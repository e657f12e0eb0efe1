//! PostgreSQL connection pool and embedded schema migrations.

use crate::config::Settings;
use crate::CoreResult;
use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// Migrations compiled into the binary from `crates/core/migrations`.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

fn pool_options(settings: &Settings) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(settings.max_connections())
        .acquire_timeout(Duration::from_secs(30))
}

/// Open a pool and verify the database is reachable.
pub async fn connect(settings: &Settings) -> CoreResult<PgPool> {
    let pool = pool_options(settings)
        .connect(&settings.database_url)
        .await?;
    tracing::info!(
        max_connections = settings.max_connections(),
        "database pool ready"
    );
    Ok(pool)
}

/// Build a pool that connects on first use.
pub fn connect_lazy(settings: &Settings) -> CoreResult<PgPool> {
    Ok(pool_options(settings).connect_lazy(&settings.database_url)?)
}

pub async fn run_migrations(pool: &PgPool) -> CoreResult<()> {
    MIGRATOR.run(pool).await?;
    tracing::info!("database migrations applied");
    Ok(())
}

/// Drop every table and recreate the schema from migrations.
pub async fn reset(pool: &PgPool) -> CoreResult<()> {
    tracing::warn!("dropping public schema");
    sqlx::query("DROP SCHEMA IF EXISTS public CASCADE")
        .execute(pool)
        .await?;
    sqlx::query("CREATE SCHEMA public").execute(pool).await?;
    run_migrations(pool).await
}
