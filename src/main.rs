//! SkillnScale production entry point.
//!
//! Resolves settings before any async machinery exists so the runtime can be sized from
//! `WEB_CONCURRENCY`, then hands over to the shared server startup:
//!
//! 1. `uploads/docs` is created and checked for writability
//! 2. the database pool is opened, migrations run and reference data is seeded
//! 3. the HTTP API listens on `BIND_ADDR` (default `0.0.0.0:10000`) until Ctrl-C or SIGTERM
//!
//! # Environment Variables
//! See `sns_core::config` for the full list. The ones operators usually set:
//! - `DATABASE_URL`: PostgreSQL connection string
//! - `SECRET_KEY`: token signing secret
//! - `STRIPE_SECRET_KEY`: payment gateway key; the mock default keeps payments local
//! - `WEB_CONCURRENCY`: runtime worker threads (default 4)

use anyhow::Context;
use sns_core::Settings;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    api_rest::server::init_tracing("skillnscale_run=info")?;

    let settings = Settings::from_env().context("invalid configuration")?;
    tracing::info!(
        workers = settings.web_concurrency,
        addr = %settings.bind_addr,
        "starting {}",
        settings.project_name
    );

    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(settings.web_concurrency)
        .thread_name("sns-worker")
        .enable_all()
        .build()
        .context("failed to build the async runtime")?
        .block_on(api_rest::server::run(settings))
}
