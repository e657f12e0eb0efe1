//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API on the default multi-threaded runtime.
//!
//! ## Intended use
//! Handy during development. Deployments run the workspace's `skillnscale-run` binary, which
//! pins the worker count to `WEB_CONCURRENCY`.

use sns_core::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    api_rest::server::init_tracing("api_rest=info")?;

    let settings = Settings::from_env()?;
    api_rest::server::run(settings).await
}
