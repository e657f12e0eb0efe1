//! Process startup shared by the server binaries.

use anyhow::Context;
use sns_core::constants::UPLOAD_DOCS_SUBDIR;
use sns_core::{db, seed, Settings};
use sns_files::{provision_dir, UploadStore};
use tokio::net::TcpListener;

use crate::{build_router, AppState, UPLOADS_MOUNT};

/// Installs the global tracing subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing(default_directive: &str) -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_directive.parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .context("failed to install tracing subscriber")?;
    Ok(())
}

/// Provisions storage and the database, then serves until a shutdown signal arrives.
///
/// # Errors
///
/// Fails when the upload directory cannot be created or written, the database is unreachable,
/// migrations or seeding fail, or the listen address cannot be bound.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let docs_dir = settings.upload_docs_dir();
    let docs_dir = provision_dir(&docs_dir)
        .with_context(|| format!("upload directory {} is not usable", docs_dir.display()))?;
    let uploads = UploadStore::new(&docs_dir, &format!("{UPLOADS_MOUNT}/{UPLOAD_DOCS_SUBDIR}"))?;
    tracing::info!(dir = %docs_dir.display(), "upload directory ready");

    if !settings.backend_cors_origins.is_empty() {
        tracing::info!(origins = ?settings.backend_cors_origins, "CORS allows every origin");
    }
    if settings.uses_mock_payments() {
        tracing::warn!("using the mock payment gateway");
    }

    let pool = db::connect(&settings)
        .await
        .context("failed to connect to the database")?;
    db::run_migrations(&pool)
        .await
        .context("failed to run database migrations")?;
    let report = seed::seed(&pool).await.context("failed to seed reference data")?;
    tracing::info!(
        categories = report.categories,
        users = report.users,
        slots = report.slots,
        "seed data applied"
    );

    let addr = settings.bind_addr;
    let state = AppState::new(settings, pool.clone(), uploads)?;
    let app = build_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("++ Starting SkillnScale REST on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    pool.close().await;
    tracing::info!("-- SkillnScale REST stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
