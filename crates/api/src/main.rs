use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use salereg_actor::{LockRegistry, MemoryLockStorage};
use salereg_api::config::{LockBackend, ServerConfig};
use salereg_api::router::build_app_router;
use salereg_api::state::AppState;
use salereg_core::lock::LockStorage;
use salereg_db::{PgLockStorage, PgSaleStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "salereg_api=debug,salereg_core=debug,salereg_actor=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env()?;
    tracing::info!(
        host = %config.host,
        port = %config.port,
        lock_scope = %config.lock_scope,
        lock_backend = ?config.lock_backend,
        "Loaded server configuration"
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = salereg_db::create_pool(&database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connection pool created");

    salereg_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    tracing::info!("Database health check passed");

    salereg_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    // --- Lock actors ---
    let lock_storage: Arc<dyn LockStorage> = match config.lock_backend {
        LockBackend::Postgres => Arc::new(PgLockStorage::new(pool.clone())),
        LockBackend::Memory => {
            tracing::warn!("Using in-memory lock storage; locks will not survive a restart");
            Arc::new(MemoryLockStorage::new())
        }
    };
    let locks = Arc::new(LockRegistry::with_capacity(
        lock_storage,
        config.actor_mailbox_capacity,
    ));

    // --- App state ---
    let sales = Arc::new(PgSaleStore::new(pool.clone()));
    let state = AppState::new(pool, config.clone(), Arc::clone(&locks), sales);

    // --- Router ---
    let app = build_app_router(state, &config)?;

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().context("Invalid HOST address")?,
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, draining lock actors");
    if tokio::time::timeout(
        Duration::from_secs(config.shutdown_timeout_secs),
        locks.shutdown(),
    )
    .await
    .is_err()
    {
        tracing::warn!("Lock registry did not shut down within the timeout");
    }

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
