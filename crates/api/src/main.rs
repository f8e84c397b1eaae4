use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use assetrack_api::config::{database_url, ConfigError, ServerConfig};
use assetrack_api::router::build_app_router;
use assetrack_api::state::AppState;
use assetrack_events::{EventBus, SideEffectWriter};

/// Failures that abort startup.
#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to run database migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid HOST address: {0}")]
    AddrParse(#[from] std::net::AddrParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "assetrack_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env()?;
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = database_url()?;

    let pool = assetrack_db::create_pool(&database_url).await?;
    tracing::info!("Database connection pool created");

    assetrack_db::health_check(&pool).await?;
    tracing::info!("Database health check passed");

    assetrack_db::run_migrations(&pool).await?;
    tracing::info!("Database migrations applied");

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());

    // Spawn the side-effect writer (service logs and notifications).
    let writer_handle = tokio::spawn(SideEffectWriter::run(pool.clone(), event_bus.subscribe()));
    tracing::info!("Side-effect writer started");

    // --- App state + router ---
    let shutdown_timeout = Duration::from_secs(config.shutdown_timeout_secs);
    let addr = SocketAddr::new(config.host.parse::<IpAddr>()?, config.port);
    let state = AppState::new(pool, config, Arc::clone(&event_bus));
    let app = build_app_router(state);

    // --- Start server ---
    tracing::info!(%addr, "Starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // The router (and every sender it holds) is gone; dropping the last
    // handle closes the channel so the writer drains and exits.
    drop(event_bus);
    if tokio::time::timeout(shutdown_timeout, writer_handle)
        .await
        .is_err()
    {
        tracing::warn!("Side-effect writer did not finish before the shutdown timeout");
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
