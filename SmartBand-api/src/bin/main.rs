use std::net::SocketAddr;
use std::path::Path;

use anyhow::Context;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use smart_band_api::api::handlers::health::initialize_server_start_time;
use smart_band_api::{create_app, AppConfig, AppState};
use smart_band_data::database::{DatabasePool, DatabaseType};

/// The main entry point for the SmartBand API server
///
/// Loads `.env`, sets up tracing, connects and migrates the database,
/// then serves the router until Ctrl+C or SIGTERM.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if dotenv().is_err() {
        eprintln!("Warning: .env file not found or couldn't be read. Using environment variables.");
    }

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(false)
            .with_ansi(true)
            .with_timer(fmt::time::uptime())
            .with_writer(std::io::stdout))
        .with(env_filter)
        .init();

    info!("Starting SmartBand API server");

    let config = AppConfig::from_env().context("invalid configuration")?;

    if config.database.db_type == DatabaseType::Sqlite {
        info!("Using SQLite database at {}", Path::new(&config.database.sqlite_path).display());
    }

    let pool = DatabasePool::connect(&config.database)
        .await
        .context("failed to initialize the database")?;
    info!("Database ready: {}", pool.connection_info());

    if !config.auth.enabled {
        warn!("AUTH_ENABLED is false: patient routes are open to unauthenticated callers");
    }

    initialize_server_start_time();

    let state = AppState::from_config(pool, &config);
    let app = create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves when Ctrl+C or (on Unix) SIGTERM arrives
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutting down server...");
}
