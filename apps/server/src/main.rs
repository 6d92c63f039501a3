//! Todo lists server binary.

use std::net::SocketAddr;

use todo_store::{PostgresStore, SessionRegistry, StoreProvider};
use todos_server::{
    config::{Config, StorageKind},
    create_app, create_state, init_tracing,
};
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env if present
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    init_tracing(&config.log_level);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        storage = %config.storage,
        "Starting todo lists server"
    );

    match config.storage {
        StorageKind::Session => {
            let registry = match config.session_idle_timeout {
                Some(timeout) => SessionRegistry::with_idle_timeout(timeout),
                None => SessionRegistry::new(),
            };
            serve(config, registry).await
        }
        StorageKind::Database => {
            let url = config
                .database_url
                .clone()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required for database storage"))?;
            let store = PostgresStore::connect(&url, config.database_max_connections).await?;
            tracing::info!("Connected to database");
            serve(config, store).await
        }
    }
}

async fn serve<P: StoreProvider + 'static>(config: Config, provider: P) -> anyhow::Result<()> {
    let addr: SocketAddr = config.server_addr().parse()?;

    let state = create_state(config, provider);
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, shutting down");
        }
    }
}
