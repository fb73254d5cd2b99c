//! daelect-server: REST server for off-chain DAO proposal details.
//!
//! Configuration comes from the environment (see `daelect_server::config`).

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use daelect_server::{build_router, AppState, DatabaseManager, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,daelect_server=debug,tower_http=info".into()),
        )
        .init();

    let config = ServerConfig::from_env().context("invalid configuration")?;

    let db = DatabaseManager::new(config.database.clone())
        .await
        .context("failed to open database")?;
    db.run_migrations()
        .await
        .context("failed to apply database schema")?;

    if config.ownership.require_signature {
        info!("Detail saves require a verified owner signature");
    }
    if let Some(dir) = &config.static_dir {
        info!("Serving client build from {}", dir.display());
    }

    let state = AppState::new(db.clone(), config.ownership.clone());
    let app = build_router(state, config.static_dir.as_deref());

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;
    info!("daelect-server listening on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    db.close().await;
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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
    info!("Shutdown signal received");
}
