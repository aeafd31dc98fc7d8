//! `print-coordinator`: HTTP front end for the print job lists.

mod config;

use actors::{AuditLog, CoordinatorConfig, start_coordinator};
use api::{AppState, build_router};
use storage::{ListStore, Storage};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env()?;

    let storage = Storage::new(config.storage.clone()).await?;
    tracing::info!(backend = storage.kind_str(), "storage ready");

    let coordinator_config = CoordinatorConfig {
        keys: config.keys.clone(),
        audit: AuditLog::new(&config.log_file),
    };
    let (coordinator, actor_handle) =
        start_coordinator(ListStore::new(storage), coordinator_config).await?;

    let app = build_router(AppState::new(coordinator.clone(), config.api_key.as_str()));

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "print coordinator listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    coordinator.shutdown();
    actor_handle.await?;
    tracing::info!("print coordinator stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
