use std::sync::Arc;

use cinema_vault::{
    api::{create_router, AppState},
    config::{Config, StorageBackend},
    db::{create_redis_client, FileStore, KeyValueStore, MemoryStore, RedisStore},
    services::{MovieProvider, OmdbProvider},
};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn open_storage(config: &Config) -> anyhow::Result<Arc<dyn KeyValueStore>> {
    let storage: Arc<dyn KeyValueStore> = match config.storage_backend {
        StorageBackend::File => Arc::new(FileStore::new(&config.storage_path)),
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::Redis => Arc::new(RedisStore::new(create_redis_client(&config.redis_url)?)),
    };
    tracing::info!(backend = storage.name(), "Durable store ready");
    Ok(storage)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env()?;
    let storage = open_storage(&config)?;
    let provider: Arc<dyn MovieProvider> = Arc::new(OmdbProvider::new(
        config.omdb_api_key.clone(),
        config.omdb_api_url.clone(),
    ));

    // Initialize application state
    let state = tokio::task::spawn_blocking(move || AppState::new(provider, storage)).await?;

    // Create the router with all routes
    let app = create_router(state.clone());

    // Start the server
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server running");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Writes held back by a failing backend get one last attempt
    if let Err(e) = state.flush().await {
        tracing::error!(error = %e, "Unsaved changes lost on shutdown");
    }

    Ok(())
}
