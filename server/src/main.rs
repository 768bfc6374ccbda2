//! Moocho API server binary.

use moocho_server::config::{Config, StoreBackend};
use moocho_server::store::{MemoryStore, RecordStore, RedisStore};
use moocho_server::AppState;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moocho_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing::info!("Starting Moocho API on {}:{}", config.host, config.port);

    let store: Arc<dyn RecordStore> = match &config.store {
        StoreBackend::Redis { url } => {
            tracing::info!("Connecting to Redis...");
            Arc::new(RedisStore::connect(url, config.redis_pool_size).await?)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    if config.identity_secret.is_none() {
        tracing::warn!("IDENTITY_SECRET is not set; the login callback is open");
    }

    let addr = format!("{}:{}", config.host, config.port);
    let app = moocho_server::app(AppState::new(store, config));

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
