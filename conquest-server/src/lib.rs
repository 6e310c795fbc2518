//! CONQUEST Server - multiplayer synchronization engine
//!
//! This crate provides the server-authoritative backend:
//! - Session registry with single-writer-per-session action dispatch
//! - Broadcast gateway (per-session pub/sub to connected clients)
//! - Durable snapshot persistence with restore-on-lookup
//! - Typed wire protocol over a WebSocket endpoint
//!
//! Clients submit actions; the server validates against `conquest-core`,
//! persists, and broadcasts the canonical state so every client converges
//! without trusting any of them.

mod routes;
mod state;

pub mod broadcast;
pub mod persistence;
pub mod protocol;
pub mod registry;

use axum::{routing::get, Router};
use persistence::{JsonDirStore, MemoryStore, PersistencePolicy, SnapshotStore};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;

pub use state::ServerState;

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub static_dir: String,
    /// Snapshot directory; in-memory persistence when absent
    pub data_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8100,
            static_dir: "client".to_string(),
            data_dir: None,
        }
    }
}

/// Create the router with all routes
pub fn create_router(config: &ServerConfig, state: Arc<ServerState>) -> Router {
    let static_service = ServeDir::new(&config.static_dir);

    Router::new()
        // Status endpoint
        .route("/api/status", get(routes::status::status_handler))
        // Game protocol
        .route("/ws", get(routes::ws::ws_handler))
        // Shared state
        .with_state(state)
        // Static file serving (must be last)
        .fallback_service(static_service)
}

/// Build the snapshot store the configuration asks for.
pub fn create_store(config: &ServerConfig) -> anyhow::Result<Arc<dyn SnapshotStore>> {
    match &config.data_dir {
        Some(dir) => Ok(Arc::new(JsonDirStore::new(dir.clone())?)),
        None => Ok(Arc::new(MemoryStore::new())),
    }
}

/// Start the HTTP server
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let store = create_store(&config)?;
    let state = Arc::new(ServerState::new(store, PersistencePolicy::FailAction));
    let router = create_router(&config, state);

    tracing::info!("CONQUEST server starting on http://0.0.0.0:{}", config.port);
    tracing::info!("Static files served from: {}", config.static_dir);
    match &config.data_dir {
        Some(dir) => tracing::info!("Snapshots persisted to: {}", dir.display()),
        None => tracing::info!("Snapshots held in memory only"),
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
