use crate::config::RelayConfig;
use crate::room::RoomRegistry;
use crate::signaling::{SignalingRelay, SignalingService, ws_handler};
use anyhow::{Context, Result};
use axum::{Router, routing::get};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared by every WebSocket handler.
pub struct AppState {
    pub signaling: SignalingService,
    pub relay: SignalingRelay,
}

impl AppState {
    pub fn new() -> Self {
        let signaling = SignalingService::new();
        let relay = SignalingRelay::new(RoomRegistry::new(), Arc::new(signaling.clone()));
        Self { signaling, relay }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn router(state: Arc<AppState>, ws_path: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(ws_path, get(ws_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// A bound, not yet serving, signaling relay.
pub struct RelayServer {
    listener: TcpListener,
    state: Arc<AppState>,
    ws_path: String,
}

impl RelayServer {
    pub async fn bind(config: RelayConfig) -> Result<Self> {
        let listener = TcpListener::bind(config.bind_address)
            .await
            .with_context(|| format!("Failed to bind relay to {}", config.bind_address))?;

        Ok(Self {
            listener,
            state: Arc::new(AppState::new()),
            ws_path: config.ws_path,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("Failed to read relay listener address")
    }

    pub fn ws_path(&self) -> &str {
        &self.ws_path
    }

    pub fn state(&self) -> Arc<AppState> {
        self.state.clone()
    }

    pub async fn serve(self) -> Result<()> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.local_addr()?;
        let app = router(self.state, &self.ws_path);

        info!("Signaling relay listening on ws://{}{}", addr, self.ws_path);

        axum::serve(self.listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .context("Relay server stopped with an error")?;

        info!("Signaling relay stopped");
        Ok(())
    }
}
