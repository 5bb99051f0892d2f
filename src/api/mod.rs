//! HTTP API server for the parley gateway

pub mod chat;
pub mod health;
pub mod token;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::ai::AiBackend;
use crate::config::{Config, LiveKitConfig};
use crate::room::RoomBackend;
use crate::{Error, Result};

/// Shared state for API handlers
pub struct ApiState {
    /// AI provider used by the relay endpoint; `None` when no key is set
    pub ai: Option<Arc<dyn AiBackend>>,

    /// LiveKit credentials for token minting
    pub livekit: LiveKitConfig,

    /// Room service backend for best-effort room creation
    pub room_backend: Option<Arc<dyn RoomBackend>>,
}

impl ApiState {
    /// Assemble state from configuration and pre-built backends
    #[must_use]
    pub fn new(
        config: &Config,
        ai: Option<Arc<dyn AiBackend>>,
        room_backend: Option<Arc<dyn RoomBackend>>,
    ) -> Self {
        Self {
            ai,
            livekit: config.livekit.clone(),
            room_backend,
        }
    }
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
}

impl ApiServer {
    /// Create a server for the given state and port
    #[must_use]
    pub fn new(state: Arc<ApiState>, port: u16) -> Self {
        Self { state, port }
    }

    /// Build the router with all routes
    #[must_use]
    pub fn router(state: Arc<ApiState>) -> Router {
        let router = Router::new()
            .merge(chat::router(state.clone()))
            .merge(token::router(state.clone()))
            .merge(health::router())
            .merge(health::status_router(state));

        // CORS for browser frontends
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        router.layer(cors).layer(TraceLayer::new_for_http())
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if the server fails to bind or serve
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(port = self.port, "API server listening");

        axum::serve(listener, Self::router(self.state))
            .await
            .map_err(|e| Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }

    /// Run the API server in a background task
    #[must_use]
    pub fn spawn(self) -> tokio::task::JoinHandle<Result<()>> {
        tokio::spawn(async move { self.run().await })
    }
}
