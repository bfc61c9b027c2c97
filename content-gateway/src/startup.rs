//! Application startup and lifecycle management.

use crate::config::GatewayConfig;
use crate::handlers;
use crate::models::SessionStore;
use crate::ratelimit::SessionGate;
use crate::services::providers::http::{HttpOriginalitySearcher, HttpTextGenerator};
use crate::services::providers::{OriginalitySearcher, TextGenerator};
use axum::{
    routing::{get, post},
    Router,
};
use gateway_core::error::AppError;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: GatewayConfig,
    pub sessions: SessionStore,
    pub gate: SessionGate,
    pub generator: Arc<dyn TextGenerator>,
    pub searcher: Arc<dyn OriginalitySearcher>,
}

/// Build the HTTP router for the gateway.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/generate", post(handlers::content::generate))
        .route("/regenerate", post(handlers::content::regenerate))
        .route("/originality", post(handlers::content::originality))
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: GatewayConfig) -> Result<Self, AppError> {
        let generator: Arc<dyn TextGenerator> =
            Arc::new(HttpTextGenerator::new(&config.upstream));
        let searcher: Arc<dyn OriginalitySearcher> =
            Arc::new(HttpOriginalitySearcher::new(&config.upstream));

        tracing::info!(
            generation_url = %config.upstream.generation_url,
            search_url = %config.upstream.search_url,
            "Initialized upstream clients"
        );

        let gate = SessionGate::from_secs(
            config.rate_limit.threshold,
            config.rate_limit.cooldown_secs,
        );

        let state = AppState {
            config: config.clone(),
            sessions: SessionStore::new(),
            gate,
            generator,
            searcher,
        };

        // Bind listener (port 0 = random port for testing)
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Content gateway listening on port {}", port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);
        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
