// SPDX-FileCopyrightText: 2026 Cadenza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::future::Future;
use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::{
    Router,
    routing::{get, post},
};
use cadenza_agent::SessionController;
use cadenza_core::{CadenzaError, Message};
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;

/// Read-only copy of the controller as of the last finished request.
///
/// Served by `/health` and `/api/chat-history` without taking the
/// controller mutex, so both answer while a turn is in flight.
#[derive(Debug, Clone)]
pub struct ControllerView {
    pub session_id: String,
    pub history: Vec<Message>,
}

impl ControllerView {
    fn of(controller: &SessionController) -> Self {
        Self {
            session_id: controller.session().id.to_string(),
            history: controller.history().to_vec(),
        }
    }
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// The one controller every request talks to.
    pub controller: Arc<Mutex<SessionController>>,
    /// Last published view, swapped after each mutating request.
    pub view: Arc<ArcSwap<ControllerView>>,
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
}

impl GatewayState {
    pub fn new(controller: SessionController) -> Self {
        let view = Arc::new(ArcSwap::from_pointee(ControllerView::of(&controller)));
        Self {
            controller: Arc::new(Mutex::new(controller)),
            view,
            start_time: std::time::Instant::now(),
        }
    }

    /// Replaces the published view with the controller's current state.
    ///
    /// Call while still holding the controller lock.
    pub fn publish(&self, controller: &SessionController) {
        self.view.store(Arc::new(ControllerView::of(controller)));
    }
}

/// Gateway server configuration (mirrors GatewayConfig from cadenza-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

/// Builds the router with every route and layer attached.
///
/// - GET  /health
/// - GET  /api/chat-history
/// - POST /api/send-message
/// - POST /api/new-chat
/// - POST /api/stop-music
/// - POST /api/save-code
pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/api/chat-history", get(handlers::get_chat_history))
        .route("/api/send-message", post(handlers::post_send_message))
        .route("/api/new-chat", post(handlers::post_new_chat))
        .route("/api/stop-music", post(handlers::post_stop_music))
        .route("/api/save-code", post(handlers::post_save_code))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Start the gateway HTTP server and run until `shutdown` resolves.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), CadenzaError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| CadenzaError::Config(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| CadenzaError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("Gateway server stopped");
    Ok(())
}
