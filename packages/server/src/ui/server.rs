//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use super::{
    handler::{
        get_session, get_statistics, health_check, list_clients, list_sessions, record_shot,
        start_session, stop_session, websocket_handler,
    },
    state::AppState,
};

/// Build the axum router for the hub WebSocket and the control API.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // WebSocket エンドポイント
        .route("/ws", get(websocket_handler))
        // HTTP エンドポイント
        .route("/api/health", get(health_check))
        .route("/api/sessions", get(list_sessions))
        .route("/api/sessions/{session_id}", get(get_session))
        .route("/api/sessions/{session_id}/start", post(start_session))
        .route("/api/sessions/{session_id}/stop", post(stop_session))
        .route("/api/sessions/{session_id}/shots", post(record_shot))
        .route("/api/sessions/{session_id}/statistics", get(get_statistics))
        .route("/api/clients", get(list_clients))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// HTTP / WebSocket server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(app_state);
/// server.run("127.0.0.1".to_string(), 8080, shutdown_signal()).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Serve until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run<F>(
        self,
        host: String,
        port: u16,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = router(self.state);

        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!("Rangeline server listening on {}", listener.local_addr()?);
        tracing::info!("Hub clients connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");

        Ok(())
    }
}
