//! Axum-based HTTP server for the drive API.
//!
//! Provides REST endpoints for:
//! - GET `/api/state` - Current direction and speed
//! - POST `/api/operate` - Set direction and speed `{"direction": "FORWARD", "speed": 10}`
//!
//! Both fields are required on `/api/operate`. Validation failures return
//! `400` with every problem found, gateway failures return `500`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{Map, Value};
use tower_http::cors::{Any, CorsLayer};

use crate::config::WebConfig;
use crate::error::OperationError;
use crate::messages::{ApiResponse, StateResponse};

use super::shared::StateProvider;

/// Shared state handed to every handler.
pub type AppState = Arc<dyn StateProvider>;

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /api/state - Returns current vehicle state
async fn get_state(State(state): State<AppState>) -> Json<ApiResponse<StateResponse>> {
    Json(ApiResponse::ok(StateResponse::from(state.status())))
}

/// POST /api/operate - Apply a direction and speed
///
/// A body that is not a JSON object is validated like an empty one.
async fn operate(
    State(state): State<AppState>,
    body: Bytes,
) -> (StatusCode, Json<ApiResponse<StateResponse>>) {
    let raw = match serde_json::from_slice::<Value>(&body) {
        Ok(Value::Object(map)) => map,
        Ok(_) => Map::new(),
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::err(format!("invalid JSON body: {e}"))),
            );
        }
    };

    match state.operate(&raw) {
        Ok(outcome) => {
            let response = StateResponse {
                changed: Some(outcome.is_changed()),
                ..StateResponse::from(outcome.status())
            };
            (StatusCode::OK, Json(ApiResponse::ok(response)))
        }
        Err(OperationError::InvalidCommand(invalid)) => (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::errs(invalid.into_errors())),
        ),
        Err(e @ OperationError::Gateway(_)) => {
            tracing::error!(error = %e, "operate failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::err(e.to_string())),
            )
        }
    }
}

/// Fallback handler for 404
async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::err("Not found")),
    )
}

// ============================================================================
// Server Builder
// ============================================================================

/// Configuration for the web server
#[derive(Debug, Clone)]
pub struct WebServerConfig {
    /// Address to bind to
    pub addr: SocketAddr,
    /// Whether to enable CORS for all origins
    pub cors_permissive: bool,
}

impl Default for WebServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            cors_permissive: true,
        }
    }
}

impl WebServerConfig {
    /// Create a new config with the given address
    pub fn new(addr: impl Into<SocketAddr>) -> Self {
        Self {
            addr: addr.into(),
            ..Default::default()
        }
    }

    /// Set whether CORS should be permissive
    pub fn cors(mut self, permissive: bool) -> Self {
        self.cors_permissive = permissive;
        self
    }

    /// Create from shared WebConfig
    pub fn from_config(config: &WebConfig) -> Self {
        Self {
            addr: ([0, 0, 0, 0], config.port).into(),
            cors_permissive: config.cors_permissive,
        }
    }
}

/// Build the Axum router with all routes
pub fn build_router(state: AppState, config: &WebServerConfig) -> Router {
    let mut router = Router::new()
        .route("/api/state", get(get_state))
        .route("/api/operate", post(operate))
        .fallback(not_found)
        .with_state(state);

    if config.cors_permissive {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router
}

/// Start the web server
///
/// Runs until Ctrl-C.
pub async fn run_server(state: AppState, config: WebServerConfig) -> Result<(), std::io::Error> {
    let router = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "web server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        // Without a signal handler, run until the process is killed.
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down web server");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn web_server_config_default() {
        let config = WebServerConfig::default();
        assert_eq!(config.addr.port(), 8080);
        assert!(config.cors_permissive);
    }

    #[test]
    fn web_server_config_from_config() {
        let config = WebServerConfig::from_config(&WebConfig::default().with_port(3000).with_cors(false));
        assert_eq!(config.addr, SocketAddr::from(([0, 0, 0, 0], 3000)));
        assert!(!config.cors_permissive);
    }

    #[test]
    fn web_server_config_builder() {
        let config = WebServerConfig::new(([127, 0, 0, 1], 9000)).cors(false);
        assert_eq!(config.addr.to_string(), "127.0.0.1:9000");
        assert!(!config.cors_permissive);
    }
}
