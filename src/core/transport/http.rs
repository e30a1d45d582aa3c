//! HTTP transport implementation.
//!
//! Serves the MCP streamable HTTP protocol (rmcp) on `rpc_path`, next to a
//! couple of plain JSON endpoints for humans and load balancers:
//! - `GET /` - server and adapter info
//! - `GET /health` - liveness check

use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::{
    TransportError, TransportResult,
    config::{HttpConfig, normalize_rpc_path},
};
use crate::core::McpServer;

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

/// Static information exposed by the info endpoint.
#[derive(Clone)]
struct AppState {
    info: Arc<serde_json::Value>,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given config.
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Build the axum router for the given server.
    ///
    /// Fails if the MCP endpoint path cannot be mounted.
    pub fn router(&self, server: McpServer) -> TransportResult<Router> {
        self.config.validate()?;
        let rpc_path = normalize_rpc_path(&self.config.rpc_path);

        let state = AppState {
            info: Arc::new(serde_json::json!({
                "name": server.name(),
                "version": server.version(),
                "server": server.kind().to_string(),
                "transport": "streamable-http",
                "endpoints": {
                    "mcp": rpc_path,
                    "health": "/health"
                },
                "tools": server.tool_names(),
            })),
        };

        let mcp_service = StreamableHttpService::new(
            move || Ok(server.clone()),
            LocalSessionManager::default().into(),
            StreamableHttpServerConfig::default(),
        );

        let mut app = Router::new()
            .nest_service(&rpc_path, mcp_service)
            .route("/health", get(health_check))
            .route("/", get(root_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http());

        if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            app = app.layer(cors);
        }

        Ok(app)
    }

    /// Run the HTTP transport until Ctrl-C.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let addr = self.address();
        let app = self.router(server)?;

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        let cors_status = if self.config.enable_cors {
            "enabled"
        } else {
            "disabled"
        };
        info!(
            "Ready - listening on {} (streamable HTTP, CORS {})",
            addr, cors_status
        );
        info!("  → MCP:    {}", normalize_rpc_path(&self.config.rpc_path));
        info!("  → Health: GET /health");

        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                info!("Received Ctrl-C, shutting down HTTP transport");
            })
            .await
            .map_err(|e| TransportError::http(e.to_string()))?;

        Ok(())
    }
}

/// Root handler - provides server info.
async fn root_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.info.as_ref().clone())
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
