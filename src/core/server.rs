//! MCP Server implementation and lifecycle management.
//!
//! One [`McpServer`] serves exactly one adapter. The tool router is built once
//! at startup by `domains/tools/router.rs`; tool calls are dispatched by the
//! `#[tool_handler]` macro.

use rmcp::{ServerHandler, handler::server::tool::ToolRouter, model::*, tool_handler};
use std::sync::Arc;
use tracing::info;

use super::config::Config;
use super::error::Result as CoreResult;
use crate::domains::tools::{ServerKind, build_tool_router};

/// The main MCP server handler.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Adapter served by this instance.
    kind: ServerKind,

    /// Tool router for handling tool calls.
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    /// Create the server for `kind`.
    ///
    /// Fails if the adapter's configuration is incomplete, or if its tools
    /// cannot be generated.
    pub async fn for_server(config: Config, kind: ServerKind) -> CoreResult<Self> {
        let tool_router = build_tool_router::<Self>(kind, &config).await?;
        Ok(Self::with_router(config, kind, tool_router))
    }

    /// Create a server around an already-built router.
    pub fn with_router(config: Config, kind: ServerKind, tool_router: ToolRouter<Self>) -> Self {
        info!(
            "Server '{}' ready with {} tool(s)",
            kind,
            tool_router.list_all().len()
        );
        Self {
            config: Arc::new(config),
            kind,
            tool_router,
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Adapter served by this instance.
    pub fn kind(&self) -> ServerKind {
        self.kind
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Every tool exposed by this server.
    pub fn list_tools(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }

    /// Names of the exposed tools.
    pub fn tool_names(&self) -> Vec<String> {
        self.list_tools()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect()
    }
}

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(self.kind.instructions().to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.config.server.name.clone(),
                version: self.config.server.version.clone(),
                ..Implementation::from_build_env()
            },
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SkyvernConfig;
    use crate::domains::tools::definitions::skyvern::{self, SkyvernClient};

    fn configured() -> Config {
        let mut config = Config::default();
        config.server.name = "skyvern-test".to_string();
        config.skyvern = SkyvernConfig {
            base_url: Some("http://localhost:8000".to_string()),
            api_key: Some("test-key".to_string()),
            ..Default::default()
        };
        config
    }

    #[tokio::test]
    async fn test_for_server_skyvern() {
        let server = McpServer::for_server(configured(), ServerKind::Skyvern)
            .await
            .unwrap();

        assert_eq!(server.name(), "skyvern-test");
        assert_eq!(server.kind(), ServerKind::Skyvern);

        let mut names = server.tool_names();
        names.sort();
        assert_eq!(names, vec!["cancel_task", "get_task_details", "initiate_task"]);
    }

    #[tokio::test]
    async fn test_for_server_requires_credentials() {
        let result = McpServer::for_server(Config::default(), ServerKind::Skyvern).await;
        assert!(result.err().unwrap().is_config());
    }

    #[test]
    fn test_get_info() {
        let config = configured();
        let client = SkyvernClient::from_config(&config.skyvern).unwrap();
        let server = McpServer::with_router(config, ServerKind::Skyvern, skyvern::build_router(client));

        let info = server.get_info();
        assert_eq!(info.server_info.name, "skyvern-test");
        assert_eq!(info.server_info.version, env!("CARGO_PKG_VERSION"));
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_none());
        assert!(info.instructions.unwrap().contains("initiate_task"));
    }
}
