//! MCP Server Collection
//!
//! A collection of Model Context Protocol servers that expose third-party
//! HTTP APIs as MCP tools. Each adapter is selected by name at startup and
//! served over STDIO, TCP or streamable HTTP.
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, the server handler and transports
//! - **domains**: business logic organized by bounded contexts
//!   - **tools**: adapter registry and tool definitions
//!   - **upstream**: shared HTTP client and error mapping
//!
//! # Example
//!
//! ```rust,no_run
//! use mcp_server_collection::core::{Config, McpServer, TransportService};
//! use mcp_server_collection::domains::tools::ServerKind;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let transport = TransportService::new(config.transport.clone());
//!     let server = McpServer::for_server(config, ServerKind::Skyvern).await?;
//!     transport.run(server).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
