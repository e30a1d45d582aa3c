//! STDIO transport.
//!
//! The MCP client spawns this binary and speaks JSON-RPC over its stdin and
//! stdout, so nothing else may write to stdout while it runs.

use rmcp::ServiceExt;
use tracing::info;

use super::{TransportError, TransportResult};
use crate::core::McpServer;

/// Serves one adapter to the parent process.
pub struct StdioTransport;

impl StdioTransport {
    /// Serve `server` until the client closes stdin.
    pub async fn run(server: McpServer) -> TransportResult<()> {
        let kind = server.kind();
        info!(
            "Adapter '{}' waiting for a client on stdin/stdout ({} tool(s))",
            kind,
            server.tool_names().len()
        );

        let session = server
            .serve(rmcp::transport::stdio())
            .await
            .map_err(|e| TransportError::init(format!("stdio handshake failed: {}", e)))?;

        let reason = session
            .waiting()
            .await
            .map_err(|e| TransportError::ServiceError(e.to_string()))?;

        info!("Adapter '{}' stdio session ended ({:?})", kind, reason);
        Ok(())
    }
}
