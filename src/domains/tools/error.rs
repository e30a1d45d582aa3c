//! Tool-specific error types.

use rmcp::ErrorData as McpError;
use thiserror::Error;

use crate::domains::upstream::UpstreamError;

/// Errors that can occur during tool operations.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The requested tool or adapter was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid arguments were provided to the tool.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Tool definitions could not be generated.
    #[error("Tool generation failed: {0}")]
    Generation(String),

    /// The upstream call failed.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl ToolError {
    /// Create a new "not found" error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create a new "invalid arguments" error.
    pub fn invalid_arguments(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }

    /// Create a new "generation" error.
    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::InvalidArguments(msg) => McpError::invalid_params(msg, None),
            ToolError::NotFound(msg) => McpError::invalid_params(format!("Not found: {}", msg), None),
            other => McpError::internal_error(other.to_string(), None),
        }
    }
}
