//! Upstream error types.

use serde_json::{Value, json};
use thiserror::Error;

/// Errors produced by a single upstream API call.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Required configuration (URL, credential) is missing or invalid.
    /// Raised before any request is sent.
    #[error("{0}")]
    Config(String),

    /// The upstream API answered with a non-success status.
    #[error("{service} API request failed with status {status}")]
    Status {
        service: String,
        status: u16,
        body: String,
    },

    /// The request never completed (connection, timeout, TLS...).
    #[error("Failed to connect to {service} API: {message}")]
    Network { service: String, message: String },

    /// The request could not be built from the given arguments.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A success response whose body is not valid JSON.
    #[error("Unexpected response from {service} API: {message}")]
    Decode { service: String, message: String },
}

impl UpstreamError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// HTTP status code, when the upstream answered.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short machine-readable error kind.
    pub fn kind(&self) -> String {
        match self {
            Self::Config(_) => "ConfigurationError".to_string(),
            Self::Status { service, .. } => format!("{}APIError", service),
            Self::Network { .. } => "NetworkError".to_string(),
            Self::InvalidRequest(_) => "InvalidRequest".to_string(),
            Self::Decode { .. } => "DecodeError".to_string(),
        }
    }

    /// Structured error object returned to MCP callers.
    pub fn to_payload(&self) -> Value {
        match self {
            Self::Status { status, body, .. } => json!({
                "error": self.kind(),
                "message": self.to_string(),
                "details": body,
                "status_code": status,
            }),
            Self::Network { message, .. } | Self::Decode { message, .. } => json!({
                "error": self.kind(),
                "message": self.to_string(),
                "details": message,
            }),
            Self::Config(message) | Self::InvalidRequest(message) => json!({
                "error": self.kind(),
                "message": message,
            }),
        }
    }
}
