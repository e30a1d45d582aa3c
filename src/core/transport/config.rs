//! Transport configuration types.

use serde::{Deserialize, Serialize};

use super::{TransportError, TransportResult};
use crate::core::config::env_var;

/// Transport configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransportConfig {
    /// Standard input/output transport (default for MCP).
    #[cfg(feature = "stdio")]
    Stdio,

    /// TCP socket transport with line-delimited JSON-RPC messages.
    #[cfg(feature = "tcp")]
    Tcp(TcpConfig),

    /// MCP streamable HTTP transport.
    #[cfg(feature = "http")]
    Http(HttpConfig),
}

/// TCP transport configuration.
#[cfg(feature = "tcp")]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TcpConfig {
    /// Port number to listen on.
    pub port: u16,

    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,
}

/// HTTP transport configuration.
#[cfg(feature = "http")]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Port number to listen on.
    pub port: u16,

    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Path the MCP endpoint is mounted on.
    #[serde(default = "default_rpc_path")]
    pub rpc_path: String,

    /// Enable CORS for browser clients.
    #[serde(default = "default_cors")]
    pub enable_cors: bool,
}

#[cfg(any(feature = "tcp", feature = "http"))]
fn default_host() -> String {
    "127.0.0.1".to_string()
}

#[cfg(feature = "tcp")]
const DEFAULT_TCP_PORT: u16 = 3000;

#[cfg(feature = "http")]
const DEFAULT_HTTP_PORT: u16 = 8000;

#[cfg(feature = "http")]
fn default_rpc_path() -> String {
    "/mcp".to_string()
}

/// Give an endpoint path exactly one leading `/` and no trailing `/`.
///
/// The root path normalizes to `/`, which [`HttpConfig::validate`] rejects.
#[cfg(feature = "http")]
pub fn normalize_rpc_path(path: &str) -> String {
    format!("/{}", path.trim().trim_matches('/'))
}

#[cfg(feature = "http")]
fn default_cors() -> bool {
    true
}

impl Default for TransportConfig {
    fn default() -> Self {
        #[cfg(feature = "stdio")]
        {
            return Self::Stdio;
        }

        #[cfg(all(not(feature = "stdio"), feature = "tcp"))]
        {
            return Self::Tcp(TcpConfig::default());
        }

        #[cfg(all(not(feature = "stdio"), not(feature = "tcp"), feature = "http"))]
        {
            return Self::Http(HttpConfig::default());
        }

        #[cfg(not(any(feature = "stdio", feature = "tcp", feature = "http")))]
        {
            compile_error!("At least one transport feature must be enabled: stdio, tcp, or http");
        }
    }
}

#[cfg(feature = "http")]
impl HttpConfig {
    /// Reject an MCP endpoint that cannot be mounted next to `/` and `/health`.
    pub fn validate(&self) -> TransportResult<()> {
        let path = normalize_rpc_path(&self.rpc_path);
        if path == "/" || path == "/health" {
            return Err(TransportError::init(format!(
                "invalid MCP endpoint path '{}': must be a non-root path other than /health",
                self.rpc_path
            )));
        }
        Ok(())
    }
}

#[cfg(feature = "tcp")]
impl Default for TcpConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_TCP_PORT,
            host: default_host(),
        }
    }
}

#[cfg(feature = "http")]
impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_HTTP_PORT,
            host: default_host(),
            rpc_path: default_rpc_path(),
            enable_cors: default_cors(),
        }
    }
}

impl TransportConfig {
    /// Names of the transports compiled into this binary.
    pub fn available() -> Vec<&'static str> {
        let mut names = Vec::new();
        #[cfg(feature = "stdio")]
        names.push("stdio");
        #[cfg(feature = "tcp")]
        names.push("tcp");
        #[cfg(feature = "http")]
        names.push("http");
        names
    }

    /// Create a STDIO transport config.
    #[cfg(feature = "stdio")]
    pub fn stdio() -> Self {
        Self::Stdio
    }

    /// Create a TCP transport config.
    #[cfg(feature = "tcp")]
    pub fn tcp(port: u16, host: impl Into<String>) -> Self {
        Self::Tcp(TcpConfig {
            port,
            host: host.into(),
        })
    }

    /// Create an HTTP transport config.
    #[cfg(feature = "http")]
    pub fn http(port: u16, host: impl Into<String>) -> Self {
        Self::Http(HttpConfig {
            port,
            host: host.into(),
            ..Default::default()
        })
    }

    /// Build a transport config from a transport name and optional overrides.
    ///
    /// Used by the command line; fields that are not overridden keep the
    /// values of `base` when it is the same transport, else the defaults.
    #[allow(unused_variables)]
    pub fn from_name(
        name: &str,
        host: Option<String>,
        port: Option<u16>,
        base: &TransportConfig,
    ) -> TransportResult<Self> {
        match name.to_lowercase().as_str() {
            #[cfg(feature = "stdio")]
            "stdio" => Ok(Self::Stdio),
            #[cfg(feature = "tcp")]
            "tcp" => {
                let mut cfg = match base {
                    Self::Tcp(cfg) => cfg.clone(),
                    #[allow(unreachable_patterns)]
                    _ => TcpConfig::default(),
                };
                if let Some(host) = host {
                    cfg.host = host;
                }
                if let Some(port) = port {
                    cfg.port = port;
                }
                Ok(Self::Tcp(cfg))
            }
            #[cfg(feature = "http")]
            "http" | "streamable-http" => {
                let mut cfg = match base {
                    Self::Http(cfg) => cfg.clone(),
                    #[allow(unreachable_patterns)]
                    _ => HttpConfig::default(),
                };
                if let Some(host) = host {
                    cfg.host = host;
                }
                if let Some(port) = port {
                    cfg.port = port;
                }
                Ok(Self::Http(cfg))
            }
            other => Err(TransportError::unsupported(format!(
                "'{}' (available: {})",
                other,
                Self::available().join(", ")
            ))),
        }
    }

    /// Load transport config from environment variables.
    pub fn from_env() -> Self {
        let transport = env_var("MCP_TRANSPORT").unwrap_or_default().to_lowercase();

        match transport.as_str() {
            #[cfg(feature = "tcp")]
            "tcp" => {
                let port = env_var("MCP_TCP_PORT")
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(DEFAULT_TCP_PORT);
                let host = env_var("MCP_TCP_HOST").unwrap_or_else(default_host);
                Self::Tcp(TcpConfig { port, host })
            }
            #[cfg(feature = "http")]
            "http" | "streamable-http" => {
                let port = env_var("MCP_HTTP_PORT")
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(DEFAULT_HTTP_PORT);
                let host = env_var("MCP_HTTP_HOST").unwrap_or_else(default_host);
                let rpc_path = env_var("MCP_HTTP_PATH")
                    .map(|p| normalize_rpc_path(&p))
                    .unwrap_or_else(default_rpc_path);
                let enable_cors = env_var("MCP_HTTP_CORS")
                    .map(|v| v.to_lowercase() != "false" && v != "0")
                    .unwrap_or(true);
                Self::Http(HttpConfig {
                    port,
                    host,
                    rpc_path,
                    enable_cors,
                })
            }
            _ => Self::default(),
        }
    }

    /// Get a description of this transport for logging.
    pub fn description(&self) -> String {
        match self {
            #[cfg(feature = "stdio")]
            Self::Stdio => "STDIO (standard MCP mode)".to_string(),
            #[cfg(feature = "tcp")]
            Self::Tcp(cfg) => format!("TCP on {}:{}", cfg.host, cfg.port),
            #[cfg(feature = "http")]
            Self::Http(cfg) => format!(
                "streamable HTTP on {}:{}{}",
                cfg.host, cfg.port, cfg.rpc_path
            ),
        }
    }

    /// Check if this transport is the standard STDIO mode.
    pub fn is_stdio(&self) -> bool {
        #[cfg(feature = "stdio")]
        {
            matches!(self, Self::Stdio)
        }
        #[cfg(not(feature = "stdio"))]
        {
            false
        }
    }
}
