//! Transports that carry MCP traffic between a client and the selected
//! adapter. Each one is behind a cargo feature:
//!
//! | feature | transport                                        |
//! |---------|--------------------------------------------------|
//! | `stdio` | stdin/stdout of a process spawned by the client   |
//! | `tcp`   | one MCP session per accepted TCP connection       |
//! | `http`  | rmcp streamable HTTP mounted in an axum router    |
//!
//! [`TransportService`] picks the transport from [`TransportConfig`].

mod config;
mod error;
mod service;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "tcp")]
pub mod tcp;

#[cfg(feature = "stdio")]
pub mod stdio;

pub use config::TransportConfig;
pub use error::{TransportError, TransportResult};
pub use service::TransportService;

#[cfg(feature = "tcp")]
pub use config::TcpConfig;

#[cfg(feature = "http")]
pub use config::{HttpConfig, normalize_rpc_path};
