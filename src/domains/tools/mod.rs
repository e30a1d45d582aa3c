//! Tools domain module.
//!
//! Tools are the functions an MCP client can call. Each adapter ("server")
//! contributes a set of tools; only the adapter selected on the command
//! line is routed.
//!
//! ## Architecture
//!
//! - `definitions/` - Tool implementations, grouped per upstream API
//! - `registry.rs` - Catalogue of adapters that can be served
//! - `router.rs` - Builds the rmcp ToolRouter for one adapter
//! - `common.rs` - Argument parsing and result helpers shared by tools
//! - `error.rs` - Tool-specific error types

pub mod common;
pub mod definitions;
mod error;
mod registry;
pub mod router;

pub use error::ToolError;
pub use registry::ServerKind;
pub use router::build_tool_router;
