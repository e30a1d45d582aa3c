//! Domains module containing business logic organized by bounded contexts.
//!
//! - `tools`: the MCP tools of every adapter and the adapter registry
//! - `upstream`: the HTTP client shared by adapters that call a remote API

pub mod tools;
pub mod upstream;
