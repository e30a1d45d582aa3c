//! Tool definitions, one submodule per adapter.

pub mod openapi;
pub mod skyvern;
