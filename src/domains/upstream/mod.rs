//! Upstream HTTP API access.
//!
//! Every adapter talks to its third-party API through an [`ApiClient`]:
//! one shared `reqwest::Client`, a base URL and an auth header. A call is a
//! single request; its outcome is either the decoded JSON body or an
//! [`UpstreamError`] describing what went wrong.

mod client;
mod error;

pub use client::{ApiClient, ApiClientConfig, ApiRequest, USER_AGENT, encode_path_segment};
pub use error::UpstreamError;
