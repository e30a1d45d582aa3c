//! Tool Router - builds the rmcp ToolRouter for the selected adapter.
//!
//! Credentials are checked here, so a misconfigured adapter fails at startup
//! instead of on its first tool call.

use rmcp::handler::server::tool::ToolRouter;
use tracing::info;

use super::ServerKind;
use super::definitions::{openapi, skyvern};
use crate::core::{Config, Result};

/// Build the tool router for `kind`.
///
/// Fails with a configuration error when the adapter's credentials are
/// missing, and for OpenAPI-based adapters when the document cannot be
/// loaded.
pub async fn build_tool_router<S>(kind: ServerKind, config: &Config) -> Result<ToolRouter<S>>
where
    S: Send + Sync + 'static,
{
    let router = match kind {
        ServerKind::Skyvern => {
            let client = skyvern::SkyvernClient::from_config(&config.skyvern)?;
            skyvern::build_router(client)
        }
        ServerKind::SkyvernOpenapi => openapi::build_skyvern_router(&config.skyvern).await?,
    };

    let names: Vec<_> = router
        .list_all()
        .iter()
        .map(|t| t.name.to_string())
        .collect();
    info!("{} tool(s) for '{}': {}", names.len(), kind, names.join(", "));

    Ok(router)
}
