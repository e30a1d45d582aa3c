//! Get task details tool.

use futures::FutureExt;
use rmcp::{
    handler::server::tool::{ToolCallContext, ToolRoute, cached_schema_for_type},
    model::{CallToolResult, Tool, ToolAnnotations},
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, instrument};

use super::{SkyvernClient, validate_run_id};
use crate::domains::tools::common::{json_result, parse_params, upstream_error_result};

/// Parameters for the get task details tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetTaskDetailsParams {
    #[schemars(description = "The unique identifier for the task.")]
    pub run_id: String,
}

/// Get task details tool - fetches the state of a Skyvern run.
pub struct GetTaskDetailsTool;

impl GetTaskDetailsTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "get_task_details";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Gets details about a specific Skyvern task: status, output, failure reason and recording links.";

    /// Execute the tool logic.
    #[instrument(skip_all, fields(run_id = %run_id))]
    pub async fn execute(run_id: &str, client: &SkyvernClient) -> CallToolResult {
        info!("Fetching Skyvern task details");

        match client.get_run(run_id).await {
            Ok(response) => json_result(response),
            Err(e) => {
                error!("Fetching Skyvern task details failed: {}", e);
                upstream_error_result(&e)
            }
        }
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<GetTaskDetailsParams>(),
            annotations: Some(ToolAnnotations {
                title: None,
                read_only_hint: Some(true),
                destructive_hint: Some(false),
                idempotent_hint: Some(true),
                open_world_hint: Some(true),
            }),
            output_schema: None,
            icons: None,
            meta: None,
            title: Some("Get Skyvern task details".to_string()),
        }
    }

    /// Create a ToolRoute bound to the shared client.
    pub fn create_route<S>(client: Arc<SkyvernClient>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        ToolRoute::new_dyn(Self::to_tool(), move |ctx: ToolCallContext<'_, S>| {
            let args = ctx.arguments.clone();
            let client = client.clone();
            async move {
                let params: GetTaskDetailsParams = parse_params(args)?;
                let run_id = validate_run_id(&params.run_id)?;
                Ok(Self::execute(run_id, &client).await)
            }
            .boxed()
        })
    }
}
