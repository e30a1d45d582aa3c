//! Initiate task tool.
//!
//! Starts a Skyvern task run. Skyvern navigates to `url` and works towards
//! the goal described in `prompt`; the response contains the `run_id` used
//! by the other tools.

use futures::FutureExt;
use rmcp::{
    handler::server::tool::{ToolCallContext, ToolRoute, cached_schema_for_type},
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{error, info, instrument};

use super::SkyvernClient;
use crate::domains::tools::common::{error_result, json_result, parse_params, upstream_error_result};

fn default_engine() -> String {
    "skyvern-2.0".to_string()
}

fn default_proxy_location() -> String {
    "RESIDENTIAL".to_string()
}

fn default_max_steps() -> u32 {
    10
}

/// Parameters for the initiate task tool.
///
/// Serializes directly into the request body; optional fields that were not
/// provided are left out.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct InitiateTaskParams {
    #[schemars(
        description = "The starting URL for the task. If not provided, Skyvern will attempt to determine an appropriate URL."
    )]
    pub url: String,

    #[schemars(
        description = "The goal or task for Skyvern to accomplish. Use 'complete'/'terminate'; prompt specifically, simply, and verbosely; define single, clear goals with guardrails (e.g., 'close cookie dialogs'); and provide concrete examples."
    )]
    pub prompt: String,

    #[schemars(description = "The title for the task.")]
    pub title: String,

    #[schemars(
        description = "The Skyvern engine version to use for this task. Supported values are 'skyvern-1.0' and 'skyvern-2.0'. Default is 'skyvern-2.0'."
    )]
    #[serde(default = "default_engine")]
    pub engine: String,

    #[schemars(
        description = "Geographic Proxy location to route the browser traffic through. Default is 'RESIDENTIAL'"
    )]
    #[serde(default = "default_proxy_location")]
    pub proxy_location: String,

    #[schemars(description = "Schema defining what data should be extracted from the webpage")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_extraction_schema: Option<Map<String, Value>>,

    #[schemars(
        description = "Custom mapping of error codes to error messages if Skyvern encounters an error"
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code_mapping: Option<Map<String, Value>>,

    #[schemars(description = "Maximum number of steps the task can take before timing out")]
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,

    #[schemars(description = "URL to send task status updates to after a run is finished")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,

    #[schemars(
        description = "Identifier for TOTP (Time-based One-Time Password) authentication if codes are being pushed to Skyvern"
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub totp_identifier: Option<String>,

    #[schemars(
        description = "URL for TOTP authentication setup if Skyvern should poll endpoint for 2FA codes"
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub totp_url: Option<String>,

    #[schemars(
        description = "ID of an existing browser session to reuse, having it continue from the current screen state"
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser_session_id: Option<String>,

    #[schemars(
        description = "Whether to publish this task as a reusable workflow. Default is false"
    )]
    #[serde(default)]
    pub publish_workflow: bool,
}

/// Initiate task tool - starts a Skyvern task run.
pub struct InitiateTaskTool;

impl InitiateTaskTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "initiate_task";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Initiates a task with the Skyvern API. Skyvern opens the URL in a browser and works towards the prompt's goal. Returns the Skyvern API response, including the run_id used to track or cancel the task.";

    /// Execute the tool logic.
    #[instrument(skip_all, fields(title = %params.title, url = %params.url))]
    pub async fn execute(params: &InitiateTaskParams, client: &SkyvernClient) -> CallToolResult {
        info!("Initiating Skyvern task");

        let payload = match serde_json::to_value(params) {
            Ok(payload) => payload,
            Err(e) => return error_result(&format!("Failed to encode task payload: {}", e)),
        };

        match client.run_task(payload).await {
            Ok(response) => {
                info!(
                    "Skyvern task initiated (run_id: {})",
                    response
                        .get("run_id")
                        .and_then(|v| v.as_str())
                        .unwrap_or("unknown")
                );
                json_result(response)
            }
            Err(e) => {
                error!("Skyvern task initiation failed: {}", e);
                upstream_error_result(&e)
            }
        }
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<InitiateTaskParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: Some("Initiate Skyvern task".to_string()),
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
                let params: InitiateTaskParams = parse_params(args)?;
                Ok(Self::execute(&params, &client).await)
            }
            .boxed()
        })
    }
}
