//! Cancel task tool.

use futures::FutureExt;
use rmcp::{
    handler::server::tool::{ToolCallContext, ToolRoute, cached_schema_for_type},
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, instrument};

use super::{SkyvernClient, validate_run_id};
use crate::domains::tools::common::{json_result, parse_params, upstream_error_result};

/// Parameters for the cancel task tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CancelTaskParams {
    #[schemars(description = "The unique identifier for the task to cancel.")]
    pub run_id: String,
}

/// Cancel task tool - stops a running Skyvern task.
pub struct CancelTaskTool;

impl CancelTaskTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "cancel_task";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Cancels a running Skyvern task.";

    /// Execute the tool logic.
    #[instrument(skip_all, fields(run_id = %run_id))]
    pub async fn execute(run_id: &str, client: &SkyvernClient) -> CallToolResult {
        info!("Cancelling Skyvern task");

        match client.cancel_run(run_id).await {
            Ok(response) => json_result(response),
            Err(e) => {
                error!("Cancelling Skyvern task failed: {}", e);
                upstream_error_result(&e)
            }
        }
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<CancelTaskParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: Some("Cancel Skyvern task".to_string()),
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
                let params: CancelTaskParams = parse_params(args)?;
                let run_id = validate_run_id(&params.run_id)?;
                Ok(Self::execute(run_id, &client).await)
            }
            .boxed()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::definitions::skyvern::client::tests::mock_client;
    use serde_json::{Value, json};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_execute_posts_cancel() {
        let server = MockServer::start().await;
        let response = json!({"run_id": "tsk_9", "status": "canceled"});

        Mock::given(method("POST"))
            .and(path("/v1/runs/tsk_9/cancel"))
            .and(header("x-api-key", "test-api-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(response.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let result = CancelTaskTool::execute("tsk_9", &mock_client(&server.uri())).await;
        assert_eq!(result.is_error, Some(false));
        assert_eq!(result.structured_content, Some(response));
    }

    #[tokio::test]
    async fn test_execute_empty_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/runs/tsk_9/cancel"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let result = CancelTaskTool::execute("tsk_9", &mock_client(&server.uri())).await;
        assert_eq!(result.is_error, Some(false));
        assert!(result.structured_content.is_none());
        let _: Value = serde_json::from_str(
            crate::domains::tools::common::first_text(&result).unwrap(),
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_execute_surfaces_server_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/runs/tsk_9/cancel"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&server)
            .await;

        let result = CancelTaskTool::execute("tsk_9", &mock_client(&server.uri())).await;
        assert_eq!(result.is_error, Some(true));
        assert_eq!(result.structured_content.unwrap()["status_code"], 500);
    }
}
