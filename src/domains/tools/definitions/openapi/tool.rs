//! Tool backed by a generated OpenAPI operation.

use futures::FutureExt;
use reqwest::Method;
use rmcp::{
    handler::server::tool::{ToolCallContext, ToolRoute},
    model::{CallToolResult, JsonObject, Tool, ToolAnnotations},
};
use std::sync::Arc;
use tracing::{error, info, instrument};

use super::operation::OperationSpec;
use crate::domains::tools::ToolError;
use crate::domains::tools::common::{json_result, upstream_error_result};
use crate::domains::upstream::ApiClient;

/// One operation bound to the shared upstream client.
pub struct OperationTool {
    spec: OperationSpec,
    client: Arc<ApiClient>,
}

impl OperationTool {
    pub fn new(spec: OperationSpec, client: Arc<ApiClient>) -> Self {
        Self { spec, client }
    }

    pub fn spec(&self) -> &OperationSpec {
        &self.spec
    }

    /// Validate the arguments and call the operation.
    ///
    /// Argument problems are returned as `Err` (invalid params); upstream
    /// failures are returned as error results.
    #[instrument(skip_all, fields(tool = %self.spec.name))]
    pub async fn execute(&self, args: &JsonObject) -> Result<CallToolResult, ToolError> {
        self.spec.validate_arguments(args)?;
        let request = self.spec.build_request(args)?;

        info!("{} {}", request.method(), request.path());
        match self.client.execute(request).await {
            Ok(value) => Ok(json_result(value)),
            Err(e) => {
                error!("Operation '{}' failed: {}", self.spec.name, e);
                Ok(upstream_error_result(&e))
            }
        }
    }

    /// Create a Tool model for this operation.
    pub fn to_tool(&self) -> Tool {
        Tool {
            name: self.spec.name.clone().into(),
            description: Some(self.spec.description.clone().into()),
            input_schema: Arc::new(self.spec.input_schema.clone()),
            annotations: Some(annotations_for_method(&self.spec.method)),
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }

    /// Create a ToolRoute owning this operation.
    pub fn create_route<S>(self: Arc<Self>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        ToolRoute::new_dyn(self.to_tool(), move |ctx: ToolCallContext<'_, S>| {
            let args = ctx.arguments.clone().unwrap_or_default();
            let tool = self.clone();
            async move { tool.execute(&args).await.map_err(Into::into) }.boxed()
        })
    }
}

/// Hints derived from HTTP method semantics. Every operation talks to an
/// external system, so `open_world_hint` is always set.
fn annotations_for_method(method: &Method) -> ToolAnnotations {
    let (read_only, destructive, idempotent) = match *method {
        Method::GET | Method::HEAD | Method::OPTIONS => (Some(true), Some(false), Some(true)),
        Method::POST => (Some(false), Some(false), Some(false)),
        Method::PUT | Method::DELETE => (Some(false), Some(true), Some(true)),
        Method::PATCH => (Some(false), Some(true), None),
        _ => (None, None, None),
    };
    ToolAnnotations {
        title: None,
        read_only_hint: read_only,
        destructive_hint: destructive,
        idempotent_hint: idempotent,
        open_world_hint: Some(true),
    }
}
