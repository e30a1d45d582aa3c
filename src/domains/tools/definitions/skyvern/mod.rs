//! Skyvern tools.
//!
//! Skyvern automates browser workflows. This adapter exposes the three calls
//! an agent needs to drive it:
//! - `initiate_task`: start a task run
//! - `get_task_details`: poll a run by id
//! - `cancel_task`: stop a run
//!
//! All tools share one [`SkyvernClient`].

mod cancel_task;
mod client;
mod get_task_details;
mod initiate_task;

use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;

pub use cancel_task::{CancelTaskParams, CancelTaskTool};
pub use client::SkyvernClient;
pub use get_task_details::{GetTaskDetailsParams, GetTaskDetailsTool};
pub use initiate_task::{InitiateTaskParams, InitiateTaskTool};

/// Build the router with every Skyvern tool.
pub fn build_router<S>(client: SkyvernClient) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    let client = Arc::new(client);
    ToolRouter::new()
        .with_route(InitiateTaskTool::create_route(client.clone()))
        .with_route(GetTaskDetailsTool::create_route(client.clone()))
        .with_route(CancelTaskTool::create_route(client))
}

/// Reject blank run ids before they turn into a malformed URL.
fn validate_run_id(run_id: &str) -> Result<&str, rmcp::ErrorData> {
    let run_id = run_id.trim();
    if run_id.is_empty() {
        return Err(rmcp::ErrorData::invalid_params(
            "run_id must not be empty".to_string(),
            None,
        ));
    }
    Ok(run_id)
}
