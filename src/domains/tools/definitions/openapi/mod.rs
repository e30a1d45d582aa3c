//! Tools generated from an OpenAPI document.
//!
//! Every operation in the document becomes one tool. Arguments are mapped
//! onto path, query, header and JSON body parts of the request according to
//! the operation's parameter locations; see [`OperationSpec`].

mod document;
mod operation;
mod tool;

use rmcp::handler::server::tool::ToolRouter;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub use document::OpenApiDocument;
pub use operation::{OperationSpec, ParamLocation, ToolParameter};
pub use tool::OperationTool;

use super::skyvern::SkyvernClient;
use crate::core::Result;
use crate::core::config::SkyvernConfig;
use crate::domains::tools::ToolError;
use crate::domains::upstream::ApiClient;

/// Build the router for the Skyvern API from its OpenAPI document.
///
/// Credentials are checked before the document is fetched.
pub async fn build_skyvern_router<S>(config: &SkyvernConfig) -> Result<ToolRouter<S>>
where
    S: Send + Sync + 'static,
{
    let credentials = config.credentials()?;
    let timeout = Duration::from_secs(config.timeout_secs);
    let client = ApiClient::new(SkyvernClient::api_config(&credentials, timeout))?;

    let document = OpenApiDocument::load(&config.openapi_url, timeout).await?;
    build_router(&document, client)
}

/// Build a router with one tool per operation of `document`.
pub fn build_router<S>(document: &OpenApiDocument, client: ApiClient) -> Result<ToolRouter<S>>
where
    S: Send + Sync + 'static,
{
    let operations = document.operations()?;
    if operations.is_empty() {
        return Err(ToolError::generation("OpenAPI document defines no operations").into());
    }

    let client = Arc::new(client);
    let names: Vec<_> = operations.iter().map(|op| op.name.clone()).collect();

    let router = operations
        .into_iter()
        .map(|spec| Arc::new(OperationTool::new(spec, client.clone())))
        .fold(ToolRouter::new(), |router, tool| {
            router.with_route(tool.create_route())
        });

    info!(
        "Generated {} tools from '{}': {}",
        names.len(),
        document.title().unwrap_or("OpenAPI document"),
        names.join(", ")
    );

    Ok(router)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::common::first_text;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct TestServer {}

    fn skyvern_config(base_url: &str, openapi_url: &str) -> SkyvernConfig {
        SkyvernConfig {
            base_url: Some(base_url.to_string()),
            api_key: Some("test-api-key".to_string()),
            openapi_url: openapi_url.to_string(),
            timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn test_missing_credentials_checked_before_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let config = SkyvernConfig {
            openapi_url: format!("{}/openapi.json", server.uri()),
            ..Default::default()
        };
        let err = build_skyvern_router::<TestServer>(&config).await.err().unwrap();
        assert!(err.is_config());
    }

    #[tokio::test]
    async fn test_build_skyvern_router_from_url() {
        let server = MockServer::start().await;
        let document = document::tests::sample_document();

        Mock::given(method("GET"))
            .and(path("/openapi.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                serde_json::to_string(&json!({
                    "openapi": "3.1.0",
                    "info": {"title": "Skyvern API", "version": "1.0"},
                    "paths": {
                        "/v1/runs/{run_id}": {
                            "get": {
                                "operationId": "get_run",
                                "parameters": [
                                    {"name": "run_id", "in": "path", "required": true, "schema": {"type": "string"}}
                                ]
                            }
                        }
                    }
                }))
                .unwrap(),
            ))
            .mount(&server)
            .await;

        let config = skyvern_config(&server.uri(), &format!("{}/openapi.json", server.uri()));
        let router: ToolRouter<TestServer> = build_skyvern_router(&config).await.unwrap();
        let tools = router.list_all();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "get_run");

        let router: ToolRouter<TestServer> = build_router(
            &document,
            ApiClient::new(SkyvernClient::api_config(
                &config.credentials().unwrap(),
                Duration::from_secs(5),
            ))
            .unwrap(),
        )
        .unwrap();
        assert_eq!(router.list_all().len(), 4);
    }

    #[tokio::test]
    async fn test_document_fetch_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/openapi.json"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let config = skyvern_config(&server.uri(), &format!("{}/openapi.json", server.uri()));
        let err = build_skyvern_router::<TestServer>(&config).await.err().unwrap();
        assert!(err.to_string().contains("OpenAPI"));
    }

    #[test]
    fn test_empty_document_rejected() {
        let document =
            OpenApiDocument::from_value(json!({"openapi": "3.0.0", "paths": {}})).unwrap();
        let client = ApiClient::new(SkyvernClient::api_config(
            &skyvern_config("http://localhost:8000", "unused").credentials().unwrap(),
            Duration::from_secs(5),
        ))
        .unwrap();
        assert!(build_router::<TestServer>(&document, client).is_err());
    }

    #[tokio::test]
    async fn test_generated_tool_call() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/runs/tsk_1"))
            .and(header("x-api-key", "test-api-key"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"run_id": "tsk_1", "status": "running"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let config = skyvern_config(&server.uri(), "unused");
        let client = ApiClient::new(SkyvernClient::api_config(
            &config.credentials().unwrap(),
            Duration::from_secs(5),
        ))
        .unwrap();
        let tools: Vec<_> = document::tests::sample_document()
            .operations()
            .unwrap()
            .into_iter()
            .map(|spec| OperationTool::new(spec, Arc::new(client.clone())))
            .collect();
        let get_run = tools
            .iter()
            .find(|t| t.spec().method == reqwest::Method::GET)
            .unwrap();

        let args = json!({"run_id": "tsk_1", "verbose": 1});
        let result = get_run
            .execute(args.as_object().unwrap())
            .await
            .unwrap();
        assert_eq!(result.is_error, Some(false));
        assert!(first_text(&result).unwrap().contains("running"));
    }
}
