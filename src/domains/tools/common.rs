//! Helpers shared by all tool definitions.
//!
//! Arguments are validated by deserializing them into the tool's parameter
//! struct; the same struct produces the advertised JSON schema, so schema and
//! validation cannot drift apart.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content, JsonObject},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::domains::upstream::UpstreamError;

/// Deserialize tool arguments into `T`.
///
/// Missing required fields, wrong types and malformed values are reported as
/// `invalid_params` before the tool body runs.
pub fn parse_params<T: DeserializeOwned>(arguments: Option<JsonObject>) -> Result<T, McpError> {
    let arguments = Value::Object(arguments.unwrap_or_default());
    serde_json::from_value(arguments).map_err(|e| {
        warn!("Rejected tool arguments: {}", e);
        McpError::invalid_params(format!("Invalid arguments: {}", e), None)
    })
}

/// Success result carrying the upstream body unchanged.
///
/// The body is returned as pretty-printed JSON text; object bodies are also
/// attached as structured content.
pub fn json_result(value: Value) -> CallToolResult {
    let text = serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
    let mut result = CallToolResult::success(vec![Content::text(text)]);
    if value.is_object() {
        result.structured_content = Some(value);
    }
    result
}

/// Error result carrying the structured upstream error payload.
pub fn upstream_error_result(err: &UpstreamError) -> CallToolResult {
    let payload = err.to_payload();
    let text = serde_json::to_string_pretty(&payload).unwrap_or_else(|_| payload.to_string());
    let mut result = CallToolResult::error(vec![Content::text(text)]);
    result.structured_content = Some(payload);
    result
}

/// Create an error result with a plain message.
pub fn error_result(message: &str) -> CallToolResult {
    warn!("{}", message);
    CallToolResult::error(vec![Content::text(message.to_string())])
}

/// Text of the first content block.
#[cfg(test)]
pub(crate) fn first_text(result: &CallToolResult) -> Option<&str> {
    result.content.first().and_then(|c| match &c.raw {
        rmcp::model::RawContent::Text(text) => Some(text.text.as_str()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Params {
        name: String,
        #[serde(default)]
        count: u32,
    }

    fn object(value: Value) -> Option<JsonObject> {
        value.as_object().cloned()
    }

    #[test]
    fn test_parse_params_ok() {
        let params: Params = parse_params(object(json!({"name": "a", "count": 3}))).unwrap();
        assert_eq!(params.name, "a");
        assert_eq!(params.count, 3);
    }

    #[test]
    fn test_parse_params_missing_required() {
        let err = parse_params::<Params>(object(json!({"count": 3}))).unwrap_err();
        assert!(err.message.contains("name"));
    }

    #[test]
    fn test_parse_params_wrong_type() {
        assert!(parse_params::<Params>(object(json!({"name": 5}))).is_err());
        assert!(parse_params::<Params>(object(json!({"name": "a", "count": "many"}))).is_err());
    }

    #[test]
    fn test_parse_params_no_arguments() {
        assert!(parse_params::<Params>(None).is_err());
    }

    #[test]
    fn test_json_result_object() {
        let body = json!({"run_id": "tsk_1"});
        let result = json_result(body.clone());
        assert_eq!(result.is_error, Some(false));
        assert_eq!(result.structured_content, Some(body));
        assert!(first_text(&result).unwrap().contains("tsk_1"));
    }

    #[test]
    fn test_json_result_non_object() {
        let result = json_result(json!([1, 2]));
        assert!(result.structured_content.is_none());
        assert_eq!(first_text(&result), Some("[\n  1,\n  2\n]"));
    }

    #[test]
    fn test_upstream_error_result() {
        let err = UpstreamError::Status {
            service: "Skyvern".to_string(),
            status: 500,
            body: "boom".to_string(),
        };
        let result = upstream_error_result(&err);
        assert_eq!(result.is_error, Some(true));
        assert_eq!(result.structured_content.unwrap()["status_code"], 500);
    }
}
