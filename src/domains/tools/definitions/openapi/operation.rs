//! A single OpenAPI operation and how tool arguments map onto its request.

use reqwest::Method;
use reqwest::header::{HeaderName, HeaderValue};
use rmcp::model::JsonObject;
use serde_json::{Map, Value, json};

use crate::domains::tools::ToolError;
use crate::domains::upstream::{ApiRequest, encode_path_segment};

/// Where an argument ends up in the HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    /// Substituted into the path template.
    Path,
    /// Query string pair; arrays repeat the key.
    Query,
    /// Request header.
    Header,
    /// One property of a JSON object body.
    BodyField,
    /// The entire JSON body.
    Body,
}

/// One tool argument.
#[derive(Debug, Clone)]
pub struct ToolParameter {
    pub name: String,
    pub location: ParamLocation,
    pub required: bool,
    /// JSON Schema of the argument with every `$ref` inlined.
    pub schema: Value,
}

/// An operation ready to be exposed as a tool.
#[derive(Debug, Clone)]
pub struct OperationSpec {
    pub name: String,
    pub method: Method,
    pub path: String,
    pub description: String,
    pub parameters: Vec<ToolParameter>,
    pub input_schema: JsonObject,
}

impl OperationSpec {
    pub fn new(
        name: String,
        method: Method,
        path: String,
        description: String,
        parameters: Vec<ToolParameter>,
    ) -> Self {
        let input_schema = build_input_schema(&parameters);
        Self {
            name,
            method,
            path,
            description,
            parameters,
            input_schema,
        }
    }

    /// Check required arguments and the top-level type of each known argument.
    ///
    /// Unknown arguments are ignored.
    pub fn validate_arguments(&self, args: &JsonObject) -> Result<(), ToolError> {
        for param in &self.parameters {
            match args.get(&param.name) {
                None | Some(Value::Null) if param.required => {
                    return Err(ToolError::invalid_arguments(format!(
                        "missing required argument '{}'",
                        param.name
                    )));
                }
                Some(value) if !value.is_null() && !matches_schema_type(&param.schema, value) => {
                    return Err(ToolError::invalid_arguments(format!(
                        "argument '{}' must be of type {}",
                        param.name,
                        schema_type_label(&param.schema)
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Build the upstream request for validated arguments.
    pub fn build_request(&self, args: &JsonObject) -> Result<ApiRequest, ToolError> {
        let mut path = self.path.clone();
        let mut query: Vec<(String, String)> = Vec::new();
        let mut headers: Vec<(String, String)> = Vec::new();
        let mut body_fields = Map::new();
        let mut whole_body = None;

        for param in &self.parameters {
            let Some(value) = args.get(&param.name).filter(|v| !v.is_null()) else {
                continue;
            };

            match param.location {
                ParamLocation::Path => {
                    let placeholder = format!("{{{}}}", param.name);
                    let segment = encode_path_segment(&value_to_string(value));
                    path = path.replace(&placeholder, &segment);
                }
                ParamLocation::Query => match value {
                    Value::Array(items) => {
                        for item in items.iter().filter(|v| !v.is_null()) {
                            query.push((param.name.clone(), value_to_string(item)));
                        }
                    }
                    other => query.push((param.name.clone(), value_to_string(other))),
                },
                ParamLocation::Header => {
                    let value = value_to_string(value);
                    if HeaderName::from_bytes(param.name.as_bytes()).is_err()
                        || HeaderValue::from_str(&value).is_err()
                    {
                        return Err(ToolError::invalid_arguments(format!(
                            "'{}' is not a valid HTTP header value",
                            param.name
                        )));
                    }
                    headers.push((param.name.clone(), value));
                }
                ParamLocation::BodyField => {
                    body_fields.insert(param.name.clone(), value.clone());
                }
                ParamLocation::Body => whole_body = Some(value.clone()),
            }
        }

        if path.contains('{') {
            return Err(ToolError::invalid_arguments(format!(
                "unresolved path parameters in {}",
                path
            )));
        }

        let mut request = ApiRequest::new(self.method.clone(), path);
        for (key, value) in query {
            request = request.query(key, value);
        }
        for (name, value) in headers {
            request = request.header(name, value);
        }
        if let Some(body) = whole_body {
            request = request.json(body);
        } else if !body_fields.is_empty() {
            request = request.json(Value::Object(body_fields));
        }

        Ok(request)
    }
}

/// Object schema with one property per parameter.
fn build_input_schema(parameters: &[ToolParameter]) -> JsonObject {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for param in parameters {
        properties.insert(param.name.clone(), param.schema.clone());
        if param.required {
            required.push(Value::String(param.name.clone()));
        }
    }

    let mut schema = Map::new();
    schema.insert("type".to_string(), json!("object"));
    schema.insert("properties".to_string(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".to_string(), Value::Array(required));
    }
    schema
}

/// Render a scalar for use in a path, query or header.
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn declared_types(schema: &Value) -> Vec<&str> {
    match schema.get("type") {
        Some(Value::String(t)) => vec![t.as_str()],
        Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

fn matches_schema_type(schema: &Value, value: &Value) -> bool {
    let types = declared_types(schema);
    if types.is_empty() {
        return true;
    }
    types.iter().any(|t| match *t {
        "string" => value.is_string(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        "null" => value.is_null(),
        _ => true,
    })
}

fn schema_type_label(schema: &Value) -> String {
    declared_types(schema).join(" or ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(name: &str, location: ParamLocation, required: bool, schema: Value) -> ToolParameter {
        ToolParameter {
            name: name.to_string(),
            location,
            required,
            schema,
        }
    }

    fn run_operation() -> OperationSpec {
        OperationSpec::new(
            "update_run".to_string(),
            Method::POST,
            "/v1/runs/{run_id}".to_string(),
            "Update a run".to_string(),
            vec![
                param("run_id", ParamLocation::Path, true, json!({"type": "string"})),
                param("tags", ParamLocation::Query, false, json!({"type": "array"})),
                param("limit", ParamLocation::Query, false, json!({"type": "integer"})),
                param("x-trace", ParamLocation::Header, false, json!({"type": "string"})),
                param("prompt", ParamLocation::BodyField, true, json!({"type": "string"})),
                param("max_steps", ParamLocation::BodyField, false, json!({"type": ["integer", "null"]})),
            ],
        )
    }

    fn args(value: Value) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_input_schema() {
        let op = run_operation();
        let schema = Value::Object(op.input_schema.clone());
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["run_id", "prompt"]));
        assert_eq!(schema["properties"]["limit"]["type"], "integer");
    }

    #[test]
    fn test_validate_missing_required() {
        let op = run_operation();
        let err = op
            .validate_arguments(&args(json!({"run_id": "r1"})))
            .unwrap_err();
        assert!(err.to_string().contains("prompt"));

        let err = op
            .validate_arguments(&args(json!({"run_id": null, "prompt": "p"})))
            .unwrap_err();
        assert!(err.to_string().contains("run_id"));
    }

    #[test]
    fn test_validate_types() {
        let op = run_operation();
        assert!(op
            .validate_arguments(&args(json!({"run_id": "r1", "prompt": "p", "limit": 5})))
            .is_ok());
        assert!(op
            .validate_arguments(&args(json!({"run_id": "r1", "prompt": "p", "max_steps": null})))
            .is_ok());
        assert!(op
            .validate_arguments(&args(json!({"run_id": "r1", "prompt": "p", "unknown": 1})))
            .is_ok());

        let err = op
            .validate_arguments(&args(json!({"run_id": "r1", "prompt": "p", "limit": "five"})))
            .unwrap_err();
        assert!(err.to_string().contains("integer"));

        assert!(op
            .validate_arguments(&args(json!({"run_id": "r1", "prompt": "p", "limit": 2.5})))
            .is_err());
        assert!(op
            .validate_arguments(&args(json!({"run_id": 7, "prompt": "p"})))
            .is_err());
    }

    #[test]
    fn test_build_request() {
        let op = run_operation();
        let request = op
            .build_request(&args(json!({
                "run_id": "a/b c",
                "tags": ["x", "y"],
                "limit": 3,
                "x-trace": "abc",
                "prompt": "p",
                "max_steps": null
            })))
            .unwrap();

        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.path(), "/v1/runs/a%2Fb%20c");
        assert_eq!(
            request.query_pairs(),
            &[
                ("tags".to_string(), "x".to_string()),
                ("tags".to_string(), "y".to_string()),
                ("limit".to_string(), "3".to_string()),
            ]
        );
        assert_eq!(
            request.headers(),
            &[("x-trace".to_string(), "abc".to_string())]
        );
        assert_eq!(request.body(), Some(&json!({"prompt": "p"})));
    }

    #[test]
    fn test_build_request_rejects_bad_header_value() {
        let op = run_operation();
        let err = op
            .build_request(&args(json!({
                "run_id": "r1",
                "x-trace": "a\nb",
                "prompt": "p"
            })))
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
        assert!(err.to_string().contains("x-trace"));
    }

    #[test]
    fn test_build_request_whole_body() {
        let op = OperationSpec::new(
            "put_items".to_string(),
            Method::PUT,
            "/items".to_string(),
            "PUT /items".to_string(),
            vec![param("body", ParamLocation::Body, true, json!({"type": "array"}))],
        );
        let request = op.build_request(&args(json!({"body": [1, 2]}))).unwrap();
        assert_eq!(request.body(), Some(&json!([1, 2])));
    }

    #[test]
    fn test_build_request_without_body() {
        let op = OperationSpec::new(
            "get_run".to_string(),
            Method::GET,
            "/v1/runs/{run_id}".to_string(),
            "Get a run".to_string(),
            vec![param("run_id", ParamLocation::Path, true, json!({"type": "string"}))],
        );
        let request = op.build_request(&args(json!({"run_id": 42}))).unwrap();
        assert_eq!(request.path(), "/v1/runs/42");
        assert!(request.body().is_none());

        assert!(op.build_request(&JsonObject::new()).is_err());
    }

    #[test]
    fn test_value_to_string() {
        assert_eq!(value_to_string(&json!("s")), "s");
        assert_eq!(value_to_string(&json!(true)), "true");
        assert_eq!(value_to_string(&json!(1.5)), "1.5");
        assert_eq!(value_to_string(&json!({"a": 1})), r#"{"a":1}"#);
    }
}
