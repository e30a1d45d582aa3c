//! OpenAPI document loading and operation discovery.
//!
//! The document is kept as raw JSON rather than a typed model so that both
//! 3.0 and 3.1 documents load. Only local `$ref`s (`#/...`) are resolved;
//! cyclic references are cut and replaced by an open schema.

use reqwest::Method;
use serde_json::{Map, Value, json};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::operation::{OperationSpec, ParamLocation, ToolParameter};
use crate::domains::tools::ToolError;
use crate::domains::upstream::USER_AGENT;

/// HTTP methods that may carry an operation in a path item.
const METHODS: [&str; 7] = ["get", "put", "post", "delete", "patch", "head", "options"];

/// Longest tool name accepted by MCP clients.
const MAX_TOOL_NAME_LEN: usize = 64;

/// A parsed OpenAPI 3.x document.
#[derive(Debug, Clone)]
pub struct OpenApiDocument {
    root: Value,
}

impl OpenApiDocument {
    /// Wrap an already-parsed document.
    pub fn from_value(root: Value) -> Result<Self, ToolError> {
        let version = root
            .get("openapi")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::generation("document has no 'openapi' version field"))?;
        if !version.starts_with('3') {
            return Err(ToolError::generation(format!(
                "unsupported OpenAPI version {} (expected 3.x)",
                version
            )));
        }
        if !root.get("paths").is_some_and(Value::is_object) {
            return Err(ToolError::generation("document has no 'paths' object"));
        }
        Ok(Self { root })
    }

    /// Parse a JSON document.
    pub fn from_json(text: &str) -> Result<Self, ToolError> {
        let root = serde_json::from_str(text)
            .map_err(|e| ToolError::generation(format!("invalid OpenAPI JSON: {}", e)))?;
        Self::from_value(root)
    }

    /// Load a document from an `http(s)://` URL or a local file path.
    pub async fn load(location: &str, timeout: Duration) -> Result<Self, ToolError> {
        info!("Loading OpenAPI document from {}", location);

        let text = if location.starts_with("http://") || location.starts_with("https://") {
            let client = reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(timeout)
                .build()
                .map_err(|e| ToolError::generation(format!("failed to create HTTP client: {}", e)))?;
            let fetch_error = |e: reqwest::Error| {
                ToolError::generation(format!(
                    "failed to fetch OpenAPI document from {}: {}",
                    location, e
                ))
            };
            client
                .get(location)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(fetch_error)?
                .text()
                .await
                .map_err(fetch_error)?
        } else {
            let path = location.strip_prefix("file://").unwrap_or(location);
            tokio::fs::read_to_string(Path::new(path)).await.map_err(|e| {
                ToolError::generation(format!("failed to read OpenAPI document {}: {}", path, e))
            })?
        };

        Self::from_json(&text)
    }

    /// Document title from `info.title`.
    pub fn title(&self) -> Option<&str> {
        self.root.pointer("/info/title").and_then(Value::as_str)
    }

    /// Every operation in the document, one per `(path, method)`.
    ///
    /// Tool names are unique within the returned list.
    pub fn operations(&self) -> Result<Vec<OperationSpec>, ToolError> {
        let paths = self
            .root
            .get("paths")
            .and_then(Value::as_object)
            .ok_or_else(|| ToolError::generation("document has no 'paths' object"))?;

        let mut names = HashSet::new();
        let mut operations = Vec::new();

        for (path, item) in paths {
            let item = self.deref(item);
            let shared_params = item
                .get("parameters")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();

            for method in METHODS {
                let Some(operation) = item.get(method) else {
                    continue;
                };
                let spec =
                    self.operation_spec(path, method, operation, shared_params, &mut names)?;
                debug!("Discovered operation {} {} as '{}'", method, path, spec.name);
                operations.push(spec);
            }
        }

        Ok(operations)
    }

    fn operation_spec(
        &self,
        path: &str,
        method: &str,
        operation: &Value,
        shared_params: &[Value],
        names: &mut HashSet<String>,
    ) -> Result<OperationSpec, ToolError> {
        let base_name = operation
            .get("operationId")
            .and_then(Value::as_str)
            .map(sanitize_tool_name)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| canonical_name(method, path));
        let name = reserve_unique_name(names, &base_name);

        let summary = operation.get("summary").and_then(Value::as_str);
        let details = operation.get("description").and_then(Value::as_str);
        let description = match (summary, details) {
            (Some(s), Some(d)) if s != d => format!("{}\n\n{}", s, d),
            (Some(s), _) => s.to_string(),
            (None, Some(d)) => d.to_string(),
            (None, None) => format!("{} {}", method.to_uppercase(), path),
        };

        let mut parameters = self.collect_parameters(shared_params, operation);
        let body_params = self.collect_body_parameters(operation, &parameters);
        parameters.extend(body_params);

        let method = Method::from_bytes(method.to_uppercase().as_bytes())
            .map_err(|e| ToolError::generation(format!("invalid method {}: {}", method, e)))?;

        Ok(OperationSpec::new(
            name,
            method,
            path.to_string(),
            description,
            parameters,
        ))
    }

    /// Path-item parameters merged with operation parameters; the operation
    /// wins on `(in, name)`. Cookie parameters are not supported.
    fn collect_parameters(&self, shared: &[Value], operation: &Value) -> Vec<ToolParameter> {
        let own = operation
            .get("parameters")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let mut merged: Vec<ToolParameter> = Vec::new();
        for raw in shared.iter().chain(own) {
            let raw = self.deref(raw);
            let Some(name) = raw.get("name").and_then(Value::as_str) else {
                warn!("Skipping parameter without a name");
                continue;
            };
            let location = match raw.get("in").and_then(Value::as_str) {
                Some("path") => ParamLocation::Path,
                Some("query") => ParamLocation::Query,
                Some("header") => ParamLocation::Header,
                other => {
                    debug!("Skipping parameter '{}' located in {:?}", name, other);
                    continue;
                }
            };

            let schema = raw
                .get("schema")
                .or_else(|| {
                    raw.get("content")
                        .and_then(Value::as_object)
                        .and_then(|content| content.values().next())
                        .and_then(|media| media.get("schema"))
                })
                .map(|schema| self.inline_refs(schema))
                .unwrap_or_else(|| json!({}));

            let parameter = ToolParameter {
                name: name.to_string(),
                location,
                required: location == ParamLocation::Path
                    || raw.get("required").and_then(Value::as_bool).unwrap_or(false),
                schema: with_description(schema, raw.get("description")),
            };

            merged.retain(|p| !(p.name == parameter.name && p.location == parameter.location));
            merged.push(parameter);
        }
        merged
    }

    /// JSON request body as tool parameters: object bodies are flattened into
    /// one parameter per property, anything else becomes a `body` argument.
    fn collect_body_parameters(
        &self,
        operation: &Value,
        existing: &[ToolParameter],
    ) -> Vec<ToolParameter> {
        let Some(request_body) = operation.get("requestBody").map(|b| self.deref(b)) else {
            return Vec::new();
        };
        let Some(schema) = json_media_schema(request_body) else {
            debug!("Request body has no JSON schema, skipping");
            return Vec::new();
        };

        let body_required = request_body
            .get("required")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let schema = self.inline_refs(schema);
        let taken: HashSet<&str> = existing.iter().map(|p| p.name.as_str()).collect();

        if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
            let required: HashSet<&str> = schema
                .get("required")
                .and_then(Value::as_array)
                .map(|items| items.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();

            return properties
                .iter()
                .filter(|(name, _)| {
                    let collides = taken.contains(name.as_str());
                    if collides {
                        warn!("Body field '{}' collides with a parameter, skipping", name);
                    }
                    !collides
                })
                .map(|(name, prop_schema)| ToolParameter {
                    name: name.clone(),
                    location: ParamLocation::BodyField,
                    required: body_required && required.contains(name.as_str()),
                    schema: prop_schema.clone(),
                })
                .collect();
        }

        if taken.contains("body") {
            warn!("Request body collides with a parameter named 'body', skipping");
            return Vec::new();
        }
        vec![ToolParameter {
            name: "body".to_string(),
            location: ParamLocation::Body,
            required: body_required,
            schema: with_description(schema, request_body.get("description")),
        }]
    }

    /// Follow a top-level `$ref`, returning the value itself otherwise.
    fn deref<'a>(&'a self, value: &'a Value) -> &'a Value {
        let mut current = value;
        let mut seen = HashSet::new();
        while let Some(reference) = current.get("$ref").and_then(Value::as_str) {
            if !seen.insert(reference) {
                break;
            }
            match self.lookup_ref(reference) {
                Some(target) => current = target,
                None => break,
            }
        }
        current
    }

    fn lookup_ref(&self, reference: &str) -> Option<&Value> {
        let pointer = reference.strip_prefix('#')?;
        let target = self.root.pointer(pointer);
        if target.is_none() {
            warn!("Unresolvable $ref '{}'", reference);
        }
        target
    }

    /// Copy of `value` with every local `$ref` inlined.
    pub fn inline_refs(&self, value: &Value) -> Value {
        self.inline_refs_inner(value, &mut Vec::new())
    }

    fn inline_refs_inner(&self, value: &Value, visiting: &mut Vec<String>) -> Value {
        match value {
            Value::Object(map) => {
                if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
                    if visiting.iter().any(|r| r == reference) {
                        return json!({});
                    }
                    let Some(target) = self.lookup_ref(reference) else {
                        return json!({});
                    };

                    visiting.push(reference.to_string());
                    let mut resolved = self.inline_refs_inner(target, visiting);
                    visiting.pop();

                    // Sibling keys such as `description` refine the target.
                    if let Value::Object(resolved_map) = &mut resolved {
                        for (key, sibling) in map.iter().filter(|(k, _)| *k != "$ref") {
                            resolved_map.insert(key.clone(), self.inline_refs_inner(sibling, visiting));
                        }
                    }
                    return resolved;
                }

                Value::Object(
                    map.iter()
                        .map(|(k, v)| (k.clone(), self.inline_refs_inner(v, visiting)))
                        .collect::<Map<String, Value>>(),
                )
            }
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|v| self.inline_refs_inner(v, visiting))
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}

/// Schema of the JSON media type of a request body, if any.
fn json_media_schema(request_body: &Value) -> Option<&Value> {
    let content = request_body.get("content")?.as_object()?;
    content
        .get("application/json")
        .or_else(|| {
            content
                .iter()
                .find(|(media_type, _)| media_type.contains("json"))
                .map(|(_, media)| media)
        })
        .and_then(|media| media.get("schema"))
}

fn with_description(mut schema: Value, description: Option<&Value>) -> Value {
    if let (Some(obj), Some(Value::String(desc))) = (schema.as_object_mut(), description) {
        obj.entry("description")
            .or_insert_with(|| Value::String(desc.clone()));
    }
    schema
}

/// Restrict a name to `[A-Za-z0-9_-]` and cap its length.
fn sanitize_tool_name(raw: &str) -> String {
    let mut name = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            name.push(c);
        } else if !name.ends_with('_') {
            name.push('_');
        }
    }
    let mut name = name.trim_matches('_').to_string();
    name.truncate(MAX_TOOL_NAME_LEN);
    name
}

/// Name for operations without an `operationId`, e.g. `get_v1_runs_run_id`.
fn canonical_name(method: &str, path: &str) -> String {
    let raw = format!("{}_{}", method.to_lowercase(), path.replace(['{', '}'], ""));
    sanitize_tool_name(&raw)
}

fn reserve_unique_name(names: &mut HashSet<String>, base: &str) -> String {
    if names.insert(base.to_string()) {
        return base.to_string();
    }

    let mut counter = 1;
    loop {
        let suffix = format!("_{}", counter);
        let mut stem = base.to_string();
        stem.truncate(MAX_TOOL_NAME_LEN.saturating_sub(suffix.len()));
        let candidate = format!("{}{}", stem, suffix);
        if names.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}
