//! Thin async HTTP client shared by all tools of one adapter.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::UpstreamError;

/// User agent sent with every upstream request.
pub const USER_AGENT: &str = concat!("mcp-server-collection/", env!("CARGO_PKG_VERSION"));

/// Settings for an [`ApiClient`].
#[derive(Clone)]
pub struct ApiClientConfig {
    /// Human-readable upstream name, used in error kinds and messages.
    pub service_name: String,

    /// Base URL every request path is appended to.
    pub base_url: String,

    /// Authentication header as `(name, value)`, attached to every request.
    pub auth_header: Option<(String, String)>,

    /// Per-request timeout.
    pub timeout: Duration,
}

impl std::fmt::Debug for ApiClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClientConfig")
            .field("service_name", &self.service_name)
            .field("base_url", &self.base_url)
            .field(
                "auth_header",
                &self.auth_header.as_ref().map(|(name, _)| (name, "[REDACTED]")),
            )
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// A single upstream request, relative to the client's base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Option<Value>,
}

impl ApiRequest {
    /// Create a request for the given method and path (e.g. `/v1/runs/abc`).
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Append a query pair. Repeating a key sends it several times.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Add a request header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Send `body` as JSON.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }
}

/// HTTP client bound to one upstream API.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    service_name: String,
    base_url: String,
}

impl ApiClient {
    /// Build a client. Fails with [`UpstreamError::Config`] when the base URL
    /// or the auth header cannot be used; nothing is sent here.
    pub fn new(config: ApiClientConfig) -> Result<Self, UpstreamError> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| {
            UpstreamError::config(format!(
                "Invalid {} base URL '{}': {}",
                config.service_name, base_url, e
            ))
        })?;

        let mut default_headers = HeaderMap::new();
        if let Some((name, value)) = &config.auth_header {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                UpstreamError::config(format!("Invalid auth header name '{}': {}", name, e))
            })?;
            let mut value = HeaderValue::from_str(value)
                .map_err(|_| UpstreamError::config("API key contains invalid header characters"))?;
            value.set_sensitive(true);
            default_headers.insert(name, value);
        }

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(default_headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| UpstreamError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            service_name: config.service_name,
            base_url,
        })
    }

    /// Base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Upstream name used in errors.
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Send one request and decode the JSON response body.
    ///
    /// A 2xx response with an empty body decodes to `Value::Null`.
    #[instrument(skip_all, fields(service = %self.service_name, method = %request.method, path = %request.path))]
    pub async fn execute(&self, request: ApiRequest) -> Result<Value, UpstreamError> {
        let url = format!("{}{}", self.base_url, request.path);
        debug!("Sending upstream request to {}", url);

        let mut builder = self.http.request(request.method, &url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                UpstreamError::InvalidRequest(format!("Invalid header name '{}': {}", name, e))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                UpstreamError::InvalidRequest(format!("Invalid value for header '{}': {}", name, e))
            })?;
            builder = builder.header(name, value);
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| self.network_error(&e))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| self.network_error(&e))?;

        if !status.is_success() {
            warn!(
                "{} API returned status {}: {}",
                self.service_name,
                status.as_u16(),
                text
            );
            return Err(UpstreamError::Status {
                service: self.service_name.clone(),
                status: status.as_u16(),
                body: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| UpstreamError::Decode {
            service: self.service_name.clone(),
            message: format!("response body is not valid JSON: {}", e),
        })
    }

    fn network_error(&self, err: &reqwest::Error) -> UpstreamError {
        let message = if err.is_timeout() {
            "Request timed out".to_string()
        } else if err.is_connect() {
            format!("Connection failed: {}", err)
        } else {
            err.to_string()
        };
        warn!("{} API request error: {}", self.service_name, message);

        UpstreamError::Network {
            service: self.service_name.clone(),
            message,
        }
    }
}

/// Percent-encode a value for use as a single URL path segment.
pub fn encode_path_segment(segment: &str) -> String {
    let mut encoded = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~') {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }
    encoded
}
