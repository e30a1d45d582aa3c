//! Skyvern API client.

use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::core::config::{SkyvernConfig, SkyvernCredentials};
use crate::core::Result;
use crate::domains::upstream::{
    ApiClient, ApiClientConfig, ApiRequest, UpstreamError, encode_path_segment,
};

/// Header carrying the Skyvern API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Client for the subset of the Skyvern API used by the tools.
#[derive(Clone)]
pub struct SkyvernClient {
    api: ApiClient,
}

impl SkyvernClient {
    /// Name used in error payloads (`SkyvernAPIError`).
    pub const SERVICE_NAME: &'static str = "Skyvern";

    /// Create a client from configuration.
    ///
    /// Fails with a configuration error if `SKYVERN_URL` or
    /// `SKYVERN_API_KEY` is missing. No request is made.
    pub fn from_config(config: &SkyvernConfig) -> Result<Self> {
        let credentials = config.credentials()?;
        Self::new(&credentials, Duration::from_secs(config.timeout_secs))
    }

    /// Create a client from checked credentials.
    pub fn new(credentials: &SkyvernCredentials, timeout: Duration) -> Result<Self> {
        let api = ApiClient::new(Self::api_config(credentials, timeout))?;
        debug!("Skyvern client ready for {}", api.base_url());
        Ok(Self { api })
    }

    /// Upstream client settings for the given credentials.
    pub fn api_config(credentials: &SkyvernCredentials, timeout: Duration) -> ApiClientConfig {
        ApiClientConfig {
            service_name: Self::SERVICE_NAME.to_string(),
            base_url: credentials.base_url.clone(),
            auth_header: Some((API_KEY_HEADER.to_string(), credentials.api_key.clone())),
            timeout,
        }
    }

    /// `POST /v1/run/tasks`
    pub async fn run_task(&self, payload: Value) -> std::result::Result<Value, UpstreamError> {
        self.api
            .execute(ApiRequest::post("/v1/run/tasks").json(payload))
            .await
    }

    /// `GET /v1/runs/{run_id}`
    pub async fn get_run(&self, run_id: &str) -> std::result::Result<Value, UpstreamError> {
        let path = format!("/v1/runs/{}", encode_path_segment(run_id));
        self.api.execute(ApiRequest::get(path)).await
    }

    /// `POST /v1/runs/{run_id}/cancel`
    pub async fn cancel_run(&self, run_id: &str) -> std::result::Result<Value, UpstreamError> {
        let path = format!("/v1/runs/{}/cancel", encode_path_segment(run_id));
        self.api.execute(ApiRequest::post(path)).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Client pointed at a mock server.
    pub(crate) fn mock_client(base_url: &str) -> SkyvernClient {
        let credentials = SkyvernCredentials {
            base_url: base_url.to_string(),
            api_key: "test-api-key".to_string(),
        };
        SkyvernClient::new(&credentials, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_from_config_requires_credentials() {
        let err = SkyvernClient::from_config(&SkyvernConfig::default()).err().unwrap();
        assert!(err.is_config());
        assert!(err.to_string().contains("SKYVERN_URL"));
    }

    #[test]
    fn test_from_config_with_credentials() {
        let config = SkyvernConfig {
            base_url: Some("https://api.skyvern.com/".to_string()),
            api_key: Some("key".to_string()),
            ..Default::default()
        };
        let client = SkyvernClient::from_config(&config).unwrap();
        assert_eq!(client.api.base_url(), "https://api.skyvern.com");
        assert_eq!(client.api.service_name(), "Skyvern");
    }
}
