//! Configuration management for the MCP server collection.
//!
//! Configuration is populated from environment variables (optionally loaded
//! from a `.env` file) and then refined by command-line overrides in `main`.
//! Nothing here talks to the network; credentials are only checked for
//! presence.

use super::error::{Error, Result};
use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

/// Default location of the Skyvern OpenAPI document.
pub const DEFAULT_SKYVERN_OPENAPI_URL: &str = "https://api.skyvern.com/openapi.json";

/// Default timeout for upstream HTTP requests, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Skyvern upstream API configuration.
    pub skyvern: SkyvernConfig,

    /// Problems found while loading, reported by [`Config::log_summary`]
    /// once logging is up.
    #[serde(skip)]
    warnings: Vec<String>,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,

    /// Whether to include timestamps in log output.
    pub with_timestamps: bool,
}

/// Configuration for the Skyvern upstream API.
#[derive(Clone, Serialize, Deserialize)]
pub struct SkyvernConfig {
    /// Base URL of the Skyvern API (`SKYVERN_URL`).
    pub base_url: Option<String>,

    /// API key sent as `x-api-key` (`SKYVERN_API_KEY`).
    pub api_key: Option<String>,

    /// URL or file path of the OpenAPI document (`SKYVERN_OPENAPI_URL`).
    pub openapi_url: String,

    /// Upstream request timeout in seconds (`SKYVERN_TIMEOUT_SECS`).
    pub timeout_secs: u64,
}

/// Skyvern credentials that passed the presence check.
#[derive(Clone)]
pub struct SkyvernCredentials {
    pub base_url: String,
    pub api_key: String,
}

/// Custom Debug implementation to redact secrets from logs.
impl std::fmt::Debug for SkyvernConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkyvernConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("openapi_url", &self.openapi_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl std::fmt::Debug for SkyvernCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkyvernCredentials")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl Default for SkyvernConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            openapi_url: DEFAULT_SKYVERN_OPENAPI_URL.to_string(),
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl SkyvernConfig {
    /// Check that both the base URL and the API key are present.
    pub fn credentials(&self) -> Result<SkyvernCredentials> {
        let base_url = self
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| Error::config("SKYVERN_URL environment variable is not set"))?;

        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| Error::config("SKYVERN_API_KEY environment variable is not set"))?;

        Ok(SkyvernCredentials {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "mcp-server-collection".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                with_timestamps: true,
            },
            transport: TransportConfig::default(),
            skyvern: SkyvernConfig::default(),
            warnings: Vec::new(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_current_env()
    }

    /// Load configuration from the given env file, then the environment.
    ///
    /// Unlike [`Config::from_env`], an unreadable file is an error.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        dotenvy::from_path(path).map_err(|e| {
            Error::config(format!("Failed to load env file {}: {}", path.display(), e))
        })?;
        Ok(Self::from_current_env())
    }

    fn from_current_env() -> Self {
        let mut config = Self::default();

        if let Some(name) = env_var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Some(level) = env_var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Some(timestamps) = env_var("MCP_LOG_TIMESTAMPS") {
            config.logging.with_timestamps = timestamps.to_lowercase() != "false" && timestamps != "0";
        }

        config.transport = TransportConfig::from_env();

        config.skyvern.base_url = env_var("SKYVERN_URL");
        config.skyvern.api_key = env_var("SKYVERN_API_KEY");

        if let Some(openapi_url) = env_var("SKYVERN_OPENAPI_URL") {
            config.skyvern.openapi_url = openapi_url;
        }

        if let Some(timeout) = env_var("SKYVERN_TIMEOUT_SECS") {
            match timeout.parse() {
                Ok(secs) => config.skyvern.timeout_secs = secs,
                Err(_) => config.warnings.push(format!(
                    "Ignoring invalid SKYVERN_TIMEOUT_SECS value '{}', using {}s",
                    timeout, DEFAULT_REQUEST_TIMEOUT_SECS
                )),
            }
        }

        config
    }

    /// Problems found while loading the configuration.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Log what was loaded. Called by `main` after the subscriber is installed,
    /// since configuration is read before the log level is known.
    pub fn log_summary(&self) {
        for warning in &self.warnings {
            warn!("{}", warning);
        }
        if self.skyvern.api_key.is_some() {
            info!("Skyvern API key loaded from environment");
        }
        debug!("Loaded configuration: {:?}", self);
    }
}

/// Read an environment variable, treating empty values as unset.
pub(crate) fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    // Mutex to ensure env var tests run serially
    pub(crate) static ENV_TEST_LOCK: Mutex<()> = Mutex::new(());

    fn clear_skyvern_env() {
        unsafe {
            std::env::remove_var("SKYVERN_URL");
            std::env::remove_var("SKYVERN_API_KEY");
            std::env::remove_var("SKYVERN_OPENAPI_URL");
            std::env::remove_var("SKYVERN_TIMEOUT_SECS");
        }
    }

    #[test]
    fn test_skyvern_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        clear_skyvern_env();
        unsafe {
            std::env::set_var("SKYVERN_URL", "https://skyvern.example.com/");
            std::env::set_var("SKYVERN_API_KEY", "sk_test_12345");
            std::env::set_var("SKYVERN_TIMEOUT_SECS", "15");
        }

        let config = Config::from_current_env();
        assert_eq!(config.skyvern.api_key.as_deref(), Some("sk_test_12345"));
        assert_eq!(config.skyvern.timeout_secs, 15);

        let creds = config.skyvern.credentials().unwrap();
        assert_eq!(creds.base_url, "https://skyvern.example.com");
        assert_eq!(creds.api_key, "sk_test_12345");

        clear_skyvern_env();
    }

    #[test]
    fn test_empty_values_count_as_missing() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        clear_skyvern_env();
        unsafe {
            std::env::set_var("SKYVERN_URL", "");
            std::env::set_var("SKYVERN_API_KEY", "  ");
        }

        let config = Config::from_current_env();
        assert!(config.skyvern.base_url.is_none());
        assert!(config.skyvern.api_key.is_none());

        clear_skyvern_env();
    }

    #[test]
    fn test_invalid_timeout_falls_back_to_default() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        clear_skyvern_env();
        unsafe {
            std::env::set_var("SKYVERN_TIMEOUT_SECS", "soon");
        }

        let config = Config::from_current_env();
        assert_eq!(config.skyvern.timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(config.warnings().len(), 1);
        assert!(config.warnings()[0].contains("SKYVERN_TIMEOUT_SECS"));

        clear_skyvern_env();
    }

    #[test]
    fn test_from_env_file() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        clear_skyvern_env();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "SKYVERN_URL=http://localhost:8000").unwrap();
        writeln!(file, "SKYVERN_API_KEY=from_file").unwrap();

        let config = Config::from_env_file(file.path()).unwrap();
        assert_eq!(
            config.skyvern.base_url.as_deref(),
            Some("http://localhost:8000")
        );
        assert_eq!(config.skyvern.api_key.as_deref(), Some("from_file"));

        clear_skyvern_env();
    }

    #[test]
    fn test_missing_env_file_is_config_error() {
        let err = Config::from_env_file("/nonexistent/mcp-server-collection.env").unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_credentials_missing_url() {
        let skyvern = SkyvernConfig {
            api_key: Some("key".to_string()),
            ..Default::default()
        };
        let err = skyvern.credentials().unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("SKYVERN_URL"));
    }

    #[test]
    fn test_credentials_missing_api_key() {
        let skyvern = SkyvernConfig {
            base_url: Some("http://localhost:8000".to_string()),
            ..Default::default()
        };
        let err = skyvern.credentials().unwrap_err();
        assert!(err.to_string().contains("SKYVERN_API_KEY"));
    }

    #[test]
    fn test_api_key_redacted_in_debug() {
        let skyvern = SkyvernConfig {
            base_url: Some("http://localhost:8000".to_string()),
            api_key: Some("super_secret_key".to_string()),
            ..Default::default()
        };
        let debug_str = format!("{:?}", skyvern);
        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("super_secret_key"));

        let creds = skyvern.credentials().unwrap();
        assert!(!format!("{:?}", creds).contains("super_secret_key"));
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.warnings().is_empty());
        assert_eq!(config.server.name, "mcp-server-collection");
        assert!(config.skyvern.api_key.is_none());
        assert_eq!(config.skyvern.openapi_url, DEFAULT_SKYVERN_OPENAPI_URL);
    }
}
