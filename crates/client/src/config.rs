//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `MARKET_API_URL` - Backend base URL including the API prefix
//!   (default: `http://localhost:8080/api`)
//! - `MARKET_HTTP_TIMEOUT_SECS` - Request timeout in seconds (default: 15)

use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default backend base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Failed to build HTTP client: {0}")]
    Http(String),
}

/// HTTP access layer configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Create a configuration with the default timeout.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Load configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `MARKET_API_URL` is not a valid URL or
    /// `MARKET_HTTP_TIMEOUT_SECS` is not a positive integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(
            std::env::var("MARKET_API_URL").ok(),
            std::env::var("MARKET_HTTP_TIMEOUT_SECS").ok(),
        )
    }

    fn from_vars(
        base_url: Option<String>,
        timeout_secs: Option<String>,
    ) -> Result<Self, ConfigError> {
        let raw_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Url::parse(&raw_url)
            .map_err(|e| ConfigError::InvalidEnvVar("MARKET_API_URL".to_string(), e.to_string()))?;

        let mut config = Self::new(raw_url);

        if let Some(raw) = timeout_secs {
            let secs: u64 = raw.parse().map_err(|_| {
                ConfigError::InvalidEnvVar(
                    "MARKET_HTTP_TIMEOUT_SECS".to_string(),
                    format!("expected a positive integer, got {raw:?}"),
                )
            })?;
            if secs == 0 {
                return Err(ConfigError::InvalidEnvVar(
                    "MARKET_HTTP_TIMEOUT_SECS".to_string(),
                    "timeout must be greater than zero".to_string(),
                ));
            }
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}
