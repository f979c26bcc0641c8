//! Configuration for the imghost API client
//!
//! Supports environment-based configuration with sensible defaults.

use crate::error::{ApiError, ApiResult};
use imghost_core::retry::RetryConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Backend used in production
pub const DEFAULT_API_URL: &str = "https://api.imghost.example";

/// Backend started by the local development stack
pub const DEVELOPMENT_API_URL: &str = "http://localhost:8000";

/// Environment types
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development backend
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    #[default]
    Production,
}

impl Environment {
    /// Parse from the `IMGHOST_ENV` environment variable
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("IMGHOST_ENV").unwrap_or_default())
    }

    fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "development" | "dev" | "local" => Self::Development,
            "staging" | "stage" => Self::Staging,
            _ => Self::Production,
        }
    }

    /// Retry policy for idempotent requests in this environment
    pub fn retry_config(self) -> RetryConfig {
        match self {
            Self::Development => RetryConfig::quick(),
            Self::Staging => RetryConfig::default(),
            Self::Production => RetryConfig::patient(),
        }
    }
}

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the backend, without trailing path
    pub base_url: String,
    /// Request timeout
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    /// Retry configuration for health probes
    pub retry: RetryConfig,
    /// Current environment
    pub environment: Environment,
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl ClientConfig {
    /// Create configuration from environment variables
    ///
    /// Reads the following environment variables:
    /// - `IMGHOST_API_URL`: Base URL of the backend
    /// - `IMGHOST_ENV`: Environment (development/staging/production)
    /// - `IMGHOST_TIMEOUT_SECS`: Request timeout in seconds
    pub fn from_env() -> ApiResult<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars<F>(var: F) -> ApiResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = Environment::parse(&var("IMGHOST_ENV").unwrap_or_default());
        let mut config = match environment {
            Environment::Development => Self::development(),
            Environment::Staging => Self::staging(),
            Environment::Production => Self::production(),
        };

        if let Some(url) = var("IMGHOST_API_URL").filter(|u| !u.trim().is_empty()) {
            config = config.with_base_url(url);
        }

        if let Some(secs) = var("IMGHOST_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|_| ApiError::config(format!("IMGHOST_TIMEOUT_SECS is not a number: {secs}")))?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Create development configuration (local backend)
    #[must_use]
    pub fn development() -> Self {
        Self {
            base_url: DEVELOPMENT_API_URL.to_string(),
            timeout: Duration::from_secs(10),
            retry: Environment::Development.retry_config(),
            environment: Environment::Development,
        }
    }

    /// Create staging configuration
    #[must_use]
    pub fn staging() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(30),
            retry: Environment::Staging.retry_config(),
            environment: Environment::Staging,
        }
    }

    /// Create production configuration
    #[must_use]
    pub fn production() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(60),
            retry: Environment::Production.retry_config(),
            environment: Environment::Production,
        }
    }

    /// Builder-style method to set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Builder-style method to set timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder-style method to set retry config
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Full URL of an endpoint path
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ApiResult<()> {
        if self.base_url.is_empty() {
            return Err(ApiError::config("base_url cannot be empty"));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ApiError::config("base_url must start with http:// or https://"));
        }

        if self.timeout.is_zero() {
            return Err(ApiError::config("timeout cannot be zero"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_API_URL);
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_from_vars() {
        let config = ClientConfig::from_vars(vars(&[
            ("IMGHOST_API_URL", "http://127.0.0.1:9000/"),
            ("IMGHOST_TIMEOUT_SECS", "5"),
            ("IMGHOST_ENV", "dev"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.retry.max_attempts, RetryConfig::quick().max_attempts);
    }

    #[test]
    fn test_from_vars_defaults() {
        let config = ClientConfig::from_vars(vars(&[("IMGHOST_ENV", "local")])).unwrap();
        assert_eq!(config.base_url, DEVELOPMENT_API_URL);
    }

    #[test]
    fn test_invalid_timeout() {
        let result = ClientConfig::from_vars(vars(&[("IMGHOST_TIMEOUT_SECS", "soon")]));
        assert!(matches!(result, Err(ApiError::Config(_))));
    }

    #[test]
    fn test_endpoint() {
        let config = ClientConfig::default().with_base_url("https://img.example.com/");
        assert_eq!(config.endpoint("/upload"), "https://img.example.com/upload");
        assert_eq!(config.endpoint("health"), "https://img.example.com/health");
    }

    #[test]
    fn test_validation() {
        assert!(ClientConfig::default().validate().is_ok());
        assert!(ClientConfig::default().with_base_url("").validate().is_err());
        assert!(ClientConfig::default().with_base_url("ftp://x").validate().is_err());
        assert!(ClientConfig::default()
            .with_timeout(Duration::ZERO)
            .validate()
            .is_err());
    }
}
