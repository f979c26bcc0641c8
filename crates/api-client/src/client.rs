//! Main API client implementation

use crate::config::ClientConfig;
use crate::endpoints::{HealthApi, UploadApi};
use crate::error::{ApiError, ApiResult};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

/// Request correlation ID header
pub const X_REQUEST_ID: &str = "X-Request-ID";

/// imghost backend client
///
/// Cheap to clone; clones share the connection pool. Idempotent requests are
/// retried with exponential backoff, uploads are sent exactly once.
#[derive(Clone)]
pub struct ImghostClient {
    inner: Client,
    config: Arc<ClientConfig>,
}

impl ImghostClient {
    /// Create a new client with configuration from environment
    pub fn new() -> ApiResult<Self> {
        let config = ClientConfig::from_env()?;
        Self::with_config(config)
    }

    /// Create a new client with specific configuration
    pub fn with_config(config: ClientConfig) -> ApiResult<Self> {
        config.validate()?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("imghost-client/", env!("CARGO_PKG_VERSION"))),
        );

        let inner = Client::builder()
            .timeout(config.timeout)
            .default_headers(default_headers)
            .build()
            .map_err(ApiError::Request)?;

        Ok(Self {
            inner,
            config: Arc::new(config),
        })
    }

    /// Get the current configuration
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Access the health endpoint
    #[must_use]
    pub fn health(&self) -> HealthApi {
        HealthApi::new(self.clone())
    }

    /// Access the upload endpoint
    #[must_use]
    pub fn upload(&self) -> UploadApi {
        UploadApi::new(self.clone())
    }

    /// Start a request to `path` tagged with a correlation id
    pub(crate) fn request(&self, method: Method, path: &str, request_id: &str) -> RequestBuilder {
        self.inner
            .request(method, self.config.endpoint(path))
            .header(X_REQUEST_ID, request_id)
    }

    /// Run `attempt` until it succeeds, fails permanently or the retry budget
    /// runs out
    pub(crate) async fn with_retry<T, F, Fut>(&self, request_id: &str, mut attempt: F) -> ApiResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ApiResult<T>>,
    {
        let retry_config = &self.config.retry;
        let max_attempts = retry_config.max_attempts.max(1);

        for n in 0..max_attempts {
            // Wait before retry (except first attempt)
            if n > 0 {
                let delay = retry_config.delay_for_attempt(n);
                debug!(
                    request_id = %request_id,
                    attempt = n,
                    delay_ms = delay.as_millis() as u64,
                    "Retrying after delay"
                );
                tokio::time::sleep(delay).await;
            }

            let start = Instant::now();
            match attempt().await {
                Ok(value) => {
                    debug!(
                        request_id = %request_id,
                        attempt = n + 1,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "Request succeeded"
                    );
                    return Ok(value);
                }
                Err(e) if e.is_retryable() && n + 1 < max_attempts => {
                    debug!(
                        request_id = %request_id,
                        attempt = n + 1,
                        error = %e,
                        "Request failed, will retry"
                    );
                }
                Err(e) if e.is_retryable() && max_attempts > 1 => {
                    warn!(
                        request_id = %request_id,
                        attempts = max_attempts,
                        error = %e,
                        "Giving up after retries"
                    );
                    return Err(ApiError::RetriesExhausted {
                        attempts: max_attempts,
                        last_error: e.to_string(),
                    });
                }
                Err(e) => {
                    debug!(
                        request_id = %request_id,
                        attempt = n + 1,
                        error = %e,
                        "Request failed, not retrying"
                    );
                    return Err(e);
                }
            }
        }

        Err(ApiError::RetriesExhausted {
            attempts: max_attempts,
            last_error: "no attempt made".to_string(),
        })
    }

    /// Deserialize a successful response, or turn the body into an error
    pub(crate) async fn handle_response<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(ApiError::Request)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_body(status.as_u16(), &body))
        }
    }
}

/// Fresh correlation id
pub(crate) fn new_request_id() -> String {
    Uuid::new_v4().to_string()
}
