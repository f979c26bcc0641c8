//! Health check endpoint

use crate::client::{new_request_id, ImghostClient};
use crate::error::{ApiError, ApiResult};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Health check API interface
#[derive(Clone)]
pub struct HealthApi {
    client: ImghostClient,
}

impl HealthApi {
    /// Create a new health API interface
    pub(crate) fn new(client: ImghostClient) -> Self {
        Self { client }
    }

    /// Query `GET /health`
    ///
    /// A 503 carrying a health body is a valid answer (the service is up but
    /// degraded) and is returned as such. Connection failures and other server
    /// errors are retried.
    pub async fn check(&self) -> ApiResult<HealthResponse> {
        let request_id = new_request_id();
        self.client
            .with_retry(&request_id, || self.probe(&request_id))
            .await
    }

    /// Check health with timing information
    pub async fn check_timed(&self) -> ApiResult<(HealthResponse, Duration)> {
        let start = Instant::now();
        let response = self.check().await?;
        Ok((response, start.elapsed()))
    }

    async fn probe(&self, request_id: &str) -> ApiResult<HealthResponse> {
        let response = self
            .client
            .request(Method::GET, "health", request_id)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::SERVICE_UNAVAILABLE {
            let body = response.text().await.unwrap_or_default();
            return serde_json::from_str(&body)
                .map_err(|_| ApiError::from_body(status.as_u16(), &body));
        }

        ImghostClient::handle_response(response).await
    }
}

/// Health check response from the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `OK` or `UNAVAILABLE`
    pub status: String,
    /// Seconds since the backend started
    #[serde(default)]
    pub uptime_seconds: Option<u64>,
    /// Database connectivity
    #[serde(default)]
    pub database: Option<ComponentHealth>,
    /// Object storage connectivity
    #[serde(default)]
    pub storage: Option<ComponentHealth>,
}

impl HealthResponse {
    /// Whether the backend reports itself fully operational
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }

    /// Named components, for display
    pub fn components(&self) -> impl Iterator<Item = (&'static str, &ComponentHealth)> {
        [("database", self.database.as_ref()), ("storage", self.storage.as_ref())]
            .into_iter()
            .filter_map(|(name, component)| component.map(|c| (name, c)))
    }
}

/// Status of one backend dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// `OK` or `FAIL`
    pub status: String,
    /// Diagnostic message
    #[serde(default)]
    pub message: Option<String>,
}

impl ComponentHealth {
    /// Whether this component is operational
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}
