//! Error types for the API client

use serde::Deserialize;
use thiserror::Error;

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// API client errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// API returned an error response
    #[error("API error ({status}): {message}")]
    ApiResponse {
        /// HTTP status code
        status: u16,
        /// Error message from API
        message: String,
    },

    /// Nothing to upload
    #[error("No files to upload")]
    EmptyUpload,

    /// All retry attempts exhausted
    #[error("All {attempts} retry attempts failed: {last_error}")]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
        /// Last error message
        last_error: String,
    },
}

impl ApiError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an API response error
    pub fn api_response(status: u16, message: impl Into<String>) -> Self {
        Self::ApiResponse {
            status,
            message: message.into(),
        }
    }

    /// Build an API response error from a raw error body
    ///
    /// FastAPI-style `{"detail": ...}` bodies are reduced to their message;
    /// anything else is kept verbatim.
    pub fn from_body(status: u16, body: &str) -> Self {
        let message = match serde_json::from_str::<ErrorBody>(body) {
            Ok(ErrorBody { detail: Detail::Message(msg) }) => msg,
            Ok(ErrorBody { detail: Detail::Items(items) }) => items
                .into_iter()
                .map(|item| item.msg)
                .collect::<Vec<_>>()
                .join("; "),
            Err(_) if body.trim().is_empty() => "Unknown error".to_string(),
            Err(_) => body.trim().to_string(),
        };
        Self::api_response(status, message)
    }

    /// Check if this error is retryable
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(e) => {
                // Retry on connection errors, timeouts
                e.is_connect() || e.is_timeout()
            }
            Self::ApiResponse { status, .. } => {
                // Retry on 5xx errors and 429 (rate limited)
                *status >= 500 || *status == 429
            }
            Self::Config(_) | Self::Json(_) | Self::EmptyUpload | Self::RetriesExhausted { .. } => {
                false
            }
        }
    }

    /// Check if this is a client error (4xx)
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiResponse { status, .. } if (400..500).contains(status))
    }

    /// Check if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiResponse { status, .. } if *status >= 500)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Detail,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Detail {
    Message(String),
    Items(Vec<DetailItem>),
}

#[derive(Deserialize)]
struct DetailItem {
    msg: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(err: &ApiError) -> &str {
        match err {
            ApiError::ApiResponse { message, .. } => message,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_detail_string() {
        let err = ApiError::from_body(413, r#"{"detail":"File 'cat.png' is too large (Max 5MB)"}"#);
        assert_eq!(message(&err), "File 'cat.png' is too large (Max 5MB)");
        assert!(err.is_client_error());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_detail_validation_items() {
        let body = r#"{"detail":[{"loc":["body","files"],"msg":"Field required","type":"missing"}]}"#;
        let err = ApiError::from_body(422, body);
        assert_eq!(message(&err), "Field required");
    }

    #[test]
    fn test_plain_body() {
        assert_eq!(message(&ApiError::from_body(502, "Bad Gateway\n")), "Bad Gateway");
        assert_eq!(message(&ApiError::from_body(500, "")), "Unknown error");
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(ApiError::api_response(503, "down").is_retryable());
        assert!(ApiError::api_response(429, "slow down").is_retryable());
        assert!(ApiError::api_response(503, "down").is_server_error());
        assert!(!ApiError::api_response(404, "missing").is_retryable());
        assert!(!ApiError::EmptyUpload.is_retryable());
    }
}
