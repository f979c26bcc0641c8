//! HTTP client for the imghost backend
//!
//! # Features
//!
//! - **Environment-based configuration**: `IMGHOST_API_URL`, `IMGHOST_ENV`, `IMGHOST_TIMEOUT_SECS`
//! - **Multipart upload with progress**: one request per selection, progress as the body streams
//! - **Health probe**: degraded (503) bodies are parsed, transient failures retried with backoff
//! - **Request correlation**: every request carries an `X-Request-ID`
//!
//! # Example
//!
//! ```rust,no_run
//! use imghost_api_client::{ImghostClient, UploadFile};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ImghostClient::new()?;
//!
//!     let health = client.health().check().await?;
//!     println!("Service status: {}", health.status);
//!
//!     let file = UploadFile::new("cat.webp", "image/webp", std::fs::read("cat.webp")?);
//!     for image in client.upload().send(vec![file], Some(60)).await? {
//!         println!("{}", image.url);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod progress;

pub use client::ImghostClient;
pub use config::{ClientConfig, Environment};
pub use endpoints::{HealthResponse, UploadFile, UploadedImage};
pub use error::{ApiError, ApiResult};
pub use progress::{ProgressCallback, UploadProgress};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::client::ImghostClient;
    pub use crate::config::{ClientConfig, Environment};
    pub use crate::endpoints::{HealthApi, UploadApi, UploadFile, UploadedImage};
    pub use crate::error::{ApiError, ApiResult};
    pub use crate::progress::{ProgressCallback, UploadProgress};
}
