//! Endpoint-specific API implementations
//!
//! | Module | Backend route | Description |
//! |--------|---------------|-------------|
//! | `health` | `GET /health` | Database and storage status |
//! | `upload` | `POST /upload` | Multipart image upload |

pub mod health;
pub mod upload;

pub use health::{ComponentHealth, HealthApi, HealthResponse};
pub use upload::{UploadApi, UploadFile, UploadedImage};
