//! Core utilities for the imghost client
//!
//! This crate provides shared functionality used by the upload client and the CLI:
//!
//! - **Error handling**: errors with codes, context, recovery suggestions and exit codes
//! - **Configuration**: TOML-based configuration with validation
//! - **Validation**: upload selection rules (file count, size, media type, expiry)
//! - **Retry**: exponential backoff policy for idempotent requests
//! - **Settings**: the persisted UI theme behind a shared handle
//!
//! # Example
//!
//! ```rust,no_run
//! use imghost_core::config::Config;
//! use imghost_core::validation::{validate_selection, FileCandidate, SelectionLimits};
//!
//! let config = Config::load(None).expect("valid configuration");
//! let limits = SelectionLimits::from(&config.schema.upload);
//!
//! let files = vec![FileCandidate::new("cat.png", "image/png", 48_213)];
//! validate_selection(&files, Some(60), &limits)
//!     .to_result()
//!     .expect("selection within limits");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod retry;
pub mod settings;
pub mod validation;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{exit_codes, Error, ErrorCode, Result, ResultExt};
    pub use crate::retry::RetryConfig;
    pub use crate::settings::{SettingsStore, Theme};
    pub use crate::validation::{FileCandidate, SelectionLimits, ValidationResult, Validator};
}
