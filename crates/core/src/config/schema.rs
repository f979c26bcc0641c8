//! Configuration schema definitions

use serde::{Deserialize, Serialize};

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    /// `[preprocess]` table
    #[serde(default)]
    pub preprocess: PreprocessConfig,

    /// `[upload]` table
    #[serde(default)]
    pub upload: UploadConfig,

    /// `[logging]` table
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Local compression settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessConfig {
    /// Longest side in pixels before downscaling kicks in
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,

    /// Re-encoding quality (1-100)
    #[serde(default = "default_quality")]
    pub quality: u8,

    /// Output format name (`webp` or `jpeg`)
    #[serde(default = "default_format")]
    pub format: String,

    /// Pass GIFs through untouched
    #[serde(default)]
    pub preserve_gif: bool,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            max_dimension: default_max_dimension(),
            quality: default_quality(),
            format: default_format(),
            preserve_gif: false,
        }
    }
}

fn default_max_dimension() -> u32 {
    2500
}

fn default_quality() -> u8 {
    85
}

fn default_format() -> String {
    "webp".to_string()
}

/// Upload limits and backend location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Backend base URL; the `IMGHOST_API_URL` env var takes precedence
    #[serde(default)]
    pub api_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Largest accepted file in bytes
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Most files accepted per upload
    #[serde(default = "default_max_files")]
    pub max_files: usize,

    /// Link lifetime used when `--expiry` is not given
    #[serde(default = "default_expiry_minutes")]
    pub default_expiry_minutes: u32,

    /// Shortest accepted link lifetime
    #[serde(default = "default_min_expiry_minutes")]
    pub min_expiry_minutes: u32,

    /// Longest accepted link lifetime
    #[serde(default = "default_expiry_minutes")]
    pub max_expiry_minutes: u32,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            timeout_secs: default_timeout_secs(),
            max_file_size: default_max_file_size(),
            max_files: default_max_files(),
            default_expiry_minutes: default_expiry_minutes(),
            min_expiry_minutes: default_min_expiry_minutes(),
            max_expiry_minutes: default_expiry_minutes(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_file_size() -> u64 {
    15 * 1024 * 1024
}

fn default_max_files() -> usize {
    10
}

fn default_expiry_minutes() -> u32 {
    24 * 60
}

fn default_min_expiry_minutes() -> u32 {
    5
}

/// Logging output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level filter; `RUST_LOG` overrides it
    #[serde(default = "default_level")]
    pub level: String,

    /// `text` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Optional log file, written in addition to stderr
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

fn default_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}
