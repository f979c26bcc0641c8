//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, ErrorCode, Result, ResultExt};
use crate::validation::{ValidationResult, Validator};
use std::path::{Path, PathBuf};

/// Project-local config file names, checked in order
const LOCAL_CANDIDATES: [&str; 2] = ["imghost.toml", ".imghost.toml"];

/// Output formats the preprocessor can produce
pub const OUTPUT_FORMATS: [&str; 3] = ["webp", "jpeg", "jpg"];

/// Configuration wrapper
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed settings, defaults filled in
    pub schema: ConfigSchema,
    /// File the settings came from; `None` when running on defaults
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from an explicit path, or discover one, or use defaults.
    ///
    /// An explicit path that does not exist is an error; a missing discovered
    /// file just means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) if !p.exists() => return Err(Error::config_not_found(p)),
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(Path::new(".")),
        };

        let schema = match &config_path {
            Some(p) => load_config_file(p)?,
            None => ConfigSchema::default(),
        };

        let config = Self {
            schema,
            path: config_path,
        };
        config.validate().to_result().map_err(|e| {
            Error::new(ErrorCode::InvalidConfigValue, e.message)
                .with_suggestion("Fix the listed values in your imghost.toml")
        })?;

        tracing::debug!(path = ?config.path, "Configuration loaded");
        Ok(config)
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> ValidationResult {
        let p = &self.schema.preprocess;
        let u = &self.schema.upload;

        Validator::new()
            .range("preprocess.quality", p.quality, 1, 100)
            .range("preprocess.max_dimension", p.max_dimension, 1, 65_535)
            .one_of("preprocess.format", &p.format.to_ascii_lowercase(), &OUTPUT_FORMATS)
            .range("upload.max_files", u.max_files, 1, usize::MAX)
            .range("upload.max_file_size", u.max_file_size, 1, u64::MAX)
            .custom("upload.expiry", || {
                (u.min_expiry_minutes > u.max_expiry_minutes).then(|| {
                    format!(
                        "min_expiry_minutes ({}) exceeds max_expiry_minutes ({})",
                        u.min_expiry_minutes, u.max_expiry_minutes
                    )
                })
            })
            .range(
                "upload.default_expiry_minutes",
                u.default_expiry_minutes,
                u.min_expiry_minutes,
                u.max_expiry_minutes,
            )
            .one_of("logging.format", &self.schema.logging.format, &["text", "json"])
            .validate()
    }
}

/// The per-user config directory (`<config dir>/imghost`)
pub fn user_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("imghost"))
}

/// Find configuration file in standard locations
fn find_config_file(base: &Path) -> Option<PathBuf> {
    LOCAL_CANDIDATES
        .iter()
        .map(|name| base.join(name))
        .chain(user_config_dir().map(|d| d.join("config.toml")))
        .find(|candidate| candidate.is_file())
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &Path) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path)
        .map_err(Error::from)
        .context(format!("Failed to read config file {}", path.display()))?;

    let schema: ConfigSchema = toml::from_str(&content)
        .map_err(Error::from)
        .context(format!("Failed to parse config file {}", path.display()))?;

    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.path.is_none());
        assert_eq!(config.schema.preprocess.max_dimension, 2500);
        assert_eq!(config.schema.preprocess.quality, 85);
        assert_eq!(config.schema.upload.max_files, 10);
        assert_eq!(config.schema.upload.max_file_size, 15 * 1024 * 1024);
        assert_eq!(config.schema.upload.default_expiry_minutes, 1440);
        assert!(config.validate().is_valid());
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("imghost.toml");
        fs::write(
            &path,
            "[preprocess]\nquality = 70\nformat = \"jpeg\"\n\n[upload]\nmax_files = 4\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();

        assert_eq!(config.path.as_deref(), Some(path.as_path()));
        assert_eq!(config.schema.preprocess.quality, 70);
        assert_eq!(config.schema.preprocess.format, "jpeg");
        assert_eq!(config.schema.preprocess.max_dimension, 2500);
        assert_eq!(config.schema.upload.max_files, 4);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let err = Config::load(Some(Path::new("/nonexistent/imghost.toml"))).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigNotFound);
    }

    #[test]
    fn test_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[preprocess\nquality = ").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigParseError);
        assert!(err.context.is_some());
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("imghost.toml");
        fs::write(&path, "[preprocess]\nquality = 0\nformat = \"avif\"\n").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfigValue);
        assert!(err.message.contains("preprocess.quality"));
        assert!(err.message.contains("preprocess.format"));
    }

    #[test]
    fn test_inverted_expiry_bounds_rejected() {
        let mut config = Config::default();
        config.schema.upload.min_expiry_minutes = 100;
        config.schema.upload.max_expiry_minutes = 10;
        assert!(!config.validate().is_valid());
    }

    #[test]
    fn test_find_local_config() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".imghost.toml"), "").unwrap();
        assert_eq!(
            find_config_file(dir.path()),
            Some(dir.path().join(".imghost.toml"))
        );

        fs::write(dir.path().join("imghost.toml"), "").unwrap();
        assert_eq!(
            find_config_file(dir.path()),
            Some(dir.path().join("imghost.toml"))
        );
    }
}
