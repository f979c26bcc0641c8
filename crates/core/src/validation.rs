//! Selection and configuration validation
//!
//! Provides validation for:
//! - Configuration values
//! - The set of files a user selected for upload
//! - The requested link expiry
//!
//! # Example
//!
//! ```rust
//! use imghost_core::validation::{validate_selection, FileCandidate, SelectionLimits};
//!
//! let files = vec![FileCandidate::new("cat.png", "image/png", 2_048)];
//! let result = validate_selection(&files, Some(60), &SelectionLimits::default());
//!
//! assert!(result.is_valid());
//! ```

use crate::config::UploadConfig;
use crate::error::{Error, ErrorCode, Result};
use serde::{Deserialize, Serialize};

/// Validation error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field that failed validation
    pub field: String,
    /// Error message
    pub message: String,
    /// Error code
    pub code: String,
    /// Expected value (if applicable)
    pub expected: Option<String>,
    /// Actual value (if applicable)
    pub actual: Option<String>,
}

impl ValidationError {
    fn error_code(&self) -> ErrorCode {
        match self.code.as_str() {
            "EMPTY_SELECTION" => ErrorCode::EmptySelection,
            "TOO_MANY_FILES" => ErrorCode::TooManyFiles,
            "FILE_TOO_LARGE" => ErrorCode::FileTooLarge,
            "UNSUPPORTED_MEDIA_TYPE" => ErrorCode::UnsupportedMediaType,
            "EXPIRY_OUT_OF_RANGE" => ErrorCode::ExpiryOutOfRange,
            _ => ErrorCode::ValidationError,
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationError>,
}

impl ValidationResult {
    /// Create a new empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get all errors
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Get all warnings
    pub fn warnings(&self) -> &[ValidationError] {
        &self.warnings
    }

    /// Add an error
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Add a warning
    pub fn add_warning(&mut self, warning: ValidationError) {
        self.warnings.push(warning);
    }

    /// Merge another result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Convert to Result type
    ///
    /// The error code is taken from the first violated rule; the message
    /// lists all of them.
    pub fn to_result(self) -> Result<()> {
        let Some(first) = self.errors.first() else {
            return Ok(());
        };

        let messages: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        Err(Error::new(
            first.error_code(),
            format!("Validation failed: {}", messages.join("; ")),
        ))
    }
}

/// Fluent validator builder
pub struct Validator {
    result: ValidationResult,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Create a new validator
    pub fn new() -> Self {
        Self {
            result: ValidationResult::new(),
        }
    }

    /// Validate that a value is in a list of allowed values
    pub fn one_of(mut self, field: &str, value: &str, allowed: &[&str]) -> Self {
        if !allowed.contains(&value) {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: format!("Must be one of: {}", allowed.join(", ")),
                code: "ONE_OF".to_string(),
                expected: Some(allowed.join(", ")),
                actual: Some(value.to_string()),
            });
        }
        self
    }

    /// Validate a numeric range
    pub fn range<T: PartialOrd + std::fmt::Display>(
        mut self,
        field: &str,
        value: T,
        min: T,
        max: T,
    ) -> Self {
        if value < min || value > max {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message: format!("Must be between {} and {}", min, max),
                code: "RANGE".to_string(),
                expected: Some(format!("{} - {}", min, max)),
                actual: Some(value.to_string()),
            });
        }
        self
    }

    /// Fail with the given code when `condition` holds
    pub fn reject_if(mut self, field: &str, condition: bool, code: &str, message: String) -> Self {
        if condition {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message,
                code: code.to_string(),
                expected: None,
                actual: None,
            });
        }
        self
    }

    /// Add a custom validation
    pub fn custom<F>(mut self, field: &str, f: F) -> Self
    where
        F: FnOnce() -> Option<String>,
    {
        if let Some(message) = f() {
            self.result.add_error(ValidationError {
                field: field.to_string(),
                message,
                code: "CUSTOM".to_string(),
                expected: None,
                actual: None,
            });
        }
        self
    }

    /// Add a warning (non-blocking)
    pub fn warn_if(mut self, field: &str, condition: bool, message: &str) -> Self {
        if condition {
            self.result.add_warning(ValidationError {
                field: field.to_string(),
                message: message.to_string(),
                code: "WARNING".to_string(),
                expected: None,
                actual: None,
            });
        }
        self
    }

    /// Complete validation and return result
    pub fn validate(self) -> ValidationResult {
        self.result
    }
}

/// A file the user picked, described by what the validator needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCandidate {
    /// File name as shown to the user
    pub name: String,
    /// Declared media type, e.g. `image/png`
    pub media_type: String,
    /// Size in bytes
    pub size: u64,
}

impl FileCandidate {
    /// Describe a picked file
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            size,
        }
    }
}

/// Upload limits applied to a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionLimits {
    /// Largest accepted file in bytes
    pub max_file_size: u64,
    /// Most files per upload
    pub max_files: usize,
    /// Shortest link lifetime
    pub min_expiry_minutes: u32,
    /// Longest link lifetime
    pub max_expiry_minutes: u32,
}

impl Default for SelectionLimits {
    fn default() -> Self {
        Self::from(&UploadConfig::default())
    }
}

impl From<&UploadConfig> for SelectionLimits {
    fn from(config: &UploadConfig) -> Self {
        Self {
            max_file_size: config.max_file_size,
            max_files: config.max_files,
            min_expiry_minutes: config.min_expiry_minutes,
            max_expiry_minutes: config.max_expiry_minutes,
        }
    }
}

/// Whether a media type names an image (`image/*`)
pub fn is_image_media_type(media_type: &str) -> bool {
    media_type
        .trim()
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
}

/// Split items into (images, everything else), keeping order
pub fn partition_images<T, F>(items: Vec<T>, media_type: F) -> (Vec<T>, Vec<T>)
where
    F: Fn(&T) -> &str,
{
    items
        .into_iter()
        .partition(|item| is_image_media_type(media_type(item)))
}

/// Validate a selection against the upload limits
///
/// Every violated rule is reported, not just the first.
pub fn validate_selection(
    files: &[FileCandidate],
    expiry_minutes: Option<u32>,
    limits: &SelectionLimits,
) -> ValidationResult {
    let oversized = files.iter().filter(|f| f.size > limits.max_file_size).count();
    let non_images: Vec<&str> = files
        .iter()
        .filter(|f| !is_image_media_type(&f.media_type))
        .map(|f| f.name.as_str())
        .collect();

    let mut result = Validator::new()
        .reject_if(
            "files",
            files.is_empty(),
            "EMPTY_SELECTION",
            "No images selected".to_string(),
        )
        .reject_if(
            "files",
            oversized > 0,
            "FILE_TOO_LARGE",
            format!(
                "{} file(s) exceed the {} limit",
                oversized,
                format_limit(limits.max_file_size)
            ),
        )
        .reject_if(
            "files",
            files.len() > limits.max_files,
            "TOO_MANY_FILES",
            format!(
                "Maximum {} files allowed per upload, got {}",
                limits.max_files,
                files.len()
            ),
        )
        .reject_if(
            "files",
            !non_images.is_empty(),
            "UNSUPPORTED_MEDIA_TYPE",
            format!("Not an image: {}", non_images.join(", ")),
        )
        .validate();

    if let Some(minutes) = expiry_minutes {
        result.merge(validate_expiry(minutes, limits));
    }

    result
}

/// Validate a link expiry in minutes
pub fn validate_expiry(minutes: u32, limits: &SelectionLimits) -> ValidationResult {
    let (min, max) = (limits.min_expiry_minutes, limits.max_expiry_minutes);
    Validator::new()
        .reject_if(
            "expiry_minutes",
            minutes < min || minutes > max,
            "EXPIRY_OUT_OF_RANGE",
            format!("Must be between {} and {} minutes, got {}", min, max, minutes),
        )
        .validate()
}

fn format_limit(bytes: u64) -> String {
    const MB: u64 = 1024 * 1024;
    if bytes % MB == 0 {
        format!("{}MB", bytes / MB)
    } else {
        format!("{} byte", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MB: u64 = 1024 * 1024;

    fn png(name: &str, size: u64) -> FileCandidate {
        FileCandidate::new(name, "image/png", size)
    }

    #[test]
    fn test_validator_range() {
        let result = Validator::new().range("quality", 150, 1, 100).validate();

        assert!(!result.is_valid());
        assert_eq!(result.errors()[0].field, "quality");
    }

    #[test]
    fn test_validator_one_of() {
        let result = Validator::new()
            .one_of("format", "webp", &["webp", "jpeg"])
            .validate();
        assert!(result.is_valid());

        let result = Validator::new()
            .one_of("format", "tiff", &["webp", "jpeg"])
            .validate();
        assert!(!result.is_valid());
    }

    #[test]
    fn test_validator_warnings() {
        let result = Validator::new()
            .warn_if("quality", true, "Quality below 50 is visibly lossy")
            .validate();

        assert!(result.is_valid());
        assert_eq!(result.warnings().len(), 1);
    }

    #[test]
    fn test_media_type_filter() {
        assert!(is_image_media_type("image/png"));
        assert!(is_image_media_type("IMAGE/JPEG"));
        assert!(is_image_media_type("image/svg+xml"));
        assert!(!is_image_media_type("text/plain"));
        assert!(!is_image_media_type("application/octet-stream"));
        assert!(!is_image_media_type("image"));
        assert!(!is_image_media_type(""));
    }

    #[test]
    fn test_partition_images_keeps_order() {
        let files = vec![
            png("a.png", 1),
            FileCandidate::new("notes.txt", "text/plain", 1),
            FileCandidate::new("b.gif", "image/gif", 1),
        ];

        let (images, rest) = partition_images(files, |f| f.media_type.as_str());

        let names: Vec<_> = images.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a.png", "b.gif"]);
        assert_eq!(rest.len(), 1);
    }

    #[test]
    fn test_valid_selection() {
        let files: Vec<_> = (0..10).map(|i| png(&format!("{i}.png"), 15 * MB)).collect();
        let result = validate_selection(&files, Some(1440), &SelectionLimits::default());
        assert!(result.is_valid());
    }

    #[test]
    fn test_rejects_too_many_files() {
        let files: Vec<_> = (0..11).map(|i| png(&format!("{i}.png"), 10)).collect();

        let err = validate_selection(&files, None, &SelectionLimits::default())
            .to_result()
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::TooManyFiles);
        assert!(err.message.contains("Maximum 10 files"));
    }

    #[test]
    fn test_reports_oversized_count() {
        let files = vec![png("a.png", 15 * MB + 1), png("b.png", 10), png("c.png", 20 * MB)];

        let err = validate_selection(&files, None, &SelectionLimits::default())
            .to_result()
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::FileTooLarge);
        assert!(err.message.contains("2 file(s) exceed the 15MB limit"));
    }

    #[test]
    fn test_rejects_empty_selection() {
        let err = validate_selection(&[], None, &SelectionLimits::default())
            .to_result()
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptySelection);
    }

    #[test]
    fn test_rejects_non_images() {
        let files = vec![FileCandidate::new("notes.txt", "text/plain", 10)];
        let err = validate_selection(&files, None, &SelectionLimits::default())
            .to_result()
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedMediaType);
        assert!(err.message.contains("notes.txt"));
    }

    #[test]
    fn test_expiry_bounds() {
        let limits = SelectionLimits::default();
        assert!(validate_expiry(5, &limits).is_valid());
        assert!(validate_expiry(1440, &limits).is_valid());
        assert!(!validate_expiry(4, &limits).is_valid());
        assert!(!validate_expiry(1441, &limits).is_valid());
    }

    #[test]
    fn test_every_violation_is_listed() {
        let files: Vec<_> = (0..12).map(|i| png(&format!("{i}.png"), 16 * MB)).collect();

        let result = validate_selection(&files, Some(0), &SelectionLimits::default());

        let codes: Vec<_> = result.errors().iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, ["FILE_TOO_LARGE", "TOO_MANY_FILES", "EXPIRY_OUT_OF_RANGE"]);
    }

    #[test]
    fn test_oversized_files_reported_before_count() {
        let files: Vec<_> = (0..11).map(|i| png(&format!("{i}.png"), 20 * MB)).collect();

        let err = validate_selection(&files, None, &SelectionLimits::default())
            .to_result()
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::FileTooLarge);
        assert!(err.message.starts_with("Validation failed: files: 11 file(s) exceed"));
    }
}
