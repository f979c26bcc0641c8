//! Input and output payloads of the preprocessor.

use crate::dimensions::Dimensions;
use crate::{detect_format, ImageFormat, Result};
use bytes::Bytes;
use serde::Serialize;
use std::path::Path;

/// Media type used when neither the content nor the extension is recognised.
pub const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// An image as selected by the user: raw bytes, declared media type and file name.
///
/// Cloning is cheap; the bytes are reference counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    name: String,
    media_type: String,
    bytes: Bytes,
}

impl SourceImage {
    /// Create a source image from its parts.
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk.
    ///
    /// The media type is taken from the magic bytes, then from the extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        let media_type = detect_format(&bytes)
            .ok()
            .or_else(|| {
                path.extension()
                    .and_then(|e| e.to_str())
                    .and_then(ImageFormat::from_extension)
            })
            .map_or(FALLBACK_MEDIA_TYPE, |f| f.mime_type());

        Ok(Self::new(name, media_type, bytes))
    }

    /// File name as selected.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared media type.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Raw bytes.
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Byte length.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether the declared media type is an image type.
    pub fn is_image(&self) -> bool {
        self.media_type
            .get(..6)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
    }
}

/// Step of the preprocessing pipeline that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Decoding the source into a raster
    Decode,
    /// Rendering the raster at its target size
    Render,
    /// Encoding the rendered raster
    Encode,
    /// The worker running the pipeline did not finish
    Worker,
}

/// Why the original bytes were kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum KeepReason {
    /// The re-encoded candidate was not strictly smaller.
    NotSmaller {
        /// Raster the candidate was rendered at
        target: Dimensions,
        /// Candidate size in bytes
        candidate_bytes: usize,
    },
    /// The input format is configured to pass through untouched.
    Passthrough,
    /// A pipeline step failed; the original is used instead.
    Failed {
        /// Failing step
        stage: Stage,
        /// Error description
        message: String,
    },
}

/// How a [`ProcessedImage`] was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// The re-encoded candidate replaced the original.
    Compressed {
        /// Dimensions of the decoded source
        source: Dimensions,
        /// Dimensions of the output raster
        target: Dimensions,
        /// Byte length of the original payload
        original_bytes: usize,
    },
    /// The original payload was kept.
    Original(KeepReason),
}

/// The payload handed to the upload step.
///
/// Its byte length never exceeds that of the [`SourceImage`] it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedImage {
    name: String,
    media_type: String,
    bytes: Bytes,
    outcome: Outcome,
}

impl ProcessedImage {
    /// Keep the original source untouched.
    pub fn original(source: SourceImage, reason: KeepReason) -> Self {
        Self {
            name: source.name,
            media_type: source.media_type,
            bytes: source.bytes,
            outcome: Outcome::Original(reason),
        }
    }

    /// Replace the source with a smaller re-encoded candidate.
    pub(crate) fn compressed(
        source: &SourceImage,
        format: ImageFormat,
        bytes: Bytes,
        source_dims: Dimensions,
        target: Dimensions,
    ) -> Self {
        Self {
            name: replace_extension(&source.name, format.extension()),
            media_type: format.mime_type().to_string(),
            bytes,
            outcome: Outcome::Compressed {
                source: source_dims,
                target,
                original_bytes: source.len(),
            },
        }
    }

    /// File name (extension rewritten when re-encoded).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Media type of the payload.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Payload bytes.
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Payload length.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// How this payload was produced.
    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// Whether the payload is a re-encoded candidate.
    pub fn is_compressed(&self) -> bool {
        matches!(self.outcome, Outcome::Compressed { .. })
    }

    /// Byte length of the input this payload was produced from.
    pub fn original_len(&self) -> usize {
        match self.outcome {
            Outcome::Compressed { original_bytes, .. } => original_bytes,
            Outcome::Original(_) => self.len(),
        }
    }

    /// Bytes saved relative to the input.
    pub fn saved_bytes(&self) -> usize {
        self.original_len().saturating_sub(self.len())
    }

    /// Consume into the payload bytes.
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

/// Replace the final extension of `name` with `extension`.
///
/// Names without an extension get one appended.
pub fn replace_extension(name: &str, extension: &str) -> String {
    let stem = match name.rfind('.') {
        Some(idx) => &name[..idx],
        None => name,
    };
    format!("{stem}.{extension}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_replace_extension() {
        assert_eq!(replace_extension("photo.png", "webp"), "photo.webp");
        assert_eq!(replace_extension("archive.tar.jpeg", "webp"), "archive.tar.webp");
        assert_eq!(replace_extension("image", "webp"), "image.webp");
        assert_eq!(replace_extension("trailing.", "webp"), "trailing.webp");
    }

    #[test]
    fn test_is_image() {
        assert!(SourceImage::new("a.png", "image/png", vec![1]).is_image());
        assert!(SourceImage::new("a.png", "IMAGE/PNG", vec![1]).is_image());
        assert!(!SourceImage::new("a.txt", "text/plain", vec![1]).is_image());
        assert!(!SourceImage::new("a", "", vec![1]).is_image());
    }

    #[test]
    fn test_from_path_sniffs_content() {
        let mut file = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
        file.write_all(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00]).unwrap();

        let source = SourceImage::from_path(file.path()).unwrap();
        assert_eq!(source.media_type(), "image/png");
        assert_eq!(source.len(), 9);
        assert!(source.name().ends_with(".jpg"));
    }

    #[test]
    fn test_from_path_falls_back_to_extension() {
        let mut file = tempfile::Builder::new().suffix(".heic").tempfile().unwrap();
        file.write_all(b"not really").unwrap();

        let source = SourceImage::from_path(file.path()).unwrap();
        assert_eq!(source.media_type(), "image/heic");
    }

    #[test]
    fn test_original_keeps_everything() {
        let source = SourceImage::new("cat.gif", "image/gif", vec![1, 2, 3]);
        let processed = ProcessedImage::original(source.clone(), KeepReason::Passthrough);

        assert_eq!(processed.name(), "cat.gif");
        assert_eq!(processed.media_type(), "image/gif");
        assert_eq!(processed.bytes(), source.bytes());
        assert_eq!(processed.saved_bytes(), 0);
        assert!(!processed.is_compressed());
    }

    #[test]
    fn test_compressed_renames_and_reports_savings() {
        let source = SourceImage::new("cat.png", "image/png", vec![0u8; 100]);
        let processed = ProcessedImage::compressed(
            &source,
            ImageFormat::WebP,
            Bytes::from_static(&[1, 2, 3]),
            Dimensions::new(10, 10),
            Dimensions::new(10, 10),
        );

        assert_eq!(processed.name(), "cat.webp");
        assert_eq!(processed.media_type(), "image/webp");
        assert_eq!(processed.original_len(), 100);
        assert_eq!(processed.saved_bytes(), 97);
    }
}
