//! Adaptive image preprocessing.
//!
//! Each selected image is decoded, downscaled when its longer side exceeds
//! the configured maximum, and re-encoded at a fixed quality. The re-encoded
//! candidate replaces the original only when it is strictly smaller.
//!
//! The operation cannot fail: whenever a step goes wrong the original bytes are
//! handed back unchanged, so a compression problem never blocks an upload.

use crate::codec::{ImageCodec, RasterCodec};
use crate::dimensions::{target_dimensions, Dimensions, DEFAULT_MAX_DIMENSION};
use crate::source::{KeepReason, ProcessedImage, SourceImage, Stage};
use crate::{ImageError, ImageFormat};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Options for preprocessing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessOptions {
    /// Longest side allowed before downscaling (0 disables downscaling)
    pub max_dimension: u32,
    /// Encoder quality (1-100)
    pub quality: u8,
    /// Output format of re-encoded candidates
    pub format: ImageFormat,
    /// Leave GIF inputs untouched so animations survive
    pub preserve_gif: bool,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            max_dimension: DEFAULT_MAX_DIMENSION,
            quality: 85,
            format: ImageFormat::WebP,
            preserve_gif: false,
        }
    }
}

/// Preprocess an image with the default codec.
///
/// # Example
/// ```
/// use imghost_image::{preprocess, PreprocessOptions, SourceImage};
///
/// let source = SourceImage::new("notes.txt", "text/plain", b"not an image".to_vec());
/// let processed = preprocess(source.clone(), &PreprocessOptions::default());
///
/// // Undecodable input comes back untouched.
/// assert_eq!(processed.bytes(), source.bytes());
/// assert_eq!(processed.name(), "notes.txt");
/// ```
pub fn preprocess(source: SourceImage, options: &PreprocessOptions) -> ProcessedImage {
    preprocess_with(&ImageCodec::default(), source, options)
}

/// Preprocess an image with a specific codec.
pub fn preprocess_with<C>(codec: &C, source: SourceImage, options: &PreprocessOptions) -> ProcessedImage
where
    C: RasterCodec + ?Sized,
{
    if options.preserve_gif && is_gif(&source) {
        debug!(name = %source.name(), "GIF passthrough");
        return ProcessedImage::original(source, KeepReason::Passthrough);
    }

    let candidate = match encode_candidate(codec, &source, options) {
        Ok(candidate) => candidate,
        Err((stage, error)) => {
            debug!(name = %source.name(), ?stage, %error, "Preprocessing failed, keeping original");
            return ProcessedImage::original(
                source,
                KeepReason::Failed {
                    stage,
                    message: error.to_string(),
                },
            );
        }
    };

    let original_len = source.len();
    let candidate_len = candidate.bytes.len();

    if candidate_len < original_len {
        debug!(
            name = %source.name(),
            original_bytes = original_len,
            processed_bytes = candidate_len,
            reduction_pct = reduction_percent(original_len, candidate_len),
            from = %candidate.source,
            to = %candidate.target,
            "Compressed"
        );
        ProcessedImage::compressed(&source, options.format, candidate.bytes, candidate.source, candidate.target)
    } else {
        debug!(
            name = %source.name(),
            original_bytes = original_len,
            candidate_bytes = candidate_len,
            "Re-encoding not smaller, keeping original"
        );
        ProcessedImage::original(
            source,
            KeepReason::NotSmaller {
                target: candidate.target,
                candidate_bytes: candidate_len,
            },
        )
    }
}

/// Percentage of bytes removed going from `original` to `processed`.
pub fn reduction_percent(original: usize, processed: usize) -> f64 {
    if original == 0 {
        return 0.0;
    }
    (original as f64 - processed as f64) / original as f64 * 100.0
}

struct Candidate {
    bytes: Bytes,
    source: Dimensions,
    target: Dimensions,
}

fn encode_candidate<C>(
    codec: &C,
    source: &SourceImage,
    options: &PreprocessOptions,
) -> Result<Candidate, (Stage, ImageError)>
where
    C: RasterCodec + ?Sized,
{
    let raster = codec.decode(source.bytes()).map_err(|e| (Stage::Decode, e))?;
    let source_dims = Dimensions::new(raster.width(), raster.height());
    let target = target_dimensions(source_dims.width, source_dims.height, options.max_dimension);

    let rendered = codec.render(raster, target).map_err(|e| (Stage::Render, e))?;

    let encoded = codec
        .encode(&rendered, options.format, options.quality)
        .map_err(|e| (Stage::Encode, e))?;
    if encoded.is_empty() {
        return Err((Stage::Encode, ImageError::Encode("encoder produced no data".into())));
    }

    Ok(Candidate {
        bytes: Bytes::from(encoded),
        source: source_dims,
        target,
    })
}

fn is_gif(source: &SourceImage) -> bool {
    source.media_type().eq_ignore_ascii_case(ImageFormat::Gif.mime_type())
        || source.bytes().starts_with(b"GIF8")
}
