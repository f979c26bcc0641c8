//! Image preprocessing for imghost uploads.
//!
//! This crate provides:
//! - Format detection from magic bytes
//! - Header metadata extraction (no pixel decode)
//! - EXIF orientation, applied on decode
//! - Target raster calculation for oversized images
//! - Adaptive preprocessing: downscale, re-encode, keep whichever is smaller
//! - Concurrent batch preprocessing with input order preserved

#![warn(missing_docs)]

mod detect;
mod dimensions;
mod error;
mod metadata;
mod orientation;
mod source;

#[cfg(feature = "processing")]
mod codec;

#[cfg(feature = "processing")]
mod preprocess;

#[cfg(any(feature = "async", feature = "parallel"))]
mod batch;

pub use detect::{detect_format, ImageFormat};
pub use dimensions::{target_dimensions, Dimensions, DEFAULT_MAX_DIMENSION};
pub use error::{ImageError, Result};
pub use metadata::{extract_metadata, ImageMetadata};
pub use orientation::Orientation;
pub use source::{
    replace_extension, KeepReason, Outcome, ProcessedImage, SourceImage, Stage, FALLBACK_MEDIA_TYPE,
};

#[cfg(feature = "processing")]
pub use codec::{has_alpha_channel, ImageCodec, RasterCodec};

#[cfg(feature = "processing")]
pub use preprocess::{preprocess, preprocess_with, reduction_percent, PreprocessOptions};

#[cfg(feature = "async")]
pub use batch::{preprocess_all, preprocess_all_with};

#[cfg(feature = "parallel")]
pub use batch::{preprocess_batch, preprocess_batch_with};
