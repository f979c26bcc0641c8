//! Error types for the image crate.
//!
//! These errors never escape [`crate::preprocess`]; they surface only from the
//! lower-level helpers (format detection, file reading, codec steps).

use thiserror::Error;

/// Result type alias for image operations.
pub type Result<T> = std::result::Result<T, ImageError>;

/// Errors that can occur during image operations.
#[derive(Debug, Error)]
pub enum ImageError {
    /// Unknown image format
    #[error("Unknown image format")]
    UnknownFormat,

    /// Invalid image data
    #[error("Invalid image data: {0}")]
    InvalidData(String),

    /// The source could not be decoded into a raster
    #[error("Decode error: {0}")]
    Decode(String),

    /// No render surface of the requested size could be produced
    #[error("Render error: {0}")]
    Render(String),

    /// The raster could not be encoded into the output format
    #[error("Encode error: {0}")]
    Encode(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Image processing error
    #[cfg(feature = "processing")]
    #[error("Image processing error: {0}")]
    ProcessingError(#[from] image::ImageError),
}
