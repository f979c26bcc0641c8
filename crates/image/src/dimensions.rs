//! Target raster calculation.
//!
//! An image whose sides both fit within the maximum dimension keeps its size.
//! Anything larger is scaled down so that its longer side equals the maximum;
//! the shorter side is scaled by the same ratio.

use serde::{Deserialize, Serialize};

/// Longest side, in pixels, an uploaded image is allowed to keep.
pub const DEFAULT_MAX_DIMENSION: u32 = 2500;

/// Pixel dimensions of a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Dimensions {
    /// Create a new pair of dimensions.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Length of the longer side.
    pub fn longer_side(&self) -> u32 {
        self.width.max(self.height)
    }

    /// Whether both sides are within `max_dimension`.
    pub fn fits_within(&self, max_dimension: u32) -> bool {
        self.width <= max_dimension && self.height <= max_dimension
    }

    /// Whether either side is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Calculate aspect ratio (width / height).
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Calculate the target raster for an image of `width` × `height`.
///
/// A `max_dimension` of zero disables downscaling.
///
/// # Example
/// ```
/// use imghost_image::{target_dimensions, Dimensions};
///
/// assert_eq!(target_dimensions(5000, 2500, 2500), Dimensions::new(2500, 1250));
/// assert_eq!(target_dimensions(800, 600, 2500), Dimensions::new(800, 600));
/// ```
pub fn target_dimensions(width: u32, height: u32, max_dimension: u32) -> Dimensions {
    let source = Dimensions::new(width, height);
    if max_dimension == 0 || source.is_empty() || source.fits_within(max_dimension) {
        return source;
    }

    if width > height {
        let ratio = max_dimension as f64 / width as f64;
        Dimensions::new(max_dimension, scale_side(height, ratio))
    } else {
        let ratio = max_dimension as f64 / height as f64;
        Dimensions::new(scale_side(width, ratio), max_dimension)
    }
}

fn scale_side(side: u32, ratio: f64) -> u32 {
    ((side as f64 * ratio).round() as u32).max(1)
}
