//! Raster decode, render and encode facility used by the preprocessor.

use crate::dimensions::Dimensions;
use crate::{ImageError, ImageFormat, Orientation, Result};
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, ImageOutputFormat};
use std::io::Cursor;

/// Host facility that turns bytes into rasters and rasters back into bytes.
///
/// The preprocessor only talks to this trait, so any step can be swapped out
/// (or made to fail) without touching the pipeline itself.
pub trait RasterCodec: Send + Sync {
    /// Decode raw image bytes into a raster.
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage>;

    /// Draw `raster` onto a surface of `target` size.
    fn render(&self, raster: DynamicImage, target: Dimensions) -> Result<DynamicImage>;

    /// Encode a raster into `format` at `quality` (1-100).
    fn encode(&self, raster: &DynamicImage, format: ImageFormat, quality: u8) -> Result<Vec<u8>>;
}

/// Default codec backed by the `image` crate, with libwebp for lossy WebP.
#[derive(Debug, Clone, Copy)]
pub struct ImageCodec {
    filter: FilterType,
}

impl Default for ImageCodec {
    fn default() -> Self {
        Self {
            filter: FilterType::Lanczos3,
        }
    }
}

impl ImageCodec {
    /// Codec with a custom resampling filter.
    pub fn with_filter(filter: FilterType) -> Self {
        Self { filter }
    }
}

impl RasterCodec for ImageCodec {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage> {
        let raster = image::load_from_memory(bytes).map_err(|e| ImageError::Decode(e.to_string()))?;
        Ok(Orientation::read(bytes).apply(raster))
    }

    fn render(&self, raster: DynamicImage, target: Dimensions) -> Result<DynamicImage> {
        if target.is_empty() {
            return Err(ImageError::Render(format!("cannot allocate a {target} surface")));
        }

        if raster.width() == target.width && raster.height() == target.height {
            return Ok(raster);
        }

        Ok(raster.resize_exact(target.width, target.height, self.filter))
    }

    fn encode(&self, raster: &DynamicImage, format: ImageFormat, quality: u8) -> Result<Vec<u8>> {
        let quality = quality.clamp(1, 100);

        match format {
            ImageFormat::WebP => encode_webp(raster, quality),
            ImageFormat::Jpeg => encode_jpeg(raster, quality),
            ImageFormat::Png => {
                let mut buffer = Cursor::new(Vec::new());
                raster.write_to(&mut buffer, ImageOutputFormat::Png)?;
                Ok(buffer.into_inner())
            }
            other => Err(ImageError::Encode(format!("Unsupported output format: {other:?}"))),
        }
    }
}

fn encode_webp(raster: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let (width, height) = (raster.width(), raster.height());

    let memory = if has_alpha_channel(raster) {
        let rgba = raster.to_rgba8();
        webp::Encoder::from_rgba(&rgba, width, height).encode_simple(false, f32::from(quality))
    } else {
        let rgb = raster.to_rgb8();
        webp::Encoder::from_rgb(&rgb, width, height).encode_simple(false, f32::from(quality))
    }
    .map_err(|e| ImageError::Encode(format!("WebP encoding failed: {e:?}")))?;

    Ok(memory.to_vec())
}

fn encode_jpeg(raster: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    // JPEG has no alpha; transparent pixels flatten to their colour channels.
    let rgb = raster.to_rgb8();
    let mut buffer = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality).encode(
        rgb.as_raw(),
        rgb.width(),
        rgb.height(),
        ColorType::Rgb8,
    )?;
    Ok(buffer)
}

/// Check if an image has an alpha channel
pub fn has_alpha_channel(img: &DynamicImage) -> bool {
    img.color().has_alpha()
}
