//! Image metadata sniffed from file headers, without decoding pixels.

use crate::dimensions::{target_dimensions, Dimensions};
use crate::{detect_format, ImageFormat, Orientation};
use serde::{Deserialize, Serialize};

/// Image metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageMetadata {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Detected format
    pub format: ImageFormat,
    /// File size in bytes
    pub size_bytes: usize,
}

impl ImageMetadata {
    /// Pixel dimensions.
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    /// Calculate aspect ratio (width / height).
    pub fn aspect_ratio(&self) -> f64 {
        self.dimensions().aspect_ratio()
    }

    /// Check if image is landscape orientation.
    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }

    /// Check if image is portrait orientation.
    pub fn is_portrait(&self) -> bool {
        self.height > self.width
    }

    /// Raster the preprocessor would render this image into.
    pub fn target_dimensions(&self, max_dimension: u32) -> Dimensions {
        target_dimensions(self.width, self.height, max_dimension)
    }

    /// Whether preprocessing would downscale this image.
    pub fn needs_resize(&self, max_dimension: u32) -> bool {
        self.target_dimensions(max_dimension) != self.dimensions()
    }
}

/// Extract metadata from image data.
///
/// Supports JPEG, PNG, GIF and WebP headers; other formats return `None`.
/// Dimensions are reported as displayed, after the EXIF orientation.
pub fn extract_metadata(data: &[u8]) -> Option<ImageMetadata> {
    let format = detect_format(data).ok()?;

    let (mut width, mut height) = match format {
        ImageFormat::Jpeg => extract_jpeg_dimensions(data)?,
        ImageFormat::Png => extract_png_dimensions(data)?,
        ImageFormat::Gif => extract_gif_dimensions(data)?,
        ImageFormat::WebP => extract_webp_dimensions(data)?,
        _ => return None,
    };

    if Orientation::read(data).swaps_dimensions() {
        std::mem::swap(&mut width, &mut height);
    }

    Some(ImageMetadata {
        width,
        height,
        format,
        size_bytes: data.len(),
    })
}

/// Extract dimensions from JPEG data.
fn extract_jpeg_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    // Skip SOI marker
    let mut i = 2;

    while i + 4 < data.len() {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }

        let marker = data[i + 1];

        // SOF markers carry the frame size
        if matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF) {
            if i + 9 < data.len() {
                let height = u16::from_be_bytes([data[i + 5], data[i + 6]]) as u32;
                let width = u16::from_be_bytes([data[i + 7], data[i + 8]]) as u32;
                return Some((width, height));
            }
            return None;
        }

        if marker == 0xD8 || marker == 0xD9 || marker == 0xFF || (0xD0..=0xD7).contains(&marker) {
            i += if marker == 0xFF { 1 } else { 2 };
        } else {
            let length = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
            i += 2 + length;
        }
    }

    None
}

/// Extract dimensions from PNG data.
fn extract_png_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    if data.len() < 24 || &data[12..16] != b"IHDR" {
        return None;
    }

    let width = u32::from_be_bytes([data[16], data[17], data[18], data[19]]);
    let height = u32::from_be_bytes([data[20], data[21], data[22], data[23]]);

    Some((width, height))
}

/// Extract dimensions from GIF data.
fn extract_gif_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    if data.len() < 10 {
        return None;
    }

    let width = u16::from_le_bytes([data[6], data[7]]) as u32;
    let height = u16::from_le_bytes([data[8], data[9]]) as u32;

    Some((width, height))
}

/// Extract dimensions from the first chunk of a WebP container.
fn extract_webp_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    if data.len() < 30 {
        return None;
    }

    let payload = &data[20..];
    match &data[12..16] {
        // Lossy: 3-byte frame tag, start code 9D 01 2A, then 14-bit sizes
        b"VP8 " => {
            if payload[3..6] != [0x9D, 0x01, 0x2A] {
                return None;
            }
            let width = u16::from_le_bytes([payload[6], payload[7]]) & 0x3FFF;
            let height = u16::from_le_bytes([payload[8], payload[9]]) & 0x3FFF;
            Some((width as u32, height as u32))
        }
        // Lossless: signature 0x2F, then packed (width - 1, height - 1)
        b"VP8L" => {
            if payload[0] != 0x2F {
                return None;
            }
            let bits = u32::from_le_bytes([payload[1], payload[2], payload[3], payload[4]]);
            let width = (bits & 0x3FFF) + 1;
            let height = ((bits >> 14) & 0x3FFF) + 1;
            Some((width, height))
        }
        // Extended: flags + reserved, then 24-bit canvas (width - 1, height - 1)
        b"VP8X" => {
            let width = u32::from_le_bytes([payload[4], payload[5], payload[6], 0]) + 1;
            let height = u32::from_le_bytes([payload[7], payload[8], payload[9], 0]) + 1;
            Some((width, height))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_header(width: u32, height: u32) -> Vec<u8> {
        let mut data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];
        data.extend_from_slice(b"IHDR");
        data.extend_from_slice(&width.to_be_bytes());
        data.extend_from_slice(&height.to_be_bytes());
        data
    }

    #[test]
    fn test_png_metadata() {
        let meta = extract_metadata(&png_header(5000, 2500)).unwrap();
        assert_eq!(meta.format, ImageFormat::Png);
        assert_eq!(meta.dimensions(), Dimensions::new(5000, 2500));
        assert!(meta.is_landscape());
        assert!(meta.needs_resize(2500));
        assert_eq!(meta.target_dimensions(2500), Dimensions::new(2500, 1250));
    }

    #[test]
    fn test_gif_metadata() {
        let data = b"GIF89a\x20\x03\x58\x02\x00\x00";
        let meta = extract_metadata(data).unwrap();
        assert_eq!((meta.width, meta.height), (800, 600));
        assert!(!meta.needs_resize(2500));
    }

    #[test]
    fn test_jpeg_metadata() {
        let mut data = vec![0xFF, 0xD8];
        // APP0 segment of length 16
        data.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x10]);
        data.extend_from_slice(&[0u8; 14]);
        // SOF0: length, precision, height, width
        data.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08, 0x02, 0x58, 0x03, 0x20, 0x03]);
        let meta = extract_metadata(&data).unwrap();
        assert_eq!((meta.width, meta.height), (800, 600));
    }

    #[test]
    fn test_jpeg_metadata_follows_orientation() {
        let mut data = vec![0xFF, 0xD8];
        data.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08, 0x02, 0x58, 0x03, 0x20, 0x03]);
        data.extend_from_slice(&[0u8; 9]);
        data.extend_from_slice(&[0xFF, 0xD9]);

        let rotated = crate::orientation::tests::with_orientation(&data, 8);
        let meta = extract_metadata(&rotated).unwrap();
        assert_eq!((meta.width, meta.height), (600, 800));
        assert!(meta.is_portrait());

        let mirrored = crate::orientation::tests::with_orientation(&data, 2);
        let meta = extract_metadata(&mirrored).unwrap();
        assert_eq!((meta.width, meta.height), (800, 600));
    }

    #[test]
    fn test_webp_lossy_metadata() {
        let mut data = b"RIFF\0\0\0\0WEBPVP8 \0\0\0\0".to_vec();
        data.extend_from_slice(&[0x00, 0x00, 0x00, 0x9D, 0x01, 0x2A]);
        data.extend_from_slice(&2500u16.to_le_bytes());
        data.extend_from_slice(&1250u16.to_le_bytes());
        let meta = extract_metadata(&data).unwrap();
        assert_eq!((meta.width, meta.height), (2500, 1250));
    }

    #[test]
    fn test_webp_lossless_metadata() {
        let bits: u32 = (640 - 1) | ((480 - 1) << 14);
        let mut data = b"RIFF\0\0\0\0WEBPVP8L\0\0\0\0".to_vec();
        data.push(0x2F);
        data.extend_from_slice(&bits.to_le_bytes());
        data.extend_from_slice(&[0u8; 5]);
        let meta = extract_metadata(&data).unwrap();
        assert_eq!((meta.width, meta.height), (640, 480));
    }

    #[test]
    fn test_portrait_orientation() {
        let meta = ImageMetadata { width: 1080, height: 1920, format: ImageFormat::Jpeg, size_bytes: 0 };
        assert!(meta.is_portrait());
        assert!((meta.aspect_ratio() - 0.5625).abs() < 0.001);
    }

    #[test]
    fn test_truncated_header() {
        assert!(extract_metadata(&png_header(10, 10)[..20]).is_none());
    }
}
