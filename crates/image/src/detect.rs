//! Image format detection from magic bytes, MIME types and file extensions.

use crate::{ImageError, Result};

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// JPEG image
    Jpeg,
    /// PNG image
    Png,
    /// GIF image
    Gif,
    /// WebP image
    WebP,
    /// AVIF image
    Avif,
    /// BMP image
    Bmp,
    /// TIFF image
    Tiff,
    /// HEIC/HEIF image
    Heic,
}

impl ImageFormat {
    /// Every known format, in detection order.
    pub const ALL: [ImageFormat; 8] = [
        ImageFormat::Jpeg,
        ImageFormat::Png,
        ImageFormat::Gif,
        ImageFormat::WebP,
        ImageFormat::Avif,
        ImageFormat::Bmp,
        ImageFormat::Tiff,
        ImageFormat::Heic,
    ];

    /// Get the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Gif => "image/gif",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Avif => "image/avif",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Tiff => "image/tiff",
            ImageFormat::Heic => "image/heic",
        }
    }

    /// Get common file extensions for this format.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            ImageFormat::Jpeg => &["jpg", "jpeg"],
            ImageFormat::Png => &["png"],
            ImageFormat::Gif => &["gif"],
            ImageFormat::WebP => &["webp"],
            ImageFormat::Avif => &["avif"],
            ImageFormat::Bmp => &["bmp"],
            ImageFormat::Tiff => &["tiff", "tif"],
            ImageFormat::Heic => &["heic", "heif"],
        }
    }

    /// Canonical extension used when renaming re-encoded files.
    pub fn extension(&self) -> &'static str {
        self.extensions()[0]
    }

    /// Look a format up by MIME type (`image/jpg` is accepted as an alias).
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.split(';').next().unwrap_or_default().trim();
        if mime.eq_ignore_ascii_case("image/jpg") {
            return Some(ImageFormat::Jpeg);
        }
        if mime.eq_ignore_ascii_case("image/heif") {
            return Some(ImageFormat::Heic);
        }
        Self::ALL
            .into_iter()
            .find(|f| f.mime_type().eq_ignore_ascii_case(mime))
    }

    /// Look a format up by file extension, with or without the leading dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.');
        Self::ALL
            .into_iter()
            .find(|f| f.extensions().iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for ImageFormat {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_extension(s)
            .or_else(|| Self::from_mime(s))
            .ok_or(ImageError::UnknownFormat)
    }
}

/// Detect image format from magic bytes.
///
/// # Arguments
/// * `data` - First few bytes of the image file (at least 12 bytes recommended)
///
/// # Returns
/// Detected image format, or error if unknown
///
/// # Example
/// ```
/// use imghost_image::detect_format;
///
/// // JPEG magic bytes
/// let jpeg_data = [0xFF, 0xD8, 0xFF, 0xE0];
/// assert!(matches!(detect_format(&jpeg_data), Ok(imghost_image::ImageFormat::Jpeg)));
///
/// // PNG magic bytes
/// let png_data = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
/// assert!(matches!(detect_format(&png_data), Ok(imghost_image::ImageFormat::Png)));
/// ```
pub fn detect_format(data: &[u8]) -> Result<ImageFormat> {
    if data.len() < 4 {
        return Err(ImageError::InvalidData("Not enough data for format detection".into()));
    }

    // JPEG: FF D8 FF
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Ok(ImageFormat::Jpeg);
    }

    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Ok(ImageFormat::Png);
    }

    // GIF: GIF87a or GIF89a
    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return Ok(ImageFormat::Gif);
    }

    // WebP: RIFF....WEBP
    if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        return Ok(ImageFormat::WebP);
    }

    // BMP: BM
    if data.starts_with(b"BM") {
        return Ok(ImageFormat::Bmp);
    }

    // TIFF: II or MM (little/big endian)
    if data.starts_with(&[0x49, 0x49, 0x2A, 0x00]) || data.starts_with(&[0x4D, 0x4D, 0x00, 0x2A]) {
        return Ok(ImageFormat::Tiff);
    }

    // ISO-BMFF: ....ftyp<brand>
    if data.len() >= 12 && &data[4..8] == b"ftyp" {
        match &data[8..12] {
            b"avif" | b"avis" => return Ok(ImageFormat::Avif),
            b"heic" | b"heix" | b"hevc" | b"mif1" => return Ok(ImageFormat::Heic),
            _ => {}
        }
    }

    Err(ImageError::UnknownFormat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_jpeg() {
        let data = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46];
        assert_eq!(detect_format(&data).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_detect_png() {
        let data = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00];
        assert_eq!(detect_format(&data).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_detect_webp() {
        let data = b"RIFF\x00\x00\x00\x00WEBP";
        assert_eq!(detect_format(data).unwrap(), ImageFormat::WebP);
    }

    #[test]
    fn test_detect_avif_and_heic_brands() {
        assert_eq!(detect_format(b"\x00\x00\x00\x1cftypavif").unwrap(), ImageFormat::Avif);
        assert_eq!(detect_format(b"\x00\x00\x00\x18ftypheic").unwrap(), ImageFormat::Heic);
    }

    #[test]
    fn test_unknown_format() {
        assert!(matches!(detect_format(&[0x00; 16]), Err(ImageError::UnknownFormat)));
        assert!(matches!(detect_format(b"BM"), Err(ImageError::InvalidData(_))));
    }

    #[test]
    fn test_from_mime() {
        assert_eq!(ImageFormat::from_mime("image/webp"), Some(ImageFormat::WebP));
        assert_eq!(ImageFormat::from_mime("image/jpg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_mime("IMAGE/PNG; charset=binary"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_mime("text/plain"), None);
    }

    #[test]
    fn test_from_extension() {
        assert_eq!(ImageFormat::from_extension("JPEG"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension(".tif"), Some(ImageFormat::Tiff));
        assert_eq!(ImageFormat::from_extension("txt"), None);
        assert_eq!("webp".parse::<ImageFormat>().unwrap(), ImageFormat::WebP);
    }

    #[test]
    fn test_canonical_extension() {
        assert_eq!(ImageFormat::Jpeg.extension(), "jpg");
        assert_eq!(ImageFormat::WebP.to_string(), "webp");
    }
}
