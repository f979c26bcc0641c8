//! EXIF orientation.
//!
//! Cameras store pixels in sensor order and record how to display them in
//! the EXIF `Orientation` tag. Everything downstream of decoding works in
//! display orientation, so the tag is applied right after decoding and the
//! encoded output carries upright pixels.

use std::io::Cursor;

/// Display transform recorded in the EXIF `Orientation` tag (values 1-8).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Orientation {
    /// 1: stored upright
    #[default]
    Normal,
    /// 2: mirrored left to right
    FlipHorizontal,
    /// 3: upside down
    Rotate180,
    /// 4: mirrored top to bottom
    FlipVertical,
    /// 5: rotate 90° clockwise, then mirror left to right
    Rotate90FlipHorizontal,
    /// 6: rotate 90° clockwise
    Rotate90,
    /// 7: rotate 270° clockwise, then mirror left to right
    Rotate270FlipHorizontal,
    /// 8: rotate 270° clockwise
    Rotate270,
}

impl Orientation {
    /// Map a raw tag value; unknown values mean upright.
    pub fn from_exif(value: u32) -> Self {
        match value {
            2 => Self::FlipHorizontal,
            3 => Self::Rotate180,
            4 => Self::FlipVertical,
            5 => Self::Rotate90FlipHorizontal,
            6 => Self::Rotate90,
            7 => Self::Rotate270FlipHorizontal,
            8 => Self::Rotate270,
            _ => Self::Normal,
        }
    }

    /// Read the tag from an encoded image (JPEG, PNG, WebP, TIFF, HEIF).
    ///
    /// Images without EXIF data, or with unreadable EXIF data, are upright.
    pub fn read(data: &[u8]) -> Self {
        let Ok(parsed) = exif::Reader::new().read_from_container(&mut Cursor::new(data)) else {
            return Self::Normal;
        };

        parsed
            .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map_or(Self::Normal, Self::from_exif)
    }

    /// Whether displaying swaps width and height.
    pub fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            Self::Rotate90FlipHorizontal | Self::Rotate90 | Self::Rotate270FlipHorizontal | Self::Rotate270
        )
    }

    /// Turn stored pixels into display pixels.
    #[cfg(feature = "processing")]
    pub fn apply(self, raster: image::DynamicImage) -> image::DynamicImage {
        match self {
            Self::Normal => raster,
            Self::FlipHorizontal => raster.fliph(),
            Self::Rotate180 => raster.rotate180(),
            Self::FlipVertical => raster.flipv(),
            Self::Rotate90FlipHorizontal => raster.rotate90().fliph(),
            Self::Rotate90 => raster.rotate90(),
            Self::Rotate270FlipHorizontal => raster.rotate270().fliph(),
            Self::Rotate270 => raster.rotate270(),
        }
    }
}
