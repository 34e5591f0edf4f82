//! Image format tags understood by the codec boundary.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// An image file format.
///
/// Whether a format can actually be read or written is decided by the codec
/// (see [`Codec::supports_reading`](super::Codec::supports_reading)); this
/// enum only names the formats that can be recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Format {
    Bmp,
    Gif,
    Ico,
    Jpeg,
    Png,
    Pnm,
    Tga,
    Tiff,
    WebP,
}

impl Format {
    /// Look up a format by file extension (case-insensitive, no leading dot).
    pub fn from_extension(extension: &str) -> Option<Self> {
        let format = match extension.to_ascii_lowercase().as_str() {
            "bmp" => Format::Bmp,
            "gif" => Format::Gif,
            "ico" => Format::Ico,
            "jpg" | "jpeg" | "jpe" | "jif" | "jfif" => Format::Jpeg,
            "png" => Format::Png,
            "pbm" | "pgm" | "ppm" | "pnm" | "pam" => Format::Pnm,
            "tga" => Format::Tga,
            "tif" | "tiff" => Format::Tiff,
            "webp" => Format::WebP,
            _ => return None,
        };
        Some(format)
    }

    /// Look up a format from the extension of `path`.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Canonical extension used when writing this format.
    pub fn extension(self) -> &'static str {
        match self {
            Format::Bmp => "bmp",
            Format::Gif => "gif",
            Format::Ico => "ico",
            Format::Jpeg => "jpg",
            Format::Png => "png",
            Format::Pnm => "pnm",
            Format::Tga => "tga",
            Format::Tiff => "tif",
            Format::WebP => "webp",
        }
    }

    pub(crate) fn to_image_format(self) -> image::ImageFormat {
        match self {
            Format::Bmp => image::ImageFormat::Bmp,
            Format::Gif => image::ImageFormat::Gif,
            Format::Ico => image::ImageFormat::Ico,
            Format::Jpeg => image::ImageFormat::Jpeg,
            Format::Png => image::ImageFormat::Png,
            Format::Pnm => image::ImageFormat::Pnm,
            Format::Tga => image::ImageFormat::Tga,
            Format::Tiff => image::ImageFormat::Tiff,
            Format::WebP => image::ImageFormat::WebP,
        }
    }

    pub(crate) fn from_image_format(format: image::ImageFormat) -> Option<Self> {
        let format = match format {
            image::ImageFormat::Bmp => Format::Bmp,
            image::ImageFormat::Gif => Format::Gif,
            image::ImageFormat::Ico => Format::Ico,
            image::ImageFormat::Jpeg => Format::Jpeg,
            image::ImageFormat::Png => Format::Png,
            image::ImageFormat::Pnm => Format::Pnm,
            image::ImageFormat::Tga => Format::Tga,
            image::ImageFormat::Tiff => Format::Tiff,
            image::ImageFormat::WebP => Format::WebP,
            _ => return None,
        };
        Some(format)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Bmp => "BMP",
            Format::Gif => "GIF",
            Format::Ico => "ICO",
            Format::Jpeg => "JPEG",
            Format::Png => "PNG",
            Format::Pnm => "PNM",
            Format::Tga => "TGA",
            Format::Tiff => "TIFF",
            Format::WebP => "WebP",
        };
        f.write_str(name)
    }
}
