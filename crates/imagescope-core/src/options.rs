//! Tunable settings for decoding, resampling and encoding.

use serde::{Deserialize, Serialize};

/// Resampling kernel used when the codec rescales a bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterType {
    Nearest,
    /// Triangle kernel.
    Bilinear,
    /// Bicubic kernel.
    #[default]
    CatmullRom,
    Lanczos3,
}

impl FilterType {
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        use image::imageops::FilterType as Kernel;
        match self {
            Self::Nearest => Kernel::Nearest,
            Self::Bilinear => Kernel::Triangle,
            Self::CatmullRom => Kernel::CatmullRom,
            Self::Lanczos3 => Kernel::Lanczos3,
        }
    }
}

/// Settings applied by [`Imager`](crate::Imager) when it delegates to the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagingOptions {
    /// JPEG encode quality (1-100). 100 is the engine's "superb" setting.
    pub jpeg_quality: u8,
    /// Request the higher-accuracy JPEG decode path.
    pub accurate_jpeg: bool,
    /// Filter used by `resize` and the thumbnail algorithms.
    pub resize_filter: FilterType,
}

impl ImagingOptions {
    /// JPEG quality clamped to the valid 1-100 range.
    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality.clamp(1, 100)
    }
}

impl Default for ImagingOptions {
    fn default() -> Self {
        Self {
            jpeg_quality: 100,
            accurate_jpeg: true,
            resize_filter: FilterType::CatmullRom,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_kernels() {
        use image::imageops::FilterType as Kernel;
        let kernels = [
            FilterType::Nearest,
            FilterType::Bilinear,
            FilterType::CatmullRom,
            FilterType::Lanczos3,
        ]
        .map(FilterType::to_image_filter);

        assert_eq!(
            kernels,
            [Kernel::Nearest, Kernel::Triangle, Kernel::CatmullRom, Kernel::Lanczos3]
        );
    }

    #[test]
    fn test_defaults() {
        let options = ImagingOptions::default();
        assert_eq!(options.jpeg_quality, 100);
        assert!(options.accurate_jpeg);
        assert_eq!(options.resize_filter, FilterType::CatmullRom);
    }

    #[test]
    fn test_jpeg_quality_clamped() {
        let mut options = ImagingOptions::default();
        options.jpeg_quality = 0;
        assert_eq!(options.jpeg_quality(), 1);

        options.jpeg_quality = 255;
        assert_eq!(options.jpeg_quality(), 100);
    }
}
