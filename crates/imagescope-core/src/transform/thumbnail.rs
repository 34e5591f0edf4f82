//! Proportional and square thumbnails.
//!
//! Both are compositions of [`Bitmap::crop`] and [`Bitmap::resize`]; the
//! geometry lives in two pure functions so it can be checked without a codec.

use crate::bitmap::Bitmap;
use crate::codec::Codec;
use crate::error::Result;

impl<'c, C: Codec> Bitmap<'c, C> {
    /// Scale so the longer edge is `size`, keeping the aspect ratio.
    pub fn thumbnail<T, F>(&self, size: u32, consumer: F) -> Result<T>
    where
        F: FnOnce(&Bitmap<'c, C>) -> Result<T>,
    {
        let (width, height) = thumbnail_dimensions(self.width()?, self.height()?, size);
        self.resize(width, height, consumer)
    }

    /// Crop the centered square, then scale it to `size` x `size`.
    pub fn cropped_thumbnail<T, F>(&self, size: u32, consumer: F) -> Result<T>
    where
        F: FnOnce(&Bitmap<'c, C>) -> Result<T>,
    {
        let (left, top, right, bottom) = square_crop_rect(self.width()?, self.height()?);
        self.crop(left, top, right, bottom, |square| square.thumbnail(size, consumer))
    }
}

/// Dimensions of a thumbnail whose longer edge is `size`.
///
/// Edges are rounded and never drop below one pixel, except that a `size`
/// of zero yields `(0, 0)`.
pub fn thumbnail_dimensions(width: u32, height: u32, size: u32) -> (u32, u32) {
    let longest = width.max(height);
    if size == 0 || longest == 0 {
        return (0, 0);
    }

    let scale = size as f64 / longest as f64;
    let scaled = |edge: u32| ((edge as f64 * scale).round() as u32).max(1);
    (scaled(width), scaled(height))
}

/// The largest centered square inside a `width` x `height` bitmap, as
/// `(left, top, right, bottom)`.
pub fn square_crop_rect(width: u32, height: u32) -> (u32, u32, u32, u32) {
    let half = width.abs_diff(height) / 2;
    if width > height {
        (half, 0, half + height, height)
    } else if height > width {
        (0, half, width, half + width)
    } else {
        (0, 0, width, height)
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
