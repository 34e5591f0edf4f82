//! Cropping to a pixel rectangle.

use crate::bitmap::Bitmap;
use crate::codec::Codec;
use crate::error::{Error, Result};

impl<'c, C: Codec> Bitmap<'c, C> {
    /// Copy `[left, right) x [top, bottom)` into a new bitmap and run
    /// `consumer` with it.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if the rectangle is empty or leaves the bitmap.
    /// - `OperationFailed` if the codec produces no bitmap.
    pub fn crop<T, F>(
        &self,
        left: u32,
        top: u32,
        right: u32,
        bottom: u32,
        consumer: F,
    ) -> Result<T>
    where
        F: FnOnce(&Bitmap<'c, C>) -> Result<T>,
    {
        let raw = self.raw()?;
        let codec = self.codec();
        let (width, height) = (codec.width(raw), codec.height(raw));
        validate_rect(width, height, (left, top, right, bottom))?;

        log::debug!("cropping {width}x{height} to ({left}, {top}, {right}, {bottom})");
        let cropped = codec.copy_region(raw, left, top, right, bottom);
        self.yield_derived("crop", raw, cropped, consumer)
    }
}

fn validate_rect(width: u32, height: u32, rect: (u32, u32, u32, u32)) -> Result<()> {
    let (left, top, right, bottom) = rect;
    if left < right && right <= width && top < bottom && bottom <= height {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!(
            "crop rectangle ({left}, {top}, {right}, {bottom}) is outside {width}x{height}"
        )))
    }
}
