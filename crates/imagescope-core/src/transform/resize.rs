//! Resampling to exact dimensions.

use crate::bitmap::Bitmap;
use crate::codec::Codec;
use crate::error::{Error, Result};

impl<'c, C: Codec> Bitmap<'c, C> {
    /// Rescale to `width` x `height` with the configured filter and run
    /// `consumer` with the result.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if either dimension is zero.
    /// - `OperationFailed` if the codec produces no bitmap.
    pub fn resize<T, F>(&self, width: u32, height: u32, consumer: F) -> Result<T>
    where
        F: FnOnce(&Bitmap<'c, C>) -> Result<T>,
    {
        if width == 0 || height == 0 {
            return Err(Error::InvalidArgument(format!(
                "resize dimensions must be positive, got {width}x{height}"
            )));
        }
        let raw = self.raw()?;
        let filter = self.imager().options().resize_filter;

        log::debug!("resizing to {width}x{height} with {filter:?}");
        let resized = self.codec().rescale(raw, width, height, filter);
        self.yield_derived("resize", raw, resized, consumer)
    }
}
