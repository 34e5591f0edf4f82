//! Rotation by multiples of 45 degrees.

use crate::bitmap::Bitmap;
use crate::codec::Codec;
use crate::error::{Error, Result};

impl<'c, C: Codec> Bitmap<'c, C> {
    /// Rotate counter-clockwise by `angle` degrees and run `consumer` with
    /// the result. Odd multiples of 45 enlarge the canvas.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `angle` is not a multiple of 45.
    /// - `OperationFailed` if the codec produces no bitmap.
    pub fn rotate<T, F>(&self, angle: i32, consumer: F) -> Result<T>
    where
        F: FnOnce(&Bitmap<'c, C>) -> Result<T>,
    {
        if angle % 45 != 0 {
            return Err(Error::InvalidArgument(format!(
                "rotation angle {angle} must be a 45-degree skew"
            )));
        }
        let raw = self.raw()?;

        log::debug!("rotating by {angle} degrees");
        let rotated = self.codec().rotate(raw, angle);
        self.yield_derived("rotate", raw, rotated, consumer)
    }
}
