//! Geometric transforms on a scoped [`Bitmap`].
//!
//! Every transform follows the same shape:
//!
//! 1. validate the arguments (nothing reaches the codec on bad input),
//! 2. delegate the pixel work to the codec,
//! 3. copy the color profile onto the new bitmap,
//! 4. hand the new bitmap to the caller's closure through [`scoped`].
//!
//! # Coordinate System
//!
//! - Origin is the top-left corner
//! - Crop rectangles are half-open: `[left, right) x [top, bottom)`
//! - Rotation angles are in degrees, positive = counter-clockwise

mod crop;
mod profile;
mod resize;
mod rotate;
mod thumbnail;

pub(crate) use profile::copy_color_profile;
pub use thumbnail::{square_crop_rect, thumbnail_dimensions};

use crate::bitmap::{scoped, Bitmap};
use crate::codec::{Codec, RawBitmap};
use crate::error::{Error, Result};
use crate::error_channel;

impl<'c, C: Codec> Bitmap<'c, C> {
    /// Wrap the codec's result of `operation` on `source` and run `consumer`.
    fn yield_derived<T, F>(
        &self,
        operation: &str,
        source: RawBitmap,
        produced: Option<RawBitmap>,
        consumer: F,
    ) -> Result<T>
    where
        F: FnOnce(&Bitmap<'c, C>) -> Result<T>,
    {
        let Some(raw) = produced else {
            let detail = error_channel::take()
                .map(|message| format!(": {message}"))
                .unwrap_or_default();
            return Err(Error::OperationFailed(format!(
                "{operation} produced no bitmap{detail}"
            )));
        };

        copy_color_profile(self.codec(), self.source_format(), source, raw);
        scoped(self.imager(), raw, self.derived(), consumer)
    }
}

#[cfg(test)]
mod tests {
    use crate::bitmap::Provenance;
    use crate::codec::mock::{MockCodec, RecordedOp};
    use crate::codec::Format;
    use crate::Imager;

    #[test]
    fn test_nested_transforms_release_everything() {
        let imager = Imager::new(MockCodec::with_source(400, 300));

        let dims = imager
            .open("photo.jpg", |photo| {
                photo.crop(0, 0, 200, 200, |square| {
                    assert_eq!(square.provenance(), Provenance::Derived(Some(Format::Jpeg)));
                    square.resize(50, 50, |small| {
                        assert_eq!(small.source_format(), Some(Format::Jpeg));
                        Ok((small.width()?, small.height()?))
                    })
                })
            })
            .unwrap();

        assert_eq!(dims, (50, 50));
        // decoded, upright copy, cropped, resized
        assert_eq!(imager.codec().release_count(), 4);
        assert_eq!(imager.codec().live_bitmaps(), 0);
    }

    #[test]
    fn test_inner_error_releases_outer_scopes() {
        let imager = Imager::new(MockCodec::with_source(400, 300));

        let result = imager.open("photo.jpg", |photo| {
            photo.crop(10, 10, 110, 110, |square| square.rotate(30, |_| Ok(())))
        });

        assert!(matches!(result, Err(crate::Error::InvalidArgument(_))));
        assert!(!imager
            .codec()
            .operations()
            .iter()
            .any(|op| matches!(op, RecordedOp::Rotate { .. })));
        assert_eq!(imager.codec().live_bitmaps(), 0);
    }
}
