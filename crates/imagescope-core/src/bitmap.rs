//! Scoped ownership of codec bitmaps.
//!
//! A [`Bitmap`] wraps one [`RawBitmap`] for the duration of a consumer
//! closure. [`scoped`] builds the handle, runs the consumer and returns the
//! raw bitmap to the codec on every exit path:
//!
//! - normal return and `Err` early return release in [`scoped`] itself,
//! - a panic unwinding through the consumer releases in `Drop`.
//!
//! After release the handle is marked released and every accessor fails
//! with [`Error::AlreadyReleased`] instead of touching the codec.

use crate::codec::{Codec, Format, RawBitmap};
use crate::error::{Error, Result};
use crate::error_channel;
use crate::Imager;

/// Where a bitmap came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Decoded by the loader; carries the sniffed format.
    Decoded(Format),
    /// Produced by a transform; carries the parent's format, if any.
    Derived(Option<Format>),
}

impl Provenance {
    /// Format recorded for saving when the output name has no usable extension.
    pub fn format(self) -> Option<Format> {
        match self {
            Provenance::Decoded(format) => Some(format),
            Provenance::Derived(format) => format,
        }
    }
}

/// A codec bitmap owned by the enclosing scope.
pub struct Bitmap<'c, C: Codec> {
    imager: &'c Imager<C>,
    raw: Option<RawBitmap>,
    provenance: Provenance,
}

impl<'c, C: Codec> Bitmap<'c, C> {
    pub(crate) fn new(imager: &'c Imager<C>, raw: RawBitmap, provenance: Provenance) -> Self {
        Self {
            imager,
            raw: Some(raw),
            provenance,
        }
    }

    /// The underlying codec bitmap, or `AlreadyReleased`.
    pub(crate) fn raw(&self) -> Result<RawBitmap> {
        self.raw.ok_or(Error::AlreadyReleased)
    }

    pub(crate) fn imager(&self) -> &'c Imager<C> {
        self.imager
    }

    pub(crate) fn codec(&self) -> &'c C {
        self.imager.codec()
    }

    /// Return the bitmap to the codec. Later calls are no-ops.
    pub(crate) fn release(&mut self) {
        if let Some(raw) = self.raw.take() {
            log::trace!("releasing bitmap {}", raw.0);
            self.codec().release(raw);
        }
    }

    pub fn width(&self) -> Result<u32> {
        Ok(self.codec().width(self.raw()?))
    }

    pub fn height(&self) -> Result<u32> {
        Ok(self.codec().height(self.raw()?))
    }

    /// Bits per pixel.
    pub fn bit_depth(&self) -> Result<u32> {
        Ok(self.codec().bit_depth(self.raw()?))
    }

    /// Embedded ICC profile bytes, if any.
    pub fn color_profile(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.codec().color_profile(self.raw()?))
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    /// Format the loader recorded for this bitmap or the one it derives from.
    pub fn source_format(&self) -> Option<Format> {
        self.provenance.format()
    }

    pub fn is_released(&self) -> bool {
        self.raw.is_none()
    }

    /// Provenance for a bitmap produced from this one.
    pub(crate) fn derived(&self) -> Provenance {
        Provenance::Derived(self.source_format())
    }
}

impl<C: Codec> Drop for Bitmap<'_, C> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Wrap `raw` in a [`Bitmap`], run `consumer` with it and release it.
///
/// The consumer's result is returned unchanged. On success the calling
/// thread's error channel is cleared before release, so a message from an
/// earlier, handled failure cannot leak into a later one.
pub(crate) fn scoped<'c, C, T, F>(
    imager: &'c Imager<C>,
    raw: RawBitmap,
    provenance: Provenance,
    consumer: F,
) -> Result<T>
where
    C: Codec,
    F: FnOnce(&Bitmap<'c, C>) -> Result<T>,
{
    let mut bitmap = Bitmap::new(imager, raw, provenance);
    let outcome = consumer(&bitmap);
    if outcome.is_ok() {
        error_channel::clear();
    }
    bitmap.release();
    outcome
}
