//! Writing a scoped [`Bitmap`] to a file or a buffer.
//!
//! # Steps
//!
//! 1. Pick the target format (file extension, then the recorded source format).
//! 2. Refuse formats the codec cannot write.
//! 3. PNG: strip the color profile first.
//! 4. JPEG: write from a 24-bit temporary when the bitmap has another depth.
//!    The temporary is released before any error is surfaced.
//! 5. Write with the configured flags; on failure surface the codec's
//!    pending error.

use std::path::Path;

use crate::bitmap::Bitmap;
use crate::codec::{Codec, EncodeFlags, Format, RawBitmap};
use crate::error::{Error, Result};
use crate::error_channel;

impl<C: Codec> Bitmap<'_, C> {
    /// Encode to `path`, choosing the format from its extension.
    ///
    /// An extension the codec does not recognize falls back to the format
    /// this bitmap was decoded from.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let format = self
            .codec()
            .format_from_filename(path)
            .or(self.source_format())
            .ok_or_else(|| {
                Error::UnsupportedFormat(format!("cannot pick a format for {}", path.display()))
            })?;

        log::debug!("saving {} as {format}", path.display());
        self.encode_with(format, |codec, raw, flags| {
            codec.save(format, raw, path, flags).then_some(())
        })
    }

    /// Encode to a new buffer in `format`.
    pub fn to_bytes(&self, format: Format) -> Result<Vec<u8>> {
        log::debug!("encoding {format} to memory");
        self.encode_with(format, |codec, raw, flags| {
            codec.save_to_memory(format, raw, flags)
        })
    }

    fn encode_with<T, W>(&self, format: Format, write: W) -> Result<T>
    where
        W: FnOnce(&C, RawBitmap, EncodeFlags) -> Option<T>,
    {
        let raw = self.raw()?;
        let codec = self.codec();
        if !codec.supports_writing(format) {
            return Err(Error::UnsupportedFormat(format!("{format} cannot be written")));
        }
        if format == Format::Png {
            codec.destroy_color_profile(raw);
        }
        let flags = self.imager().encode_flags();

        let depth = codec.bit_depth(raw);
        let written = if format == Format::Jpeg && depth != 24 {
            log::debug!("converting {depth}-bit bitmap to 24-bit for JPEG");
            let converted = codec
                .convert_to_rgb24(raw)
                .ok_or_else(error_channel::raise_pending)?;
            let temporary = Bitmap::new(self.imager(), converted, self.derived());
            let written = write(codec, converted, flags);
            drop(temporary);
            written
        } else {
            write(codec, raw, flags)
        };

        match written {
            Some(output) => {
                error_channel::clear();
                Ok(output)
            }
            None => Err(error_channel::raise_pending()),
        }
    }
}
