//! Loading images from a path or an in-memory buffer.
//!
//! Both entry points follow the same steps:
//!
//! 1. Sniff the format (a path falls back to its file name).
//! 2. Refuse formats the codec cannot read.
//! 3. Decode, surfacing the codec's pending error on failure.
//! 4. Normalize orientation: quarter and half turns recorded in EXIF are
//!    undone, anything else is duplicated unchanged. Either way the decoded
//!    bitmap is released and the scope receives a fresh copy.
//! 5. Hand the result to the caller's closure through a scoped [`Bitmap`].

mod orientation;

use std::path::Path;

pub use orientation::Orientation;

use crate::bitmap::{scoped, Bitmap, Provenance};
use crate::codec::{Codec, Format, MemoryStream, RawBitmap};
use crate::error::{Error, Result};
use crate::error_channel;
use crate::transform::copy_color_profile;
use crate::Imager;

impl<C: Codec> Imager<C> {
    /// Open the image at `path` and run `consumer` with it.
    ///
    /// # Errors
    ///
    /// - `UnsupportedFormat` if the format is unknown or cannot be read.
    /// - `Codec` with the engine's message if decoding fails.
    /// - anything `consumer` returns.
    pub fn open<'c, P, T, F>(&'c self, path: P, consumer: F) -> Result<T>
    where
        P: AsRef<Path>,
        F: FnOnce(&Bitmap<'c, C>) -> Result<T>,
    {
        let path = path.as_ref();
        let codec = self.codec();

        let format = codec
            .sniff_file(path)
            .or_else(|| codec.format_from_filename(path))
            .ok_or_else(|| {
                Error::UnsupportedFormat(format!("unknown file format: {}", path.display()))
            })?;
        self.ensure_readable(format)?;

        log::debug!("loading {} as {format}", path.display());
        let raw = codec
            .load(format, path, self.decode_flags(format))
            .ok_or_else(error_channel::raise_pending)?;
        let raw = self.normalize_orientation(raw, format)?;

        scoped(self, raw, Provenance::Decoded(format), consumer)
    }

    /// Decode an image held in memory and run `consumer` with it.
    ///
    /// The memory stream opened over `bytes` is closed right after decoding,
    /// whether or not decoding succeeded.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if `bytes` is empty.
    /// - `Io` if the codec cannot open a stream over `bytes`.
    /// - `UnsupportedFormat` if the format is unknown or cannot be read.
    /// - `Codec` with the engine's message if decoding fails.
    pub fn open_from_memory<'c, T, F>(&'c self, bytes: &[u8], consumer: F) -> Result<T>
    where
        F: FnOnce(&Bitmap<'c, C>) -> Result<T>,
    {
        if bytes.is_empty() {
            return Err(Error::InvalidInput("image buffer is empty".to_string()));
        }

        let stream = self.codec().open_memory(bytes).ok_or_else(|| {
            Error::Io(
                error_channel::take()
                    .unwrap_or_else(|| format!("cannot open memory stream over {} bytes", bytes.len())),
            )
        })?;
        let decoded = self.decode_stream(stream);
        self.codec().close_memory(stream);

        let (raw, format) = decoded?;
        let raw = raw.ok_or_else(error_channel::raise_pending)?;
        let raw = self.normalize_orientation(raw, format)?;

        scoped(self, raw, Provenance::Decoded(format), consumer)
    }

    /// Sniff and decode `stream`. A decode failure is `Ok((None, _))`; its
    /// message stays pending until the stream is closed.
    fn decode_stream(&self, stream: MemoryStream) -> Result<(Option<RawBitmap>, Format)> {
        let format = self.codec().sniff_memory(stream).ok_or_else(|| {
            Error::UnsupportedFormat("unknown file format in memory buffer".to_string())
        })?;
        self.ensure_readable(format)?;

        log::debug!("loading memory buffer as {format}");
        let raw = self
            .codec()
            .load_memory(format, stream, self.decode_flags(format));
        Ok((raw, format))
    }

    fn ensure_readable(&self, format: Format) -> Result<()> {
        if self.codec().supports_reading(format) {
            Ok(())
        } else {
            Err(Error::UnsupportedFormat(format!("{format} cannot be read")))
        }
    }

    /// Replace `raw` with an upright copy, releasing `raw`.
    fn normalize_orientation(&self, raw: RawBitmap, format: Format) -> Result<RawBitmap> {
        let codec = self.codec();
        let orientation = codec
            .orientation(raw)
            .and_then(Orientation::from_exif)
            .unwrap_or_default();

        let normalized = match orientation.upright_rotation() {
            Some(degrees) => {
                log::debug!("normalizing {orientation:?} orientation");
                let rotated = codec.rotate(raw, degrees);
                if let Some(rotated) = rotated {
                    copy_color_profile(codec, Some(format), raw, rotated);
                }
                rotated
            }
            None => codec.clone_bitmap(raw),
        };
        codec.release(raw);

        normalized.ok_or_else(error_channel::raise_pending)
    }
}
