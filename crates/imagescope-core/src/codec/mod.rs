//! The codec boundary: everything that touches pixels lives behind [`Codec`].
//!
//! The rest of the crate never decodes, resamples or encodes on its own. It
//! asks a codec to do so through opaque [`RawBitmap`] ids, in the style of a
//! C imaging engine:
//!
//! - operations that produce a bitmap return `None` on failure,
//! - operations that write return `false` on failure,
//! - the reason for a failure is only ever delivered to the callback
//!   registered with [`Codec::on_error`].
//!
//! [`ImageCodec`] is the bundled engine, built on the `image` crate for
//! pixel work and `kamadak-exif` for the orientation tag.

mod engine;
mod format;
#[cfg(test)]
pub(crate) mod mock;
mod rotation;

use std::path::Path;

pub use engine::ImageCodec;
pub use format::Format;

/// Opaque id of a bitmap owned by a codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawBitmap(pub u64);

/// Opaque id of an in-memory stream opened by a codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoryStream(pub u64);

/// Callback receiving every error the codec reports.
pub type ErrorCallback = Box<dyn Fn(Option<Format>, &str) + Send + Sync>;

/// Decoder flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeFlags {
    /// Use the slower, higher-accuracy JPEG path.
    pub accurate_jpeg: bool,
}

/// Encoder flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeFlags {
    /// JPEG quality (1-100). Ignored by other formats.
    pub jpeg_quality: u8,
}

impl Default for EncodeFlags {
    fn default() -> Self {
        Self { jpeg_quality: 75 }
    }
}

/// Capabilities an image codec engine must provide.
///
/// Bitmaps are identified by [`RawBitmap`]; every bitmap a codec hands out
/// must eventually be passed back to [`Codec::release`] exactly once.
pub trait Codec: Send + Sync {
    /// Install the callback that receives error messages.
    fn on_error(&self, callback: ErrorCallback);

    /// Identify the format of a file from its content.
    fn sniff_file(&self, path: &Path) -> Option<Format>;

    /// Identify a format from a file name alone.
    fn format_from_filename(&self, path: &Path) -> Option<Format> {
        Format::from_path(path)
    }

    fn supports_reading(&self, format: Format) -> bool;
    fn supports_writing(&self, format: Format) -> bool;
    fn supports_color_profiles(&self, format: Format) -> bool;

    /// Decode a file.
    fn load(&self, format: Format, path: &Path, flags: DecodeFlags) -> Option<RawBitmap>;

    /// Open a read-only stream over a copy of `bytes`.
    fn open_memory(&self, bytes: &[u8]) -> Option<MemoryStream>;
    fn close_memory(&self, stream: MemoryStream);
    fn sniff_memory(&self, stream: MemoryStream) -> Option<Format>;
    fn load_memory(
        &self,
        format: Format,
        stream: MemoryStream,
        flags: DecodeFlags,
    ) -> Option<RawBitmap>;

    /// Encode a bitmap to a file.
    fn save(&self, format: Format, bitmap: RawBitmap, path: &Path, flags: EncodeFlags) -> bool;

    /// Encode a bitmap to a new buffer.
    fn save_to_memory(
        &self,
        format: Format,
        bitmap: RawBitmap,
        flags: EncodeFlags,
    ) -> Option<Vec<u8>>;

    fn width(&self, bitmap: RawBitmap) -> u32;
    fn height(&self, bitmap: RawBitmap) -> u32;
    /// Bits per pixel, e.g. 24 for 8-bit RGB.
    fn bit_depth(&self, bitmap: RawBitmap) -> u32;

    /// Full copy including metadata.
    fn clone_bitmap(&self, bitmap: RawBitmap) -> Option<RawBitmap>;

    /// Copy the pixels in `[left, right) x [top, bottom)`.
    fn copy_region(
        &self,
        bitmap: RawBitmap,
        left: u32,
        top: u32,
        right: u32,
        bottom: u32,
    ) -> Option<RawBitmap>;

    fn rescale(
        &self,
        bitmap: RawBitmap,
        width: u32,
        height: u32,
        filter: crate::FilterType,
    ) -> Option<RawBitmap>;

    /// Rotate counter-clockwise by `degrees`, enlarging the canvas as needed.
    fn rotate(&self, bitmap: RawBitmap, degrees: i32) -> Option<RawBitmap>;

    /// Copy converted to 8-bit RGB.
    fn convert_to_rgb24(&self, bitmap: RawBitmap) -> Option<RawBitmap>;

    /// Raw EXIF orientation value (1-8), if the source carried one.
    fn orientation(&self, bitmap: RawBitmap) -> Option<u32>;

    fn color_profile(&self, bitmap: RawBitmap) -> Option<Vec<u8>>;
    fn set_color_profile(&self, bitmap: RawBitmap, profile: &[u8]);
    fn destroy_color_profile(&self, bitmap: RawBitmap);

    /// Return the bitmap's memory to the codec.
    fn release(&self, bitmap: RawBitmap);
}
