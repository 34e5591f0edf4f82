//! Bundled codec engine built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Sniff | `image::guess_format` on the leading bytes |
//! | Decode | `ImageReader::into_decoder` + `DynamicImage::from_decoder` |
//! | ICC profile | `ImageDecoder::icc_profile` / `ImageEncoder::set_icc_profile` |
//! | Orientation | `kamadak-exif` (`Tag::Orientation`, primary IFD) |
//! | Rescale | `DynamicImage::resize_exact` |
//! | Rotate | `rotate90/180/270`, expanded-canvas bilinear otherwise |
//! | Encode | `JpegEncoder` / `PngEncoder` / `DynamicImage::write_to` |
//!
//! Bitmaps live in an id-keyed table. Pixel buffers are reference counted so
//! the table lock is never held while pixels are being processed.

use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use exif::{In, Reader, Tag};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageDecoder, ImageEncoder, ImageReader};

use super::rotation::{compute_rotated_bounds, rotate_expanded};
use super::{Codec, DecodeFlags, EncodeFlags, ErrorCallback, Format, MemoryStream, RawBitmap};
use crate::FilterType;

/// Bytes read from a file when sniffing its format.
const SNIFF_LEN: u64 = 64;

/// A decoded bitmap plus the metadata the engine tracks for it.
struct NativeBitmap {
    image: Arc<DynamicImage>,
    color_profile: Option<Vec<u8>>,
    orientation: Option<u32>,
}

impl NativeBitmap {
    /// A freshly computed bitmap carries no metadata.
    fn derived(image: DynamicImage) -> Self {
        Self {
            image: Arc::new(image),
            color_profile: None,
            orientation: None,
        }
    }
}

/// Codec engine backed by the `image` crate.
///
/// See the [module docs](self) for the crate-to-operation mapping.
#[derive(Default)]
pub struct ImageCodec {
    bitmaps: Mutex<HashMap<u64, NativeBitmap>>,
    streams: Mutex<HashMap<u64, Arc<[u8]>>>,
    next_id: AtomicU64,
    error_callback: RwLock<Option<ErrorCallback>>,
}

impl ImageCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bitmaps handed out and not yet released.
    pub fn live_bitmaps(&self) -> usize {
        lock(&self.bitmaps).len()
    }

    /// Number of memory streams opened and not yet closed.
    pub fn open_streams(&self) -> usize {
        lock(&self.streams).len()
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn report(&self, format: Option<Format>, message: &str) {
        let callback = self
            .error_callback
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(callback) = callback.as_ref() {
            callback(format, message);
        }
    }

    fn insert(&self, bitmap: NativeBitmap) -> RawBitmap {
        let id = self.next_id();
        lock(&self.bitmaps).insert(id, bitmap);
        RawBitmap(id)
    }

    /// Pixels of `bitmap`, reporting an error for an unknown id.
    fn pixels(&self, bitmap: RawBitmap) -> Option<Arc<DynamicImage>> {
        let image = lock(&self.bitmaps)
            .get(&bitmap.0)
            .map(|native| Arc::clone(&native.image));
        if image.is_none() {
            self.report(None, &format!("invalid bitmap handle {}", bitmap.0));
        }
        image
    }

    fn stream(&self, stream: MemoryStream) -> Option<Arc<[u8]>> {
        let bytes = lock(&self.streams).get(&stream.0).cloned();
        if bytes.is_none() {
            self.report(None, &format!("invalid memory stream {}", stream.0));
        }
        bytes
    }

    fn decode(
        &self,
        format: Format,
        bytes: &[u8],
        flags: DecodeFlags,
    ) -> Result<NativeBitmap, String> {
        if !format.to_image_format().reading_enabled() {
            return Err("no decoder available".to_string());
        }
        // The `image` JPEG decoder has a single, accurate IDCT path.
        log::trace!("decoding {format} (accurate_jpeg: {})", flags.accurate_jpeg);

        let mut decoder = ImageReader::with_format(Cursor::new(bytes), format.to_image_format())
            .into_decoder()
            .map_err(|e| e.to_string())?;
        let color_profile = decoder.icc_profile().ok().flatten();
        let image = DynamicImage::from_decoder(decoder).map_err(|e| e.to_string())?;

        Ok(NativeBitmap {
            image: Arc::new(image),
            color_profile,
            orientation: read_orientation(bytes),
        })
    }

    fn encode(
        &self,
        format: Format,
        bitmap: RawBitmap,
        flags: EncodeFlags,
    ) -> Result<Vec<u8>, String> {
        if !format.to_image_format().writing_enabled() {
            return Err("no encoder available".to_string());
        }
        let (image, color_profile) = {
            let bitmaps = lock(&self.bitmaps);
            let native = bitmaps
                .get(&bitmap.0)
                .ok_or_else(|| format!("invalid bitmap handle {}", bitmap.0))?;
            (Arc::clone(&native.image), native.color_profile.clone())
        };

        let mut buffer = Cursor::new(Vec::new());
        let written = match format {
            Format::Jpeg => {
                let mut encoder =
                    JpegEncoder::new_with_quality(&mut buffer, flags.jpeg_quality.clamp(1, 100));
                attach_icc_profile(&mut encoder, format, color_profile);
                image.write_with_encoder(encoder)
            }
            Format::Png => {
                let mut encoder = PngEncoder::new(&mut buffer);
                attach_icc_profile(&mut encoder, format, color_profile);
                image.write_with_encoder(encoder)
            }
            other => image.write_to(&mut buffer, other.to_image_format()),
        };
        written.map_err(|e| e.to_string())?;

        Ok(buffer.into_inner())
    }

    /// Build a new bitmap from the pixels of `bitmap`.
    fn derive(
        &self,
        bitmap: RawBitmap,
        op: impl FnOnce(&DynamicImage) -> Result<DynamicImage, String>,
    ) -> Option<RawBitmap> {
        let image = self.pixels(bitmap)?;
        match op(image.as_ref()) {
            Ok(result) => Some(self.insert(NativeBitmap::derived(result))),
            Err(message) => {
                self.report(None, &message);
                None
            }
        }
    }
}

impl Codec for ImageCodec {
    fn on_error(&self, callback: ErrorCallback) {
        *self
            .error_callback
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(callback);
    }

    fn sniff_file(&self, path: &Path) -> Option<Format> {
        let mut head = Vec::with_capacity(SNIFF_LEN as usize);
        std::fs::File::open(path)
            .and_then(|file| file.take(SNIFF_LEN).read_to_end(&mut head))
            .ok()?;
        sniff_bytes(&head)
    }

    fn supports_reading(&self, format: Format) -> bool {
        format.to_image_format().reading_enabled()
    }

    fn supports_writing(&self, format: Format) -> bool {
        format.to_image_format().writing_enabled()
    }

    fn supports_color_profiles(&self, format: Format) -> bool {
        matches!(format, Format::Jpeg | Format::Png | Format::Tiff | Format::WebP)
    }

    fn load(&self, format: Format, path: &Path, flags: DecodeFlags) -> Option<RawBitmap> {
        let decoded = std::fs::read(path)
            .map_err(|e| e.to_string())
            .and_then(|bytes| self.decode(format, &bytes, flags));
        match decoded {
            Ok(native) => Some(self.insert(native)),
            Err(message) => {
                self.report(Some(format), &format!("{}: {message}", path.display()));
                None
            }
        }
    }

    fn open_memory(&self, bytes: &[u8]) -> Option<MemoryStream> {
        if u32::try_from(bytes.len()).is_err() {
            self.report(None, "memory stream larger than 4 GiB");
            return None;
        }
        let id = self.next_id();
        lock(&self.streams).insert(id, Arc::from(bytes));
        Some(MemoryStream(id))
    }

    fn close_memory(&self, stream: MemoryStream) {
        lock(&self.streams).remove(&stream.0);
    }

    fn sniff_memory(&self, stream: MemoryStream) -> Option<Format> {
        let bytes = self.stream(stream)?;
        sniff_bytes(&bytes)
    }

    fn load_memory(
        &self,
        format: Format,
        stream: MemoryStream,
        flags: DecodeFlags,
    ) -> Option<RawBitmap> {
        let bytes = self.stream(stream)?;
        match self.decode(format, &bytes, flags) {
            Ok(native) => Some(self.insert(native)),
            Err(message) => {
                self.report(Some(format), &message);
                None
            }
        }
    }

    fn save(&self, format: Format, bitmap: RawBitmap, path: &Path, flags: EncodeFlags) -> bool {
        let written = self.encode(format, bitmap, flags).and_then(|bytes| {
            std::fs::write(path, bytes).map_err(|e| format!("{}: {e}", path.display()))
        });
        match written {
            Ok(()) => true,
            Err(message) => {
                self.report(Some(format), &message);
                false
            }
        }
    }

    fn save_to_memory(
        &self,
        format: Format,
        bitmap: RawBitmap,
        flags: EncodeFlags,
    ) -> Option<Vec<u8>> {
        match self.encode(format, bitmap, flags) {
            Ok(bytes) => Some(bytes),
            Err(message) => {
                self.report(Some(format), &message);
                None
            }
        }
    }

    fn width(&self, bitmap: RawBitmap) -> u32 {
        self.pixels(bitmap).map_or(0, |image| image.width())
    }

    fn height(&self, bitmap: RawBitmap) -> u32 {
        self.pixels(bitmap).map_or(0, |image| image.height())
    }

    fn bit_depth(&self, bitmap: RawBitmap) -> u32 {
        self.pixels(bitmap)
            .map_or(0, |image| u32::from(image.color().bits_per_pixel()))
    }

    fn clone_bitmap(&self, bitmap: RawBitmap) -> Option<RawBitmap> {
        let copy = lock(&self.bitmaps).get(&bitmap.0).map(|native| NativeBitmap {
            image: Arc::new(native.image.as_ref().clone()),
            color_profile: native.color_profile.clone(),
            orientation: native.orientation,
        });
        match copy {
            Some(native) => Some(self.insert(native)),
            None => {
                self.report(None, &format!("invalid bitmap handle {}", bitmap.0));
                None
            }
        }
    }

    fn copy_region(
        &self,
        bitmap: RawBitmap,
        left: u32,
        top: u32,
        right: u32,
        bottom: u32,
    ) -> Option<RawBitmap> {
        self.derive(bitmap, |image| {
            if left >= right || top >= bottom || right > image.width() || bottom > image.height() {
                return Err(format!(
                    "region ({left}, {top}, {right}, {bottom}) outside {}x{} bitmap",
                    image.width(),
                    image.height()
                ));
            }
            Ok(image.crop_imm(left, top, right - left, bottom - top))
        })
    }

    fn rescale(
        &self,
        bitmap: RawBitmap,
        width: u32,
        height: u32,
        filter: FilterType,
    ) -> Option<RawBitmap> {
        self.derive(bitmap, |image| {
            if width == 0 || height == 0 {
                return Err(format!("cannot rescale to {width}x{height}"));
            }
            ensure_allocatable(width, height, image.color().bytes_per_pixel())?;
            Ok(image.resize_exact(width, height, filter.to_image_filter()))
        })
    }

    fn rotate(&self, bitmap: RawBitmap, degrees: i32) -> Option<RawBitmap> {
        self.derive(bitmap, |image| {
            // image's rotate90 is clockwise
            let rotated = match degrees.rem_euclid(360) {
                0 => image.clone(),
                90 => image.rotate270(),
                180 => image.rotate180(),
                270 => image.rotate90(),
                other => {
                    let angle = f64::from(other);
                    let (width, height) =
                        compute_rotated_bounds(image.width(), image.height(), angle);
                    ensure_allocatable(width, height, 4)?;
                    DynamicImage::ImageRgba8(rotate_expanded(&image.to_rgba8(), angle))
                }
            };
            Ok(rotated)
        })
    }

    fn convert_to_rgb24(&self, bitmap: RawBitmap) -> Option<RawBitmap> {
        let copy = lock(&self.bitmaps).get(&bitmap.0).map(|native| NativeBitmap {
            image: Arc::new(DynamicImage::ImageRgb8(native.image.to_rgb8())),
            color_profile: native.color_profile.clone(),
            orientation: native.orientation,
        });
        match copy {
            Some(native) => Some(self.insert(native)),
            None => {
                self.report(None, &format!("invalid bitmap handle {}", bitmap.0));
                None
            }
        }
    }

    fn orientation(&self, bitmap: RawBitmap) -> Option<u32> {
        lock(&self.bitmaps)
            .get(&bitmap.0)
            .and_then(|native| native.orientation)
    }

    fn color_profile(&self, bitmap: RawBitmap) -> Option<Vec<u8>> {
        lock(&self.bitmaps)
            .get(&bitmap.0)
            .and_then(|native| native.color_profile.clone())
    }

    fn set_color_profile(&self, bitmap: RawBitmap, profile: &[u8]) {
        if let Some(native) = lock(&self.bitmaps).get_mut(&bitmap.0) {
            native.color_profile = Some(profile.to_vec());
        }
    }

    fn destroy_color_profile(&self, bitmap: RawBitmap) {
        if let Some(native) = lock(&self.bitmaps).get_mut(&bitmap.0) {
            native.color_profile = None;
        }
    }

    fn release(&self, bitmap: RawBitmap) {
        if lock(&self.bitmaps).remove(&bitmap.0).is_none() {
            self.report(None, &format!("release of unknown bitmap handle {}", bitmap.0));
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Refuse pixel buffers above the decoder's default allocation limit.
fn ensure_allocatable(width: u32, height: u32, bytes_per_pixel: u8) -> Result<(), String> {
    let budget = image::Limits::default().max_alloc.unwrap_or(u64::MAX);
    let needed = u64::from(width)
        .checked_mul(u64::from(height))
        .and_then(|pixels| pixels.checked_mul(u64::from(bytes_per_pixel)));
    match needed {
        Some(bytes) if bytes <= budget => Ok(()),
        _ => Err(format!(
            "{width}x{height} bitmap exceeds the {budget}-byte allocation limit"
        )),
    }
}

/// Hand `profile` to `encoder`, returning whether it was accepted.
fn attach_icc_profile<E: ImageEncoder>(
    encoder: &mut E,
    format: Format,
    profile: Option<Vec<u8>>,
) -> bool {
    let Some(profile) = profile else {
        return false;
    };
    match encoder.set_icc_profile(profile) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("{format} encoder dropped the color profile: {e}");
            false
        }
    }
}

fn sniff_bytes(bytes: &[u8]) -> Option<Format> {
    image::guess_format(bytes)
        .ok()
        .and_then(Format::from_image_format)
}

/// Extract the EXIF orientation value from an encoded image.
///
/// Returns `None` if no EXIF data is found or the tag is absent.
fn read_orientation(bytes: &[u8]) -> Option<u32> {
    let exif = Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .ok()?;
    exif.get_field(Tag::Orientation, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
}
