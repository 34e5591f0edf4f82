//! Mock codec that tracks bitmap dimensions and records every call.
//!
//! Uses Mutex (not RefCell) so it is Sync like a real engine.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};

use super::{Codec, DecodeFlags, EncodeFlags, ErrorCallback, Format, MemoryStream, RawBitmap};
use crate::FilterType;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RecordedOp {
    Load(Format),
    OpenMemory,
    CloseMemory,
    LoadMemory(Format),
    Clone(RawBitmap),
    CopyRegion {
        source: RawBitmap,
        rect: (u32, u32, u32, u32),
    },
    Rescale {
        source: RawBitmap,
        width: u32,
        height: u32,
        filter: FilterType,
    },
    Rotate {
        source: RawBitmap,
        degrees: i32,
    },
    ConvertToRgb24(RawBitmap),
    SetColorProfile(RawBitmap),
    DestroyColorProfile(RawBitmap),
    Save {
        format: Format,
        bitmap: RawBitmap,
        bit_depth: u32,
        jpeg_quality: u8,
    },
    Release(RawBitmap),
}

#[derive(Debug, Clone, Default)]
struct MockBitmap {
    width: u32,
    height: u32,
    bit_depth: u32,
    color_profile: Option<Vec<u8>>,
    orientation: Option<u32>,
}

/// Mock codec whose "decoded" bitmap is configured up front.
#[derive(Default)]
pub(crate) struct MockCodec {
    source: MockBitmap,
    sniffed: Option<Format>,
    fail_load: Option<String>,
    fail_rotate: bool,
    fail_save: Option<String>,
    fail_open_memory: bool,
    bitmaps: Mutex<HashMap<u64, MockBitmap>>,
    next_id: AtomicU64,
    operations: Mutex<Vec<RecordedOp>>,
    error_callback: RwLock<Option<ErrorCallback>>,
}

impl MockCodec {
    /// A codec that decodes everything into a 24-bit `width` x `height` bitmap.
    pub(crate) fn with_source(width: u32, height: u32) -> Self {
        Self {
            source: MockBitmap {
                width,
                height,
                bit_depth: 24,
                ..Default::default()
            },
            sniffed: Some(Format::Jpeg),
            ..Default::default()
        }
    }

    pub(crate) fn bit_depth(mut self, bit_depth: u32) -> Self {
        self.source.bit_depth = bit_depth;
        self
    }

    pub(crate) fn color_profile(mut self, profile: &[u8]) -> Self {
        self.source.color_profile = Some(profile.to_vec());
        self
    }

    pub(crate) fn orientation(mut self, orientation: u32) -> Self {
        self.source.orientation = Some(orientation);
        self
    }

    pub(crate) fn sniffing(mut self, format: Option<Format>) -> Self {
        self.sniffed = format;
        self
    }

    pub(crate) fn failing_load(mut self, message: &str) -> Self {
        self.fail_load = Some(message.to_string());
        self
    }

    pub(crate) fn failing_rotate(mut self) -> Self {
        self.fail_rotate = true;
        self
    }

    pub(crate) fn failing_save(mut self, message: &str) -> Self {
        self.fail_save = Some(message.to_string());
        self
    }

    pub(crate) fn failing_open_memory(mut self) -> Self {
        self.fail_open_memory = true;
        self
    }

    pub(crate) fn operations(&self) -> Vec<RecordedOp> {
        self.operations.lock().unwrap().clone()
    }

    pub(crate) fn live_bitmaps(&self) -> usize {
        self.bitmaps.lock().unwrap().len()
    }

    pub(crate) fn release_count(&self) -> usize {
        self.operations()
            .iter()
            .filter(|op| matches!(op, RecordedOp::Release(_)))
            .count()
    }

    pub(crate) fn profile_of(&self, bitmap: RawBitmap) -> Option<Vec<u8>> {
        self.bitmaps
            .lock()
            .unwrap()
            .get(&bitmap.0)
            .and_then(|b| b.color_profile.clone())
    }

    fn record(&self, op: RecordedOp) {
        self.operations.lock().unwrap().push(op);
    }

    fn report(&self, format: Option<Format>, message: &str) {
        if let Some(callback) = self.error_callback.read().unwrap().as_ref() {
            callback(format, message);
        }
    }

    fn insert(&self, bitmap: MockBitmap) -> RawBitmap {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.bitmaps.lock().unwrap().insert(id, bitmap);
        RawBitmap(id)
    }

    fn get(&self, bitmap: RawBitmap) -> MockBitmap {
        self.bitmaps
            .lock()
            .unwrap()
            .get(&bitmap.0)
            .cloned()
            .unwrap_or_else(|| panic!("mock bitmap {} used after release", bitmap.0))
    }

    fn decode(&self, format: Format) -> Option<RawBitmap> {
        if let Some(message) = &self.fail_load {
            self.report(Some(format), message);
            return None;
        }
        Some(self.insert(self.source.clone()))
    }
}

impl Codec for MockCodec {
    fn on_error(&self, callback: ErrorCallback) {
        *self.error_callback.write().unwrap() = Some(callback);
    }

    fn sniff_file(&self, _path: &Path) -> Option<Format> {
        self.sniffed
    }

    fn supports_reading(&self, format: Format) -> bool {
        format != Format::Ico
    }

    fn supports_writing(&self, format: Format) -> bool {
        format != Format::Ico
    }

    fn supports_color_profiles(&self, format: Format) -> bool {
        matches!(format, Format::Jpeg | Format::Png | Format::Tiff | Format::WebP)
    }

    fn load(&self, format: Format, _path: &Path, _flags: DecodeFlags) -> Option<RawBitmap> {
        self.record(RecordedOp::Load(format));
        self.decode(format)
    }

    fn open_memory(&self, _bytes: &[u8]) -> Option<MemoryStream> {
        self.record(RecordedOp::OpenMemory);
        if self.fail_open_memory {
            return None;
        }
        Some(MemoryStream(0))
    }

    fn close_memory(&self, _stream: MemoryStream) {
        self.record(RecordedOp::CloseMemory);
    }

    fn sniff_memory(&self, _stream: MemoryStream) -> Option<Format> {
        self.sniffed
    }

    fn load_memory(
        &self,
        format: Format,
        _stream: MemoryStream,
        _flags: DecodeFlags,
    ) -> Option<RawBitmap> {
        self.record(RecordedOp::LoadMemory(format));
        self.decode(format)
    }

    fn save(&self, format: Format, bitmap: RawBitmap, _path: &Path, flags: EncodeFlags) -> bool {
        self.record(RecordedOp::Save {
            format,
            bitmap,
            bit_depth: self.get(bitmap).bit_depth,
            jpeg_quality: flags.jpeg_quality,
        });
        if let Some(message) = &self.fail_save {
            self.report(Some(format), message);
            return false;
        }
        true
    }

    fn save_to_memory(
        &self,
        format: Format,
        bitmap: RawBitmap,
        flags: EncodeFlags,
    ) -> Option<Vec<u8>> {
        self.save(format, bitmap, Path::new(""), flags)
            .then(|| format.extension().as_bytes().to_vec())
    }

    fn width(&self, bitmap: RawBitmap) -> u32 {
        self.get(bitmap).width
    }

    fn height(&self, bitmap: RawBitmap) -> u32 {
        self.get(bitmap).height
    }

    fn bit_depth(&self, bitmap: RawBitmap) -> u32 {
        self.get(bitmap).bit_depth
    }

    fn clone_bitmap(&self, bitmap: RawBitmap) -> Option<RawBitmap> {
        self.record(RecordedOp::Clone(bitmap));
        let copy = self.get(bitmap);
        Some(self.insert(copy))
    }

    fn copy_region(
        &self,
        bitmap: RawBitmap,
        left: u32,
        top: u32,
        right: u32,
        bottom: u32,
    ) -> Option<RawBitmap> {
        self.record(RecordedOp::CopyRegion {
            source: bitmap,
            rect: (left, top, right, bottom),
        });
        let source = self.get(bitmap);
        Some(self.insert(MockBitmap {
            width: right - left,
            height: bottom - top,
            bit_depth: source.bit_depth,
            ..Default::default()
        }))
    }

    fn rescale(
        &self,
        bitmap: RawBitmap,
        width: u32,
        height: u32,
        filter: FilterType,
    ) -> Option<RawBitmap> {
        self.record(RecordedOp::Rescale {
            source: bitmap,
            width,
            height,
            filter,
        });
        let source = self.get(bitmap);
        Some(self.insert(MockBitmap {
            width,
            height,
            bit_depth: source.bit_depth,
            ..Default::default()
        }))
    }

    fn rotate(&self, bitmap: RawBitmap, degrees: i32) -> Option<RawBitmap> {
        self.record(RecordedOp::Rotate {
            source: bitmap,
            degrees,
        });
        if self.fail_rotate {
            self.report(None, "rotation failed");
            return None;
        }
        let source = self.get(bitmap);
        let (width, height) = if degrees.rem_euclid(180) == 90 {
            (source.height, source.width)
        } else {
            (source.width, source.height)
        };
        Some(self.insert(MockBitmap {
            width,
            height,
            bit_depth: source.bit_depth,
            ..Default::default()
        }))
    }

    fn convert_to_rgb24(&self, bitmap: RawBitmap) -> Option<RawBitmap> {
        self.record(RecordedOp::ConvertToRgb24(bitmap));
        let source = self.get(bitmap);
        Some(self.insert(MockBitmap {
            bit_depth: 24,
            ..source
        }))
    }

    fn orientation(&self, bitmap: RawBitmap) -> Option<u32> {
        self.get(bitmap).orientation
    }

    fn color_profile(&self, bitmap: RawBitmap) -> Option<Vec<u8>> {
        self.get(bitmap).color_profile
    }

    fn set_color_profile(&self, bitmap: RawBitmap, profile: &[u8]) {
        self.record(RecordedOp::SetColorProfile(bitmap));
        if let Some(b) = self.bitmaps.lock().unwrap().get_mut(&bitmap.0) {
            b.color_profile = Some(profile.to_vec());
        }
    }

    fn destroy_color_profile(&self, bitmap: RawBitmap) {
        self.record(RecordedOp::DestroyColorProfile(bitmap));
        if let Some(b) = self.bitmaps.lock().unwrap().get_mut(&bitmap.0) {
            b.color_profile = None;
        }
    }

    fn release(&self, bitmap: RawBitmap) {
        self.record(RecordedOp::Release(bitmap));
        let removed = self.bitmaps.lock().unwrap().remove(&bitmap.0);
        assert!(removed.is_some(), "mock bitmap {} released twice", bitmap.0);
    }
}
