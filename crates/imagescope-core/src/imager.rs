//! Entry point binding a codec to the deferred error channel.

use crate::codec::{Codec, DecodeFlags, EncodeFlags, Format, ImageCodec};
use crate::error_channel;
use crate::ImagingOptions;

/// Opens images through a [`Codec`] and hands them out as scoped
/// [`Bitmap`](crate::Bitmap)s.
///
/// Construction registers the crate's error callback with the codec, so
/// every failure the codec reports lands in the calling thread's
/// [error channel](crate::error_channel).
pub struct Imager<C: Codec = ImageCodec> {
    codec: C,
    options: ImagingOptions,
}

impl<C: Codec> Imager<C> {
    pub fn new(codec: C) -> Self {
        Self::with_options(codec, ImagingOptions::default())
    }

    pub fn with_options(codec: C, options: ImagingOptions) -> Self {
        codec.on_error(Box::new(error_channel::record_from_codec));
        Self { codec, options }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn options(&self) -> &ImagingOptions {
        &self.options
    }

    pub(crate) fn decode_flags(&self, format: Format) -> DecodeFlags {
        DecodeFlags {
            accurate_jpeg: format == Format::Jpeg && self.options.accurate_jpeg,
        }
    }

    pub(crate) fn encode_flags(&self) -> EncodeFlags {
        EncodeFlags {
            jpeg_quality: self.options.jpeg_quality(),
        }
    }
}

impl Default for Imager<ImageCodec> {
    fn default() -> Self {
        Self::new(ImageCodec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::mock::MockCodec;

    #[test]
    fn test_decode_flags_accurate_only_for_jpeg() {
        let imager = Imager::new(MockCodec::with_source(1, 1));
        assert!(imager.decode_flags(Format::Jpeg).accurate_jpeg);
        assert!(!imager.decode_flags(Format::Png).accurate_jpeg);

        let mut options = ImagingOptions::default();
        options.accurate_jpeg = false;
        let imager = Imager::with_options(MockCodec::with_source(1, 1), options);
        assert!(!imager.decode_flags(Format::Jpeg).accurate_jpeg);
    }

    #[test]
    fn test_encode_flags_use_clamped_quality() {
        let mut options = ImagingOptions::default();
        options.jpeg_quality = 0;
        let imager = Imager::with_options(MockCodec::with_source(1, 1), options);
        assert_eq!(imager.encode_flags().jpeg_quality, 1);
    }
}
