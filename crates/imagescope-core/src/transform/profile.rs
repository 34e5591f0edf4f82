//! Color profile propagation between codec bitmaps.

use crate::codec::{Codec, Format, RawBitmap};

/// Copy the ICC profile of `from` onto `to`.
///
/// Only done when `format` is known, is not PNG (the saver strips PNG
/// profiles) and the codec can carry profiles for it.
pub(crate) fn copy_color_profile<C: Codec>(
    codec: &C,
    format: Option<Format>,
    from: RawBitmap,
    to: RawBitmap,
) {
    let Some(format) = format else {
        return;
    };
    if format == Format::Png || !codec.supports_color_profiles(format) {
        return;
    }
    if let Some(profile) = codec.color_profile(from) {
        codec.set_color_profile(to, &profile);
    }
}
