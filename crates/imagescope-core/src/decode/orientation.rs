//! EXIF orientation and the rotation that makes a decoded bitmap upright.

use serde::{Deserialize, Serialize};

/// Where the stored image's first row and first column end up when viewed,
/// as recorded by the EXIF `Orientation` tag (values 1-8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Orientation {
    /// 1: stored upright.
    #[default]
    TopLeft,
    /// 2: mirrored left to right.
    TopRight,
    /// 3: upside down.
    BottomRight,
    /// 4: mirrored top to bottom.
    BottomLeft,
    /// 5: mirrored along the main diagonal.
    LeftTop,
    /// 6: stored turned a quarter counter-clockwise.
    RightTop,
    /// 7: mirrored along the anti-diagonal.
    RightBottom,
    /// 8: stored turned a quarter clockwise.
    LeftBottom,
}

impl Orientation {
    /// Parse a raw tag value; anything outside 1-8 is `None`.
    pub fn from_exif(value: u32) -> Option<Self> {
        const ALL: [Orientation; 8] = [
            Orientation::TopLeft,
            Orientation::TopRight,
            Orientation::BottomRight,
            Orientation::BottomLeft,
            Orientation::LeftTop,
            Orientation::RightTop,
            Orientation::RightBottom,
            Orientation::LeftBottom,
        ];
        let index = usize::try_from(value).ok()?.checked_sub(1)?;
        ALL.get(index).copied()
    }

    /// Counter-clockwise rotation that turns the stored pixels upright.
    ///
    /// Only pure quarter and half turns are corrected; mirrored orientations
    /// return `None` and the bitmap is kept as decoded.
    pub fn upright_rotation(self) -> Option<i32> {
        match self {
            Orientation::RightTop => Some(270),
            Orientation::BottomRight => Some(180),
            Orientation::LeftBottom => Some(90),
            _ => None,
        }
    }
}
