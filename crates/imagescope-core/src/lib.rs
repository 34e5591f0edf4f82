//! Imagescope Core - scoped image handling on top of a codec engine
//!
//! This crate loads raster images, applies crop / resize / rotate /
//! thumbnail transforms and saves the result, while all pixel work is done
//! by a [`Codec`]. What it adds on top of the codec:
//!
//! - every codec bitmap is owned by a scope and released on every exit path
//!   ([`bitmap`]),
//! - the codec's global error callback is bridged into typed, per-thread
//!   errors ([`error_channel`]),
//! - EXIF orientation is normalized at load time,
//! - color profiles follow bitmaps through transforms.
//!
//! # Example
//!
//! ```ignore
//! use imagescope_core::Imager;
//!
//! let imager = Imager::default();
//! imager.open("photo.jpg", |photo| {
//!     photo.cropped_thumbnail(100, |thumb| thumb.save("thumb.jpg"))
//! })?;
//! ```

pub mod bitmap;
pub mod codec;
mod decode;
mod encode;
pub mod error;
pub mod error_channel;
mod imager;
pub mod options;
mod transform;

pub use bitmap::{Bitmap, Provenance};
pub use codec::{Codec, Format, ImageCodec};
pub use decode::Orientation;
pub use error::{Error, Result};
pub use imager::Imager;
pub use options::{FilterType, ImagingOptions};
pub use transform::{square_crop_rect, thumbnail_dimensions};
