//! Error types shared by every operation in the crate.

use thiserror::Error;

/// Errors surfaced by loading, transforming and saving bitmaps.
#[derive(Debug, Error)]
pub enum Error {
    /// The format is unrecognized, or the codec cannot read/write it.
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// A caller-supplied dimension, angle or rectangle is out of range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The input buffer does not contain image bytes.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A stream over the input could not be opened.
    #[error("I/O error: {0}")]
    Io(String),

    /// The codec produced no bitmap for an operation that must yield one.
    #[error("Operation failed: {0}")]
    OperationFailed(String),

    /// The bitmap was accessed after its scope returned it to the codec.
    #[error("Bitmap has already been released")]
    AlreadyReleased,

    /// A failure reported by the codec through its error callback.
    #[error("Codec error: {}", .0.as_deref().unwrap_or("no detail reported"))]
    Codec(Option<String>),
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
