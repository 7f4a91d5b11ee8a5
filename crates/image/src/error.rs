//! Error types for the image crate.

use thiserror::Error;

/// Result type alias for image operations.
pub type Result<T> = std::result::Result<T, ImageError>;

/// Errors that can occur during image operations.
#[derive(Debug, Error)]
pub enum ImageError {
    /// Unknown image format
    #[error("Unknown image format")]
    UnknownFormat,

    /// Invalid image data
    #[error("Invalid image data: {0}")]
    InvalidData(String),

    /// The bytes could not be decoded as an image
    #[error("Decode failed: {0}")]
    Decode(String),

    /// Serializing the surface failed
    #[error("Encode failed: {0}")]
    Encode(String),

    /// Quality outside (0, 1] or an unusable schedule
    #[error("Invalid quality: {0}")]
    InvalidQuality(String),

    /// The search was stopped before it produced any attempt
    #[error("Re-encode cancelled before the first attempt")]
    Cancelled,

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ImageError {
    /// Whether this error means the input is not a usable image.
    #[must_use]
    pub fn is_decode_failure(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::UnknownFormat | Self::InvalidData(_))
    }
}
