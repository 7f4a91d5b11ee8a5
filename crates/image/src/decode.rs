//! Decoding raw bytes into bitmaps.

use crate::dimensions::Dimensions;
use crate::{ImageError, Result};
use image::DynamicImage;

/// Capability to turn raw bytes into a bitmap.
///
/// Injected wherever decoding happens so tests can substitute a decoder
/// with known behavior.
pub trait ImageDecoder: Send + Sync {
    /// Decode the bytes into a bitmap.
    fn decode(&self, data: &[u8]) -> Result<DynamicImage>;

    /// Intrinsic pixel dimensions of the encoded image.
    ///
    /// The default decodes the whole image so corrupt bodies behind a valid
    /// header are rejected.
    fn probe_dimensions(&self, data: &[u8]) -> Result<Dimensions> {
        self.decode(data).map(|image| Dimensions::of(&image))
    }
}

/// Decoder backed by the `image` crate codecs (JPEG, PNG, GIF, WebP, BMP).
#[derive(Debug, Clone, Copy, Default)]
pub struct CodecDecoder;

impl ImageDecoder for CodecDecoder {
    fn decode(&self, data: &[u8]) -> Result<DynamicImage> {
        if data.is_empty() {
            return Err(ImageError::Decode("empty input".into()));
        }

        image::load_from_memory(data).map_err(|e| ImageError::Decode(e.to_string()))
    }
}
