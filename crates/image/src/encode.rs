//! Serializing a surface to compressed bytes.

use crate::quality::Quality;
use crate::surface::Surface;
use crate::{ImageError, Result};
use image::ColorType;
use image::codecs::jpeg::JpegEncoder;

/// Capability to serialize a surface at a given quality.
///
/// The quality search only relies on output size being non-increasing as
/// quality decreases.
pub trait SurfaceEncoder: Send + Sync {
    /// MIME type of the produced bytes.
    fn mime_type(&self) -> &'static str {
        "image/jpeg"
    }

    /// Encode the surface at `quality`.
    fn encode(&self, surface: &Surface, quality: Quality) -> Result<Vec<u8>>;
}

/// Baseline JPEG encoder from the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegSurfaceEncoder;

impl SurfaceEncoder for JpegSurfaceEncoder {
    fn encode(&self, surface: &Surface, quality: Quality) -> Result<Vec<u8>> {
        if surface.is_empty() {
            return Err(ImageError::Encode("surface is empty".into()));
        }

        let mut buffer = Vec::new();
        {
            let mut encoder = JpegEncoder::new_with_quality(&mut buffer, quality.as_percent());
            encoder
                .encode(
                    surface.pixels().as_raw(),
                    surface.width(),
                    surface.height(),
                    ColorType::Rgb8,
                )
                .map_err(|e| ImageError::Encode(format!("JPEG encode failed: {e}")))?;
        }

        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{CodecDecoder, ImageDecoder};
    use crate::dimensions::Dimensions;
    use image::{DynamicImage, Rgb, RgbImage};

    fn noisy_surface(width: u32, height: u32) -> Surface {
        let img = RgbImage::from_fn(width, height, |x, y| {
            let v = (x.wrapping_mul(31) ^ y.wrapping_mul(17)) as u8;
            Rgb([v, v.wrapping_mul(3), v.wrapping_add(91)])
        });
        Surface::from_image(&DynamicImage::ImageRgb8(img))
    }

    #[test]
    fn test_encode_jpeg_magic() {
        let data = JpegSurfaceEncoder
            .encode(&noisy_surface(10, 10), Quality::MAX)
            .unwrap();
        assert_eq!(&data[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_round_trip_preserves_dimensions() {
        let surface = noisy_surface(97, 41);
        let data = JpegSurfaceEncoder.encode(&surface, Quality::MAX).unwrap();
        let dims = CodecDecoder.probe_dimensions(&data).unwrap();
        assert_eq!(dims, Dimensions::new(97, 41));
    }

    #[test]
    fn test_lower_quality_is_smaller() {
        let surface = noisy_surface(128, 128);
        let high = JpegSurfaceEncoder.encode(&surface, Quality::MAX).unwrap();
        let low = JpegSurfaceEncoder
            .encode(&surface, Quality::new(0.1).unwrap())
            .unwrap();
        assert!(low.len() < high.len());
    }

    #[test]
    fn test_empty_surface_fails() {
        let result = JpegSurfaceEncoder.encode(&Surface::new(), Quality::MAX);
        assert!(matches!(result, Err(ImageError::Encode(_))));
    }
}
