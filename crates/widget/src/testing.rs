//! Test doubles shared by the module tests.

use intake_image::{ImageDecoder, ImageError, SelectedFile};
use image::DynamicImage;
use std::time::Duration;

/// Decoder reading `"<w>x<h>"` or `"<w>x<h>@<delay_ms>"` from the bytes.
///
/// Anything else is a decode failure.
pub(crate) struct ScriptedDecoder;

impl ScriptedDecoder {
    fn parse(data: &[u8]) -> Option<(u32, u32, u64)> {
        let text = std::str::from_utf8(data).ok()?;
        let (size, delay) = match text.split_once('@') {
            Some((size, delay)) => (size, delay.parse().ok()?),
            None => (text, 0),
        };
        let (w, h) = size.split_once('x')?;
        Some((w.parse().ok()?, h.parse().ok()?, delay))
    }
}

impl ImageDecoder for ScriptedDecoder {
    fn decode(&self, data: &[u8]) -> intake_image::Result<DynamicImage> {
        let (width, height, delay_ms) =
            Self::parse(data).ok_or_else(|| ImageError::Decode("unrecognized test image".into()))?;
        if delay_ms > 0 {
            std::thread::sleep(Duration::from_millis(delay_ms));
        }
        Ok(DynamicImage::new_rgb8(width, height))
    }
}

pub(crate) fn webp(name: &str, script: &str) -> SelectedFile {
    SelectedFile::new(name, "image/webp", script.as_bytes().to_vec())
}

pub(crate) fn png(name: &str, script: &str) -> SelectedFile {
    SelectedFile::new(name, "image/png", script.as_bytes().to_vec())
}
