//! Image format detection from magic bytes.

use crate::{ImageError, Result};

/// Formats the intake pipeline can recognise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// JPEG image
    Jpeg,
    /// PNG image
    Png,
    /// GIF image
    Gif,
    /// WebP image
    WebP,
    /// BMP image
    Bmp,
}

impl ImageFormat {
    /// Get the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Gif => "image/gif",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Bmp => "image/bmp",
        }
    }

    /// Get common file extensions for this format.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            ImageFormat::Jpeg => &["jpg", "jpeg"],
            ImageFormat::Png => &["png"],
            ImageFormat::Gif => &["gif"],
            ImageFormat::WebP => &["webp"],
            ImageFormat::Bmp => &["bmp"],
        }
    }

    /// Look up a format by file extension (case-insensitive, no leading dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        [
            ImageFormat::Jpeg,
            ImageFormat::Png,
            ImageFormat::Gif,
            ImageFormat::WebP,
            ImageFormat::Bmp,
        ]
        .into_iter()
        .find(|format| format.extensions().contains(&ext.as_str()))
    }
}

/// Detect image format from magic bytes.
///
/// # Arguments
/// * `data` - First few bytes of the image file (at least 12 bytes recommended)
///
/// # Returns
/// Detected image format, or error if unknown
///
/// # Example
/// ```
/// use intake_image::detect_format;
///
/// // JPEG magic bytes
/// let jpeg_data = [0xFF, 0xD8, 0xFF, 0xE0];
/// assert!(matches!(detect_format(&jpeg_data), Ok(intake_image::ImageFormat::Jpeg)));
///
/// // PNG magic bytes
/// let png_data = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
/// assert!(matches!(detect_format(&png_data), Ok(intake_image::ImageFormat::Png)));
/// ```
pub fn detect_format(data: &[u8]) -> Result<ImageFormat> {
    if data.len() < 4 {
        return Err(ImageError::InvalidData("Not enough data for format detection".into()));
    }

    // JPEG: FF D8 FF
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Ok(ImageFormat::Jpeg);
    }

    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Ok(ImageFormat::Png);
    }

    // GIF: GIF87a or GIF89a
    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return Ok(ImageFormat::Gif);
    }

    // WebP: RIFF....WEBP
    if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        return Ok(ImageFormat::WebP);
    }

    // BMP: BM
    if data.starts_with(b"BM") {
        return Ok(ImageFormat::Bmp);
    }

    Err(ImageError::UnknownFormat)
}
