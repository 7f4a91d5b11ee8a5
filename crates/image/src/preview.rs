//! Thumbnail previews embedded as data URLs.

use crate::Result;
use crate::dimensions::Dimensions;
use crate::encode::{JpegSurfaceEncoder, SurfaceEncoder};
use crate::quality::Quality;
use crate::surface::Surface;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::DynamicImage;
use image::imageops::FilterType;
use serde::Serialize;

/// Default thumbnail height in pixels.
pub const DEFAULT_PREVIEW_HEIGHT: u32 = 128;

/// Quality used for thumbnails.
const PREVIEW_QUALITY: f64 = 0.8;

/// A rendered thumbnail.
#[derive(Debug, Clone, Serialize)]
pub struct Preview {
    /// Thumbnail size
    pub dimensions: Dimensions,
    /// `data:image/jpeg;base64,...`
    pub data_url: String,
}

/// Render a JPEG thumbnail no taller than `max_height`.
///
/// Aspect ratio is preserved and images are never enlarged.
pub fn render_preview(image: &DynamicImage, max_height: u32) -> Result<Preview> {
    let source = Dimensions::of(image);
    let target = fit_height(source, max_height);

    let thumbnail = if target == source {
        image.clone()
    } else {
        image.resize_exact(target.width, target.height, FilterType::Triangle)
    };

    let surface = Surface::from_image(&thumbnail);
    let encoder = JpegSurfaceEncoder;
    let bytes = encoder.encode(&surface, Quality::new(PREVIEW_QUALITY)?)?;

    Ok(Preview {
        dimensions: target,
        data_url: data_url(encoder.mime_type(), &bytes),
    })
}

/// Encode bytes as a base64 data URL.
pub fn data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{mime_type};base64,{}", STANDARD.encode(bytes))
}

/// Scale down to `max_height` keeping the aspect ratio.
fn fit_height(source: Dimensions, max_height: u32) -> Dimensions {
    if max_height == 0 || source.height <= max_height {
        return source;
    }

    let ratio = f64::from(max_height) / f64::from(source.height);
    let width = (f64::from(source.width) * ratio).round() as u32;

    Dimensions::new(width.max(1), max_height)
}
