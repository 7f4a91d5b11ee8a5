//! Pixel dimensions of a decoded image.

use image::{DynamicImage, GenericImageView};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Intrinsic width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl Dimensions {
    /// Create dimensions from width and height.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Dimensions of a decoded bitmap.
    pub fn of(image: &DynamicImage) -> Self {
        let (width, height) = image.dimensions();
        Self { width, height }
    }

    /// Calculate aspect ratio (width / height).
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Check if image is landscape orientation.
    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }

    /// Check if image is portrait orientation.
    pub fn is_portrait(&self) -> bool {
        self.height > self.width
    }

    /// Total pixel count.
    pub fn pixels(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}px X {}px", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio() {
        let dims = Dimensions::new(1920, 1080);
        assert!((dims.aspect_ratio() - 16.0 / 9.0).abs() < 0.01);
    }

    #[test]
    fn test_orientation() {
        assert!(Dimensions::new(1920, 1080).is_landscape());
        assert!(Dimensions::new(1080, 1920).is_portrait());
        let square = Dimensions::new(500, 500);
        assert!(!square.is_landscape() && !square.is_portrait());
    }

    #[test]
    fn test_of_bitmap() {
        let img = DynamicImage::new_rgb8(37, 11);
        assert_eq!(Dimensions::of(&img), Dimensions::new(37, 11));
    }

    #[test]
    fn test_display_matches_preview_label() {
        assert_eq!(Dimensions::new(640, 480).to_string(), "640px X 480px");
    }
}
