//! Off-screen drawing surface the re-encoder serializes from.

use crate::alpha::flatten_onto;
use crate::dimensions::Dimensions;
use image::{DynamicImage, RgbImage};

/// Background transparent pixels are composited onto.
const OPAQUE_BLACK: [u8; 3] = [0, 0, 0];

/// An RGB pixel surface sized to the last image drawn onto it.
///
/// A surface may be reused for several images in sequence. Concurrent
/// re-encodes must each own a surface.
#[derive(Debug, Clone)]
pub struct Surface {
    pixels: RgbImage,
    background: [u8; 3],
}

impl Default for Surface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface {
    /// An empty 0x0 surface with an opaque black background.
    pub fn new() -> Self {
        Self {
            pixels: RgbImage::new(0, 0),
            background: OPAQUE_BLACK,
        }
    }

    /// A surface with the image already drawn.
    pub fn from_image(image: &DynamicImage) -> Self {
        let mut surface = Self::new();
        surface.draw(image);
        surface
    }

    /// Use a different background for transparent pixels.
    #[must_use]
    pub fn with_background(mut self, background: [u8; 3]) -> Self {
        self.background = background;
        self
    }

    /// Resize the surface to the image and draw it at (0, 0) without scaling.
    pub fn draw(&mut self, image: &DynamicImage) {
        let flattened = flatten_onto(image, self.background);

        if self.pixels.dimensions() == flattened.dimensions() {
            self.pixels.copy_from_slice(flattened.as_raw());
        } else {
            self.pixels = flattened;
        }
    }

    /// Current width in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Current height in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Current size of the surface.
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width(), self.height())
    }

    /// The drawn pixels.
    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    /// True while nothing has been drawn or the last image was empty.
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}
