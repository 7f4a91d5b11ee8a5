//! Alpha channel flattening.

use image::{DynamicImage, Rgb, RgbImage, Rgba};

/// Composite an image over a solid background, dropping the alpha channel.
pub fn flatten_onto(img: &DynamicImage, background: [u8; 3]) -> RgbImage {
    if !has_alpha_channel(img) {
        return img.to_rgb8();
    }

    let rgba = img.to_rgba8();
    let mut output = RgbImage::new(rgba.width(), rgba.height());

    for (x, y, pixel) in rgba.enumerate_pixels() {
        let Rgba([r, g, b, a]) = *pixel;

        let alpha = f32::from(a) / 255.0;
        let inv_alpha = 1.0 - alpha;
        let blend = |channel: u8, bg: u8| {
            (f32::from(channel) * alpha + f32::from(bg) * inv_alpha).round() as u8
        };

        output.put_pixel(
            x,
            y,
            Rgb([
                blend(r, background[0]),
                blend(g, background[1]),
                blend(b, background[2]),
            ]),
        );
    }

    output
}

/// Check if an image has an alpha channel
pub fn has_alpha_channel(img: &DynamicImage) -> bool {
    matches!(
        img,
        DynamicImage::ImageRgba8(_)
            | DynamicImage::ImageRgba16(_)
            | DynamicImage::ImageRgba32F(_)
            | DynamicImage::ImageLumaA8(_)
            | DynamicImage::ImageLumaA16(_)
    )
}
