//! Background compositing for alpha-less targets
//!
//! JPEG cannot carry transparency, so JPEG-bound results are flattened
//! onto an opaque white canvas of identical dimensions, blending with the
//! alpha channel as mask. After cleanup the alpha plane is binary, making
//! the blend a hard select, but the formula handles arbitrary alpha so
//! uncleaned LA/RGBA output composites correctly too.

use image::{DynamicImage, Rgb, RgbImage};

/// Canvas color behind flattened subjects
pub const CANVAS_COLOR: [u8; 3] = [255, 255, 255];

/// Flatten an image onto an opaque white canvas.
///
/// With an alpha channel present, each output sample is
/// `(a·fg + (255−a)·white) / 255`; without one this is a plain RGB
/// conversion.
pub fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }

    let rgba = image.to_rgba8();
    let mut canvas = RgbImage::from_pixel(rgba.width(), rgba.height(), Rgb(CANVAS_COLOR));

    for (x, y, pixel) in rgba.enumerate_pixels() {
        let alpha = pixel.0[3] as u16;
        if alpha == 0 {
            continue;
        }
        let mut out = [0u8; 3];
        for c in 0..3 {
            let fg = pixel.0[c] as u16;
            let bg = CANVAS_COLOR[c] as u16;
            out[c] = ((alpha * fg + (255 - alpha) * bg + 127) / 255) as u8;
        }
        canvas.put_pixel(x, y, Rgb(out));
    }

    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_transparent_pixels_become_white() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([90, 12, 240, 0]));
        let flat = flatten_onto_white(&DynamicImage::ImageRgba8(img));

        assert_eq!(flat.get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(flat.get_pixel(3, 3).0, [255, 255, 255]);
    }

    #[test]
    fn test_opaque_pixels_keep_color() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([90, 12, 240, 255]));
        let flat = flatten_onto_white(&DynamicImage::ImageRgba8(img));

        assert_eq!(flat.get_pixel(1, 1).0, [90, 12, 240]);
    }

    #[test]
    fn test_half_alpha_blends_toward_white() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 128]));
        let flat = flatten_onto_white(&DynamicImage::ImageRgba8(img));

        // (128·0 + 127·255 + 127) / 255 = 127
        let p = flat.get_pixel(0, 0);
        assert_eq!(p.0, [127, 127, 127]);
    }

    #[test]
    fn test_no_alpha_is_plain_conversion() {
        let img = RgbImage::from_pixel(3, 3, Rgb([1, 2, 3]));
        let flat = flatten_onto_white(&DynamicImage::ImageRgb8(img));

        assert_eq!(flat.get_pixel(1, 1).0, [1, 2, 3]);
    }

    #[test]
    fn test_dimensions_preserved() {
        let img = RgbaImage::new(17, 9);
        let flat = flatten_onto_white(&DynamicImage::ImageRgba8(img));

        assert_eq!(flat.width(), 17);
        assert_eq!(flat.height(), 9);
    }

    #[test]
    fn test_luma_alpha_input_composites() {
        let la = image::GrayAlphaImage::from_pixel(2, 2, image::LumaA([40, 0]));
        let flat = flatten_onto_white(&DynamicImage::ImageLumaA8(la));

        assert_eq!(flat.get_pixel(0, 0).0, [255, 255, 255]);
    }
}
