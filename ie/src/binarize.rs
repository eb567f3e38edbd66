//! Fixed-threshold binarization.
//!
//! The threshold is not derived from the image histogram. Source text must be
//! rendered dark on a light background for the output to mean anything.

use crate::{Color, Image, OwnedImage};

/// Pixels with luminance strictly above this value become white.
pub const THRESHOLD: u8 = 128;

/// Two-level copy of `image`: every pixel is `Color::WHITE` or `Color::BLACK`.
pub fn binarize(image: Image) -> OwnedImage {
    let mut out = image.to_owned_image();
    out.map_pixels(|v| {
        *v = if v.luminance() > THRESHOLD {
            Color::WHITE
        } else {
            Color::BLACK
        };
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient() -> OwnedImage {
        let mut img = OwnedImage::filled(16, 16, Color::WHITE);
        for y in 0..16 {
            for x in 0..16 {
                let v = (x * 16 + y) as u8;
                img.set(x, y, Color::new(v, 255 - v, v / 2));
            }
        }
        img
    }

    #[test]
    fn output_is_two_level() {
        let bin = binarize(gradient().as_image());
        let view = bin.as_image();
        for y in 0..view.height() {
            assert!(view.row(y).all(|c| c == Color::WHITE || c == Color::BLACK));
        }
    }

    #[test]
    fn binarizing_twice_is_a_no_op() {
        let once = binarize(gradient().as_image());
        let twice = binarize(once.as_image());
        assert_eq!(once, twice);
    }

    #[test]
    fn threshold_is_exclusive() {
        // 0.30*128 + 0.59*128 + 0.11*128 = 128 -> not above the threshold.
        let img = OwnedImage::filled(1, 1, Color::new(128, 128, 128));
        assert_eq!(binarize(img.as_image()).as_image().get(0, 0), Some(Color::BLACK));

        let img = OwnedImage::filled(1, 1, Color::new(129, 129, 129));
        assert_eq!(binarize(img.as_image()).as_image().get(0, 0), Some(Color::WHITE));
    }

    #[test]
    fn keeps_view_dimensions() {
        let src = gradient();
        let bin = binarize(src.as_image().sub_image(3, 4, 5, 6));
        assert_eq!((bin.width(), bin.height()), (5, 6));
    }
}
