//! Binarization: turn a grayscale raster into a {0, 255} ink mask.
//!
//! Two flavours: an adaptive threshold against the local window mean
//! (the ink mask of the line layer) and a fixed global level (the
//! "very dark" mask of the detail layer). Both mark ink as 255.

use image::GrayImage;
use imageproc::contrast::ThresholdType;
use imageproc::integral_image::{integral_image, sum_image_pixels};

use crate::types::odd_kernel_size;

/// Mask value of an ink pixel.
pub const INK: u8 = 255;

/// Adaptive inverse threshold.
///
/// A pixel is ink when its value is at or below the mean of the
/// `block_size x block_size` window centered on it, minus `c`. The
/// window is clipped to the raster, so edge pixels are compared against
/// the mean of the pixels that exist. `block_size` is normalized to an
/// odd value of at least 3.
///
/// A uniform region is never ink for positive `c`.
#[must_use = "returns the binary mask"]
pub fn adaptive_threshold_inv(image: &GrayImage, block_size: u32, c: f64) -> GrayImage {
    let (width, height) = image.dimensions();
    let radius = odd_kernel_size(block_size) / 2;
    let integral = integral_image::<_, u64>(image);

    GrayImage::from_fn(width, height, |x, y| {
        let x0 = x.saturating_sub(radius);
        let y0 = y.saturating_sub(radius);
        let x1 = (x + radius).min(width - 1);
        let y1 = (y + radius).min(height - 1);

        let count = u64::from(x1 - x0 + 1) * u64::from(y1 - y0 + 1);
        #[allow(clippy::cast_precision_loss)]
        let mean = sum_image_pixels(&integral, x0, y0, x1, y1)[0] as f64 / count as f64;

        let value = f64::from(image.get_pixel(x, y).0[0]);
        image::Luma([if value <= mean - c { INK } else { 0 }])
    })
}

/// Fixed inverse threshold: ink where the value is at or below `level`.
#[must_use = "returns the binary mask"]
pub fn threshold_at_or_below(image: &GrayImage, level: u8) -> GrayImage {
    imageproc::contrast::threshold(image, level, ThresholdType::BinaryInverted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_binary(mask: &GrayImage) -> bool {
        mask.pixels().all(|p| p.0[0] == 0 || p.0[0] == INK)
    }

    #[test]
    fn uniform_image_has_no_ink() {
        for value in [0u8, 128, 255] {
            let img = GrayImage::from_pixel(20, 20, image::Luma([value]));
            let mask = adaptive_threshold_inv(&img, 9, 4.0);
            assert!(mask.pixels().all(|p| p.0[0] == 0), "value {value}");
        }
    }

    #[test]
    fn dark_line_on_white_is_ink() {
        let img = GrayImage::from_fn(30, 30, |_, y| image::Luma([if y == 15 { 20 } else { 230 }]));
        let mask = adaptive_threshold_inv(&img, 9, 4.0);
        assert!(is_binary(&mask));
        for x in 0..30 {
            assert_eq!(mask.get_pixel(x, 15).0[0], INK, "x={x}");
            assert_eq!(mask.get_pixel(x, 5).0[0], 0, "x={x}");
        }
    }

    #[test]
    fn constant_controls_sensitivity() {
        // A faint line only slightly darker than its surroundings.
        let img = GrayImage::from_fn(30, 30, |_, y| image::Luma([if y == 15 { 190 } else { 200 }]));
        let sensitive = adaptive_threshold_inv(&img, 9, 2.0);
        let strict = adaptive_threshold_inv(&img, 9, 20.0);
        assert_eq!(sensitive.get_pixel(10, 15).0[0], INK);
        assert_eq!(strict.get_pixel(10, 15).0[0], 0);
    }

    #[test]
    fn degenerate_block_size_is_normalized() {
        let img = GrayImage::from_fn(10, 10, |x, _| image::Luma([if x == 5 { 0 } else { 255 }]));
        assert_eq!(
            adaptive_threshold_inv(&img, 0, 4.0),
            adaptive_threshold_inv(&img, 3, 4.0)
        );
        assert_eq!(
            adaptive_threshold_inv(&img, 4, 4.0),
            adaptive_threshold_inv(&img, 5, 4.0)
        );
    }

    #[test]
    fn fixed_threshold_is_inclusive() {
        let img = GrayImage::from_fn(3, 1, |x, _| image::Luma([[89u8, 90, 91][x as usize]]));
        let mask = threshold_at_or_below(&img, 90);
        assert_eq!(mask.get_pixel(0, 0).0[0], INK);
        assert_eq!(mask.get_pixel(1, 0).0[0], INK);
        assert_eq!(mask.get_pixel(2, 0).0[0], 0);
    }

    #[test]
    fn window_is_clipped_at_the_border() {
        // The corner pixel sees a 2x2 window: 0, 100, 100, 100 (mean 75).
        let img = GrayImage::from_fn(6, 6, |x, y| image::Luma([if x == 0 && y == 0 { 0 } else { 100 }]));
        let mask = adaptive_threshold_inv(&img, 3, 75.0);
        assert_eq!(mask.get_pixel(0, 0).0[0], INK);
        assert_eq!(adaptive_threshold_inv(&img, 3, 75.5).get_pixel(0, 0).0[0], 0);
    }
}
