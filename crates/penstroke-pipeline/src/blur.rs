//! Gaussian blur for noise reduction before thresholding.
//!
//! Wraps [`imageproc::filter::gaussian_blur_f32`]. The blur is configured
//! by an odd kernel size rather than a sigma, so the sigma is derived
//! from the kernel size the same way common vision libraries do when
//! they are handed a kernel size and a zero sigma.

use image::GrayImage;

use crate::types::odd_kernel_size;

/// Sigma implied by an odd kernel size: `0.3 * ((k - 1) / 2 - 1) + 0.8`.
///
/// A 3x3 kernel gives 0.8, 5x5 gives 1.1, 7x7 gives 1.4.
#[must_use]
pub fn sigma_for_kernel(kernel_size: u32) -> f32 {
    let k = odd_kernel_size(kernel_size);
    #[allow(clippy::cast_precision_loss)]
    let half = (k - 1) as f32 * 0.5;
    0.3f32.mul_add(half - 1.0, 0.8)
}

/// Apply Gaussian blur to a grayscale image.
///
/// `kernel_size` is normalized to an odd value of at least 3 before the
/// sigma is derived, so every input produces some smoothing.
#[must_use = "returns the blurred image"]
pub fn gaussian_blur(image: &GrayImage, kernel_size: u32) -> GrayImage {
    if image.width() == 0 || image.height() == 0 {
        return image.clone();
    }
    imageproc::filter::gaussian_blur_f32(image, sigma_for_kernel(kernel_size))
}
