//! Binary morphology on {0, 255} masks.
//!
//! The 3x3 cross (the pixel and its four edge neighbours) is exactly the
//! unit ball of the L1 norm, so erosion and dilation by it delegate to
//! [`imageproc::morphology`]. Pixels outside the raster never erode
//! anything: a mask that is ink everywhere is a fixed point of
//! [`erode_cross`]. Loops that erode until empty must account for that.

use image::GrayImage;
use imageproc::distance_transform::Norm;
use imageproc::morphology::{Mask, grayscale_dilate, grayscale_erode};

use crate::threshold::INK;

/// Erode once with the 3x3 cross.
#[must_use = "returns the eroded mask"]
pub fn erode_cross(mask: &GrayImage) -> GrayImage {
    imageproc::morphology::erode(mask, Norm::L1, 1)
}

/// Dilate once with the 3x3 cross.
#[must_use = "returns the dilated mask"]
pub fn dilate_cross(mask: &GrayImage) -> GrayImage {
    imageproc::morphology::dilate(mask, Norm::L1, 1)
}

/// Morphological opening with a 2x2 square: erosion then dilation.
///
/// Removes every ink component that cannot contain a 2x2 block
/// (isolated pixels, one-pixel-wide hairlines) and leaves shapes built
/// from 2x2 blocks unchanged. Pixels outside the raster count as ink, so
/// the border never erodes.
#[must_use = "returns the opened mask"]
pub fn open_2x2(mask: &GrayImage) -> GrayImage {
    let square = GrayImage::from_pixel(2, 2, image::Luma([INK]));
    // grayscale_open dilates with the mask unreflected, which shifts an
    // off-center square by a pixel. Erode anchored top-left, dilate
    // anchored bottom-right.
    let eroded = grayscale_erode(mask, &Mask::from_image(&square, 0, 0));
    grayscale_dilate(&eroded, &Mask::from_image(&square, 1, 1))
}

/// Number of ink pixels.
#[must_use]
pub fn ink_count(mask: &GrayImage) -> usize {
    mask.pixels().filter(|p| p.0[0] != 0).count()
}

/// Whether the mask has no ink at all.
#[must_use]
pub fn is_blank(mask: &GrayImage) -> bool {
    mask.pixels().all(|p| p.0[0] == 0)
}
