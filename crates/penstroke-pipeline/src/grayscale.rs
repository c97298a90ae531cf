//! Image decoding and grayscale conversion.
//!
//! Accepts raw image bytes (PNG, JPEG, BMP, WebP) and produces the
//! single-channel raster every later stage works on.

use image::GrayImage;

use crate::types::PipelineError;

/// Decode raw image bytes and convert to grayscale.
///
/// Uses the luminance weighting of the `image` crate, so green
/// contributes most and blue least.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty,
/// [`PipelineError::ImageDecode`] if the data is not a decodable image,
/// and [`PipelineError::EmptyRaster`] if it decodes to zero pixels.
pub fn decode_and_grayscale(bytes: &[u8]) -> Result<GrayImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let gray = image::load_from_memory(bytes)?.to_luma8();
    validate(&gray)?;
    Ok(gray)
}

/// Reject rasters with a zero dimension.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyRaster`] when width or height is zero.
pub fn validate(raster: &GrayImage) -> Result<(), PipelineError> {
    let (width, height) = raster.dimensions();
    if width == 0 || height == 0 {
        return Err(PipelineError::EmptyRaster { width, height });
    }
    Ok(())
}
