//! Preprocessing: local contrast equalization, blur, adaptive binarization.
//!
//! Lighting varies across a photograph, so the raster is equalized per
//! tile before anything is thresholded. The blurred raster is kept
//! alongside the mask because the detail layer thresholds it again with
//! a fixed level.

use image::GrayImage;

use crate::blur::gaussian_blur;
use crate::contrast::equalize_local;
use crate::grayscale::validate;
use crate::threshold::adaptive_threshold_inv;
use crate::types::{PipelineConfig, PipelineError};

/// Intermediate rasters of the preprocessing stage.
#[derive(Debug, Clone)]
pub struct Preprocessed {
    /// Raster after local contrast equalization.
    pub enhanced: GrayImage,
    /// Equalized raster after Gaussian blur.
    pub blurred: GrayImage,
    /// Binary ink mask (0 or 255).
    pub mask: GrayImage,
}

/// Run the preprocessing stage with the given configuration.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyRaster`] for a zero-dimension raster.
pub fn preprocess(raster: &GrayImage, config: &PipelineConfig) -> Result<Preprocessed, PipelineError> {
    validate(raster)?;

    let enhanced = equalize_local(raster, config.clahe_clip_limit, config.normalized_grid_size());
    let blurred = gaussian_blur(&enhanced, config.normalized_blur_kernel_size());
    let mask = adaptive_threshold_inv(
        &blurred,
        config.normalized_block_size(),
        config.threshold_constant,
    );

    Ok(Preprocessed {
        enhanced,
        blurred,
        mask,
    })
}

/// Equalize, blur and binarize a raster into an ink mask.
///
/// Uses the default equalization settings. `blur_ksize` and
/// `block_size` are normalized to odd values of at least 3.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyRaster`] for a zero-dimension raster.
pub fn enhance_and_threshold(
    raster: &GrayImage,
    blur_ksize: u32,
    block_size: u32,
    c: f64,
) -> Result<GrayImage, PipelineError> {
    let config = PipelineConfig {
        blur_kernel_size: blur_ksize,
        threshold_block_size: block_size,
        threshold_constant: c,
        ..PipelineConfig::default()
    };
    preprocess(raster, &config).map(|p| p.mask)
}
