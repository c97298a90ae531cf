//! penstroke-pipeline: Pure image-to-strokes pipeline (sans-IO).
//!
//! Converts a photograph or drawing into ordered pen strokes for a
//! plotter through:
//! grayscale -> local equalization -> blur -> adaptive threshold ->
//! skeleton -> line tracing -> detail fill -> ordering and merging.
//!
//! This crate has **no I/O dependencies**: it operates on in-memory
//! bytes and rasters and returns structured data. File access, argument
//! parsing and serialization live in the `penstroke` and
//! `penstroke-export` crates.

pub mod blur;
pub mod contour;
pub mod contrast;
pub mod diagnostics;
pub mod fill;
pub mod grayscale;
pub mod morphology;
pub mod order;
pub mod pipeline;
pub mod preprocess;
pub mod preset;
pub mod preview;
pub mod progress;
pub mod simplify;
pub mod skeleton;
pub mod threshold;
pub mod types;

pub use contour::{ContourExtractor, ContourTracer, ContourTracerKind};
pub use pipeline::Pipeline;
pub use preset::Preset;
pub use progress::Eta;
pub use types::{
    Dimensions, Path, PathSet, PipelineConfig, PipelineError, Point, Polyline, ProcessResult,
    StagedResult,
};

/// Run the full pipeline on encoded image bytes.
///
/// Takes raw image bytes (PNG, JPEG, BMP, WebP) and a configuration and
/// produces the ordered strokes, their total length, a preview overlay
/// and the source dimensions.
///
/// # Pipeline steps
///
/// 1. Decode and convert to grayscale
/// 2. Local contrast equalization, Gaussian blur, inverted adaptive
///    threshold
/// 3. Thicken by one pixel, then skeletonize
/// 4. Trace the skeleton; filter by length or area; simplify
/// 5. Threshold very dark small regions and fill them with rings
/// 6. Order both layers nearest-first, merging touching strokes
///
/// An image without ink is not an error: the result has no paths.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `image_bytes` is empty,
/// [`PipelineError::ImageDecode`] if the format is unrecognized and
/// [`PipelineError::EmptyRaster`] if the image has no pixels.
pub fn process(image_bytes: &[u8], config: &PipelineConfig) -> Result<ProcessResult, PipelineError> {
    process_staged(image_bytes, config).map(StagedResult::into_process_result)
}

/// Run the full pipeline on an already decoded grayscale raster.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyRaster`] if the raster has no pixels.
pub fn process_gray(
    raster: &types::GrayImage,
    config: &PipelineConfig,
) -> Result<ProcessResult, PipelineError> {
    let staged = Pipeline::from_raster(raster.clone(), config.clone())?
        .binarize()?
        .skeletonize()
        .trace_lines()
        .fill_details()
        .order()
        .into_result();
    Ok(staged.into_process_result())
}

/// Run the full pipeline, keeping every intermediate raster and layer.
///
/// # Errors
///
/// Same as [`process`].
pub fn process_staged(
    image_bytes: &[u8],
    config: &PipelineConfig,
) -> Result<StagedResult, PipelineError> {
    let staged = Pipeline::new(image_bytes.to_vec(), config.clone())
        .decode()?
        .binarize()?
        .skeletonize()
        .trace_lines()
        .fill_details()
        .order()
        .into_result();
    tracing::info!(
        width = staged.dimensions.width,
        height = staged.dimensions.height,
        paths = staged.paths.len(),
        total_length = staged.total_length(),
        "processed image"
    );
    Ok(staged)
}
