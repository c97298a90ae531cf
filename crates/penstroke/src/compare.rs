//! Preset comparison sheet: the source next to one preview per preset.

use image::{GrayImage, Rgb, RgbImage};
use penstroke_pipeline::{PipelineError, Preset, process_gray};

/// Cells per row.
const COLUMNS: u32 = 2;

/// Tile the source image and each preset's preview into a grid.
///
/// The first cell is the source in grayscale, then one preview per
/// entry of `presets` in order, left to right and top to bottom. Cells
/// are the source size; unused cells stay white.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyRaster`] for a zero-dimension source.
pub fn comparison_sheet(source: &GrayImage, presets: &[Preset]) -> Result<RgbImage, PipelineError> {
    let mut cells = vec![image::DynamicImage::ImageLuma8(source.clone()).to_rgb8()];
    for &preset in presets {
        let result = process_gray(source, &preset.config())?;
        tracing::info!(
            preset = %preset,
            paths = result.paths.len(),
            total_length = result.total_length,
            "compared preset"
        );
        cells.push(result.preview);
    }

    let (width, height) = source.dimensions();
    let count = u32::try_from(cells.len()).unwrap_or(u32::MAX);
    let rows = count.div_ceil(COLUMNS);
    let mut sheet = RgbImage::from_pixel(width * COLUMNS, height * rows, Rgb([255, 255, 255]));

    for (index, cell) in (0u32..).zip(&cells) {
        let x = i64::from(index % COLUMNS * width);
        let y = i64::from(index / COLUMNS * height);
        image::imageops::replace(&mut sheet, cell, x, y);
    }
    Ok(sheet)
}
