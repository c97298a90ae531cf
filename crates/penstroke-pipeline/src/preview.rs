//! Stroke overlays for progress display.
//!
//! Strokes are rasterised with `tiny-skia` on top of the grayscale
//! source. The source is opaque, so the premultiplied pixmap can be read
//! back as plain RGB. Anti-aliasing is off: overlays are meant to show
//! exactly which pixels a stroke covers.

use image::{GrayImage, RgbImage};
use tiny_skia::{LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::types::{PathSet, Polyline};

/// Overlay colour of the finished preview.
pub const PREVIEW_COLOR: [u8; 3] = [255, 0, 0];
/// Overlay colour of strokes already drawn.
pub const DRAWN_COLOR: [u8; 3] = [0, 0, 255];
/// Overlay colour of the stroke being drawn.
pub const CURRENT_COLOR: [u8; 3] = [0, 255, 0];

/// Source raster with every stroke overlaid in red, one pixel wide.
#[must_use = "returns the preview image"]
pub fn render_preview(base: &GrayImage, paths: &PathSet) -> RgbImage {
    let Some(mut pixmap) = base_pixmap(base) else {
        return gray_to_rgb(base);
    };
    for polyline in paths.polylines() {
        stroke_polyline(&mut pixmap, polyline, PREVIEW_COLOR, 1.0);
    }
    pixmap_to_rgb(&pixmap)
}

/// Progress frame while stroke `current` (0-based) is being drawn.
///
/// Strokes before `current` are overlaid in blue, one pixel wide; stroke
/// `current` in green, two pixels wide. Strokes after it are not shown.
/// A `current` past the end shows every stroke as drawn.
#[must_use = "returns the progress image"]
pub fn render_progress(base: &GrayImage, paths: &PathSet, current: usize) -> RgbImage {
    let Some(mut pixmap) = base_pixmap(base) else {
        return gray_to_rgb(base);
    };
    for polyline in paths.polylines().take(current) {
        stroke_polyline(&mut pixmap, polyline, DRAWN_COLOR, 1.0);
    }
    if let Some(path) = paths.paths().get(current) {
        stroke_polyline(&mut pixmap, path.polyline(), CURRENT_COLOR, 2.0);
    }
    pixmap_to_rgb(&pixmap)
}

/// Opaque pixmap holding the grayscale source. `None` for an empty raster.
fn base_pixmap(base: &GrayImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(base.width(), base.height())?;
    for (dst, src) in pixmap.data_mut().chunks_exact_mut(4).zip(base.pixels()) {
        let v = src.0[0];
        dst.copy_from_slice(&[v, v, v, 255]);
    }
    Some(pixmap)
}

/// Stroke a polyline through pixel centers.
#[allow(clippy::cast_possible_truncation)]
fn stroke_polyline(pixmap: &mut Pixmap, polyline: &Polyline, color: [u8; 3], width: f32) {
    let center = |v: f64| (v + 0.5) as f32;

    let mut pb = PathBuilder::new();
    let mut points = polyline.points().iter();
    if let Some(first) = points.next() {
        pb.move_to(center(first.x), center(first.y));
        for p in points {
            pb.line_to(center(p.x), center(p.y));
        }
    }
    let Some(path) = pb.finish() else {
        return;
    };

    let stroke = Stroke {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };

    let mut paint = Paint::default();
    paint.set_color_rgba8(color[0], color[1], color[2], 255);
    paint.anti_alias = false;

    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
}

/// Every pixel is opaque, so premultiplied and straight RGB coincide.
fn pixmap_to_rgb(pixmap: &Pixmap) -> RgbImage {
    let mut img = RgbImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in img.pixels_mut().zip(pixmap.data().chunks_exact(4)) {
        *dst = image::Rgb([src[0], src[1], src[2]]);
    }
    img
}

fn gray_to_rgb(base: &GrayImage) -> RgbImage {
    image::DynamicImage::ImageLuma8(base.clone()).to_rgb8()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Path, Point};

    fn white(width: u32, height: u32) -> GrayImage {
        GrayImage::from_pixel(width, height, image::Luma([255]))
    }

    fn horizontal(y: f64) -> Path {
        Path::new(Polyline::new(vec![Point::new(2.0, y), Point::new(27.0, y)]))
    }

    #[test]
    fn empty_path_set_shows_base() {
        let base = GrayImage::from_fn(8, 6, |x, _| image::Luma([u8::try_from(x * 30).unwrap_or(0)]));
        let preview = render_preview(&base, &PathSet::default());
        for (rgb, gray) in preview.pixels().zip(base.pixels()) {
            assert_eq!(rgb.0, [gray.0[0]; 3]);
        }
    }

    #[test]
    fn strokes_are_red_in_preview() {
        let paths = PathSet::new(vec![horizontal(10.0)]);
        let preview = render_preview(&white(30, 20), &paths);
        assert_eq!(preview.get_pixel(15, 10).0, PREVIEW_COLOR);
        assert_eq!(preview.get_pixel(15, 5).0, [255, 255, 255]);
    }

    #[test]
    fn progress_colours_drawn_and_current() {
        let paths = PathSet::new(vec![horizontal(4.0), horizontal(10.0), horizontal(16.0)]);
        let frame = render_progress(&white(30, 20), &paths, 1);
        assert_eq!(frame.get_pixel(15, 4).0, DRAWN_COLOR);
        assert_eq!(frame.get_pixel(15, 10).0, CURRENT_COLOR);
        // Not yet drawn.
        assert_eq!(frame.get_pixel(15, 16).0, [255, 255, 255]);
    }

    #[test]
    fn progress_past_the_end_shows_all_drawn() {
        let paths = PathSet::new(vec![horizontal(4.0), horizontal(10.0)]);
        let frame = render_progress(&white(30, 20), &paths, 5);
        assert_eq!(frame.get_pixel(15, 4).0, DRAWN_COLOR);
        assert_eq!(frame.get_pixel(15, 10).0, DRAWN_COLOR);
    }

    #[test]
    fn preview_matches_base_dimensions() {
        let preview = render_preview(&white(31, 17), &PathSet::default());
        assert_eq!(preview.dimensions(), (31, 17));
    }
}
