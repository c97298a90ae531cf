//! Fill layer: solid-looking strokes for small very dark regions.
//!
//! Eyes, pupils and similar small markings read better filled than
//! outlined. [`detail_mask`] finds them in the blurred raster and
//! [`concentric_fill`] turns each into nested rings, outer to inner,
//! that a pen scribbles in sequence.

use image::GrayImage;
use imageproc::drawing::draw_polygon_mut;

use crate::contour::{ContourTracer, ContourTracerKind, trace_outer};
use crate::morphology::{erode_cross, is_blank, open_2x2};
use crate::simplify::simplify;
use crate::threshold::{INK, threshold_at_or_below};
use crate::types::{PipelineConfig, Polyline};

/// Hard cap on fill rounds per call.
pub const MAX_FILL_ROUNDS: usize = 100;

/// Rings enclosing this many square pixels or fewer are single-pixel
/// noise and are skipped.
pub const MIN_RING_AREA: f64 = 2.0;

/// Fixed simplification tolerance for fill rings, in pixels.
pub const RING_TOLERANCE: f64 = 1.0;

/// Mask of the small very dark regions worth filling.
///
/// Pixels of `blurred` at or below `detail_threshold` form the dark
/// mask, which is opened with a 2x2 square to drop speckle. Every
/// outermost region whose border encloses an area strictly between
/// `detail_area_min` and `detail_area_max` is filled solid into the
/// result. Larger dark areas (hair, shadows) are left to the line layer.
#[must_use = "returns the detail mask"]
pub fn detail_mask(blurred: &GrayImage, config: &PipelineConfig) -> GrayImage {
    let dark = open_2x2(&threshold_at_or_below(blurred, config.detail_threshold));
    let mut filled = GrayImage::new(blurred.width(), blurred.height());

    let mut kept = 0usize;
    for region in trace_outer(&dark) {
        let area = region.area();
        if area > config.detail_area_min && area < config.detail_area_max {
            fill_region(&mut filled, &region);
            kept += 1;
        }
    }

    tracing::debug!(regions = kept, "detail regions selected");
    filled
}

/// Paint the polygon bounded by `border` (and the border itself) as ink.
fn fill_region(mask: &mut GrayImage, border: &Polyline) {
    #[allow(clippy::cast_possible_truncation)]
    let mut poly: Vec<imageproc::point::Point<i32>> = border
        .points()
        .iter()
        .map(|p| imageproc::point::Point::new(p.x.round() as i32, p.y.round() as i32))
        .collect();

    // The polygon is closed implicitly; an explicit closing vertex is
    // rejected by the rasteriser.
    while poly.len() > 1 && poly.first() == poly.last() {
        poly.pop();
    }
    if poly.len() < 3 {
        return;
    }

    draw_polygon_mut(mask, &poly, image::Luma([INK]));
}

/// Nested contour rings approximating a solid fill of `mask`.
///
/// Each round traces every border of the current mask, keeps those
/// enclosing more than [`MIN_RING_AREA`] (simplified with
/// [`RING_TOLERANCE`]), then erodes the mask `step_size` times with the
/// 3x3 cross (`step_size` 0 is treated as 1). Stops when nothing is
/// left to trace, a round adds no ring, the mask empties, an erosion
/// makes no progress, or after [`MAX_FILL_ROUNDS`] rounds.
///
/// Rings are returned outer to inner, in generation order.
#[must_use = "returns the fill rings"]
pub fn concentric_fill(mask: &GrayImage, step_size: u32) -> Vec<Polyline> {
    let step = step_size.max(1);
    let mut current = mask.clone();
    let mut rings = Vec::new();

    for round in 0..MAX_FILL_ROUNDS {
        let borders = ContourTracerKind::BorderFollowing.trace(&current);
        if borders.is_empty() {
            break;
        }

        let before = rings.len();
        rings.extend(
            borders
                .iter()
                .filter(|b| b.area() > MIN_RING_AREA)
                .map(|b| simplify(b, RING_TOLERANCE)),
        );
        if rings.len() == before {
            break;
        }

        let previous = current.clone();
        for _ in 0..step {
            current = erode_cross(&current);
        }
        if is_blank(&current) {
            break;
        }
        if current == previous {
            tracing::debug!(round, "fill mask stopped shrinking");
            break;
        }
    }

    rings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::morphology::ink_count;

    /// Disk of the given squared radius centered in a square raster.
    fn disk(size: u32, radius_sq: u32) -> GrayImage {
        let c = size / 2;
        GrayImage::from_fn(size, size, |x, y| {
            let dx = x.abs_diff(c);
            let dy = y.abs_diff(c);
            image::Luma([if dx * dx + dy * dy <= radius_sq { INK } else { 0 }])
        })
    }

    #[test]
    fn empty_mask_has_no_rings() {
        assert!(concentric_fill(&GrayImage::new(20, 20), 3).is_empty());
    }

    #[test]
    fn small_disk_gives_nested_rings() {
        let mask = disk(40, 32);
        let area = ink_count(&mask);
        assert!((90..=110).contains(&area), "disk area {area}");

        let rings = concentric_fill(&mask, 3);
        assert!(rings.len() >= 2, "expected several rings, got {}", rings.len());
        for pair in rings.windows(2) {
            assert!(
                pair[1].area() < pair[0].area(),
                "ring areas not decreasing: {} then {}",
                pair[0].area(),
                pair[1].area(),
            );
        }
    }

    #[test]
    fn denser_step_gives_more_rings() {
        let mask = disk(60, 200);
        let dense = concentric_fill(&mask, 1);
        let sparse = concentric_fill(&mask, 3);
        assert!(dense.len() > sparse.len());
    }

    #[test]
    fn thin_bar_ring_keeps_its_length() {
        let bar = GrayImage::from_fn(140, 60, |x, y| {
            let inside = (21..119).contains(&x) && (30..33).contains(&y);
            image::Luma([if inside { INK } else { 0 }])
        });
        let rings = concentric_fill(&bar, 3);
        assert_eq!(rings.len(), 1);
        assert!(rings[0].arc_length() > 190.0, "ring length {}", rings[0].arc_length());
    }

    #[test]
    fn speck_adds_nothing() {
        let mut mask = GrayImage::new(10, 10);
        mask.put_pixel(5, 5, image::Luma([INK]));
        assert!(concentric_fill(&mask, 3).is_empty());
    }

    #[test]
    fn full_mask_terminates_early() {
        let full = GrayImage::from_pixel(12, 12, image::Luma([INK]));
        let rings = concentric_fill(&full, 1);
        assert_eq!(rings.len(), 1);
    }

    #[test]
    fn zero_step_is_treated_as_one() {
        let mask = disk(40, 50);
        assert_eq!(concentric_fill(&mask, 0), concentric_fill(&mask, 1));
    }

    #[test]
    fn detail_mask_keeps_small_dark_regions_only() {
        // A 6x6 dark square (area 25) and a 30x30 dark square (area 841)
        // on a light background.
        let blurred = GrayImage::from_fn(80, 60, |x, y| {
            let small = (5..11).contains(&x) && (5..11).contains(&y);
            let large = (40..70).contains(&x) && (20..50).contains(&y);
            image::Luma([if small || large { 30 } else { 200 }])
        });
        let mask = detail_mask(&blurred, &PipelineConfig::default());
        assert_eq!(mask.get_pixel(7, 7).0[0], INK);
        assert_eq!(mask.get_pixel(5, 5).0[0], INK);
        assert_eq!(mask.get_pixel(55, 35).0[0], 0);
        assert_eq!(ink_count(&mask), 36);
    }

    #[test]
    fn detail_mask_ignores_speckle() {
        let blurred = GrayImage::from_fn(30, 30, |x, y| {
            image::Luma([if (x + y) % 7 == 0 { 10 } else { 220 }])
        });
        assert!(is_blank(&detail_mask(&blurred, &PipelineConfig::default())));
    }

    #[test]
    fn detail_mask_fills_holes() {
        // A dark ring around a light center is filled solid.
        let blurred = GrayImage::from_fn(30, 30, |x, y| {
            let outer = (5..15).contains(&x) && (5..15).contains(&y);
            let inner = (8..12).contains(&x) && (8..12).contains(&y);
            image::Luma([if outer && !inner { 20 } else { 220 }])
        });
        let mask = detail_mask(&blurred, &PipelineConfig::default());
        assert_eq!(mask.get_pixel(10, 10).0[0], INK);
        assert_eq!(ink_count(&mask), 100);
    }
}
