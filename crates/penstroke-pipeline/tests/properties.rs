//! End-to-end behaviour of the public pipeline API on synthetic masks
//! and rasters.

#![allow(clippy::unwrap_used)]

use image::{GrayImage, Luma};
use penstroke_pipeline::contour::ContourExtractor;
use penstroke_pipeline::fill::concentric_fill;
use penstroke_pipeline::morphology::ink_count;
use penstroke_pipeline::order::order_and_merge;
use penstroke_pipeline::preprocess::preprocess;
use penstroke_pipeline::simplify::simplify;
use penstroke_pipeline::skeleton::skeletonize;
use penstroke_pipeline::threshold::INK;
use penstroke_pipeline::{ContourTracerKind, PipelineConfig, Point, Polyline, process_gray};

fn segment(x0: f64, y0: f64, x1: f64, y1: f64) -> Polyline {
    Polyline::new(vec![Point::new(x0, y0), Point::new(x1, y1)])
}

/// A curve that wanders enough for simplification to matter.
fn wavy(n: u32, amplitude: f64) -> Polyline {
    Polyline::new(
        (0..n)
            .map(|i| {
                let t = f64::from(i);
                Point::new(t, (t * 0.37).sin() * amplitude + (t * 1.9).cos())
            })
            .collect(),
    )
}

#[test]
fn all_white_raster_has_no_strokes() {
    let white = GrayImage::from_pixel(64, 48, Luma([255]));
    let config = PipelineConfig::default();

    let pre = preprocess(&white, &config).unwrap();
    assert_eq!(ink_count(&pre.mask), 0);

    let result = process_gray(&white, &config).unwrap();
    assert!(result.paths.is_empty());
    assert!(result.total_length.abs() < f64::EPSILON);
}

#[test]
fn straight_line_survives_as_one_stroke() {
    let mut mask = GrayImage::new(130, 40);
    for x in 10..110 {
        mask.put_pixel(x, 20, Luma([INK]));
    }

    let skeleton = skeletonize(&mask);
    assert_eq!(skeleton, mask);

    let lines = ContourExtractor::from_config(&PipelineConfig::default()).trace(&skeleton);
    assert_eq!(lines.len(), 1);
    assert!((lines[0].arc_length() - 99.0).abs() <= 1.0);

    let paths = order_and_merge(lines, PipelineConfig::DEFAULT_MERGE_DISTANCE_THRESHOLD);
    assert_eq!(paths.len(), 1);
    assert!((paths.total_length() - 99.0).abs() <= 1.0);
}

#[test]
fn border_following_keeps_out_and_back_length() {
    let raster = GrayImage::from_fn(130, 40, |x, y| {
        Luma([if y == 20 && (10..110).contains(&x) { 0 } else { 255 }])
    });
    let config = PipelineConfig {
        contour_tracer: ContourTracerKind::BorderFollowing,
        ..PipelineConfig::default()
    };
    let result = process_gray(&raster, &config).unwrap();
    assert!(
        result.total_length >= 99.0,
        "strokes total {} px",
        result.total_length
    );
}

#[test]
fn thin_detail_region_is_filled_along_its_length() {
    // A 98x3 very dark bar: small enough for the detail layer, and thin
    // enough that its single fill ring is a long narrow loop.
    let raster = GrayImage::from_fn(140, 60, |x, y| {
        let bar = (21..119).contains(&x) && (30..33).contains(&y);
        Luma([if bar { 0 } else { 255 }])
    });
    let result = process_gray(&raster, &PipelineConfig::default()).unwrap();
    let longest = result
        .paths
        .iter()
        .map(penstroke_pipeline::Path::length)
        .fold(0.0, f64::max);
    assert!(longest > 150.0, "longest stroke {longest} px");
}

#[test]
fn fill_ring_survives_ordering() {
    let bar = GrayImage::from_fn(140, 60, |x, y| {
        let inside = (21..119).contains(&x) && (30..33).contains(&y);
        Luma([if inside { INK } else { 0 }])
    });
    let rings = concentric_fill(&bar, 3);
    let raw: f64 = rings.iter().map(Polyline::arc_length).sum();
    assert!(raw > 190.0);

    let paths = order_and_merge(rings, PipelineConfig::DEFAULT_MERGE_DISTANCE_THRESHOLD);
    assert!(
        paths.total_length() > 0.95 * raw,
        "ordered {} of {raw} px",
        paths.total_length()
    );
}

#[test]
fn half_pixel_gap_is_spliced() {
    let paths = order_and_merge(
        vec![segment(0.0, 0.0, 40.0, 0.0), segment(40.5, 0.0, 60.0, 0.0)],
        1.0,
    );
    assert_eq!(paths.len(), 1);
}

#[test]
fn five_pixel_gap_stays_separate() {
    let paths = order_and_merge(
        vec![segment(45.0, 0.0, 60.0, 0.0), segment(0.0, 0.0, 40.0, 0.0)],
        1.0,
    );
    assert_eq!(paths.len(), 2);
    // Longest first, then the other entered at its nearer end.
    assert_eq!(paths.paths()[0].polyline().first(), Some(&Point::new(0.0, 0.0)));
    assert_eq!(paths.paths()[1].polyline().first(), Some(&Point::new(45.0, 0.0)));
}

#[test]
fn small_disk_fills_with_shrinking_rings() {
    let disk = GrayImage::from_fn(40, 40, |x, y| {
        let dx = x.abs_diff(20);
        let dy = y.abs_diff(20);
        Luma([if dx * dx + dy * dy <= 32 { INK } else { 0 }])
    });
    let area = ink_count(&disk);
    assert!(f64::from(u32::try_from(area).unwrap()) < PipelineConfig::DEFAULT_DETAIL_AREA_MAX);

    let rings = concentric_fill(&disk, 3);
    assert!(rings.len() >= 2);
    for pair in rings.windows(2) {
        assert!(pair[1].area() < pair[0].area());
    }
}

#[test]
fn simplification_is_idempotent() {
    for epsilon in [0.0, 0.5, 1.0, 2.5, 10.0] {
        let once = simplify(&wavy(120, 6.0), epsilon);
        let twice = simplify(&once, epsilon);
        assert_eq!(once, twice, "epsilon {epsilon}");
    }
}

#[test]
fn simplification_never_lengthens() {
    for epsilon in [0.0, 0.5, 1.0, 2.5, 10.0] {
        let raw = wavy(200, 9.0);
        assert!(simplify(&raw, epsilon).arc_length() <= raw.arc_length() + 1e-9);
    }

    let raw: Vec<Polyline> = (0..8).map(|i| wavy(40 + i * 10, f64::from(i))).collect();
    let raw_total: f64 = raw.iter().map(Polyline::arc_length).sum();
    let ordered = order_and_merge(raw, 0.0);
    assert!(ordered.total_length() <= raw_total + 1e-9);
}

#[test]
fn merge_threshold_is_monotone() {
    let input: Vec<Polyline> = (0..15)
        .map(|i| {
            let t = f64::from(i);
            segment(t * 9.0, t.sin() * 3.0, t.mul_add(9.0, 6.0), t.cos() * 2.0)
        })
        .collect();

    let counts: Vec<usize> = [0.0, 1.0, 2.0, 4.0, 8.0, 16.0]
        .into_iter()
        .map(|threshold| order_and_merge(input.clone(), threshold).len())
        .collect();
    assert!(counts.windows(2).all(|w| w[1] <= w[0]), "{counts:?}");
}

#[test]
fn skeleton_never_adds_ink() {
    let blob = GrayImage::from_fn(50, 50, |x, y| {
        let ring = (x + y) % 7 < 4 && (5..45).contains(&x) && (8..40).contains(&y);
        Luma([if ring { INK } else { 0 }])
    });
    assert!(ink_count(&skeletonize(&blob)) <= ink_count(&blob));
}

#[test]
fn fill_terminates_on_solid_mask() {
    let solid = GrayImage::from_pixel(30, 30, Luma([INK]));
    let rings = concentric_fill(&solid, 1);
    assert!(rings.len() <= 100);
}

#[test]
fn degenerate_config_is_normalized() {
    let config = PipelineConfig {
        blur_kernel_size: 0,
        threshold_block_size: 0,
        fill_step_density: 0,
        clahe_grid_size: 0,
        ..PipelineConfig::default()
    };
    let raster = GrayImage::from_fn(40, 40, |x, _| Luma([if x == 20 { 0 } else { 255 }]));
    assert!(process_gray(&raster, &config).is_ok());
}
