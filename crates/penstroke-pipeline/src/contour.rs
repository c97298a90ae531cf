//! Contour tracing: extract polylines from a binary mask.
//!
//! This module defines the [`ContourTracer`] trait for pluggable contour
//! tracing algorithms, the [`ContourTracerKind`] enum for selecting
//! which algorithm to use at runtime, and the [`ContourExtractor`] that
//! turns a skeleton into the filtered, simplified line layer.
//!
//! # Strategy pattern
//!
//! Both strategies start from Suzuki-Abe border following
//! (`imageproc::contours::find_contours`). Every border is returned,
//! holes and outer borders alike. The strategies differ in what they do
//! with one-pixel-wide curves, which border following walks out and
//! back, visiting every pixel twice.

use std::collections::HashSet;

use image::GrayImage;
use imageproc::contours::{BorderType, Contour};
use serde::{Deserialize, Serialize};

use crate::simplify::simplify_relative;
use crate::types::{PipelineConfig, Point, Polyline};

/// Selects which contour tracing algorithm to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContourTracerKind {
    /// Raw border following. Every border of every region is returned,
    /// so a thin curve comes back as an out-and-back loop and a thin
    /// ring comes back twice (outer and hole border).
    BorderFollowing,

    /// Border following with out-and-back traces folded into a single
    /// pass and duplicate hole borders of thin rings dropped. Suited to
    /// skeletons, where every curve is one pixel wide.
    #[default]
    Centerline,
}

/// Trait for contour tracing strategies.
///
/// Input: a binary mask (non-zero pixels = ink).
/// Output: one polyline per traced contour, in pixel coordinates.
pub trait ContourTracer {
    /// Trace contours in the given binary mask.
    fn trace(&self, mask: &GrayImage) -> Vec<Polyline>;
}

impl ContourTracer for ContourTracerKind {
    fn trace(&self, mask: &GrayImage) -> Vec<Polyline> {
        match *self {
            Self::BorderFollowing => trace_border_following(mask),
            Self::Centerline => trace_centerline(mask),
        }
    }
}

/// Pixel coordinate on the integer grid.
type Pixel = (i32, i32);

fn find_borders(mask: &GrayImage) -> Vec<Contour<i32>> {
    imageproc::contours::find_contours::<i32>(mask)
}

fn pixels_of(contour: &Contour<i32>) -> Vec<Pixel> {
    contour.points.iter().map(|p| (p.x, p.y)).collect()
}

/// Every border in the mask, chain-compressed.
fn trace_border_following(mask: &GrayImage) -> Vec<Polyline> {
    find_borders(mask)
        .iter()
        .map(|c| to_polyline(&compress_runs(&pixels_of(c))))
        .collect()
}

/// Borders with out-and-back traces folded to a single pass.
fn trace_centerline(mask: &GrayImage) -> Vec<Polyline> {
    let contours = find_borders(mask);

    contours
        .iter()
        .filter(|c| !is_duplicate_hole(c, &contours))
        .map(|c| {
            let pixels = pixels_of(c);
            let pixels = fold_retrace(&pixels).unwrap_or(pixels);
            to_polyline(&compress_runs(&pixels))
        })
        .collect()
}

/// The outermost borders only (regions not nested inside a hole),
/// uncompressed. Used to measure and fill detail regions.
#[must_use]
pub fn trace_outer(mask: &GrayImage) -> Vec<Polyline> {
    find_borders(mask)
        .iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| to_polyline(&pixels_of(c)))
        .collect()
}

/// A hole border that only visits pixels of its parent outer border:
/// the inside of a one-pixel-wide ring, traced a second time.
fn is_duplicate_hole(contour: &Contour<i32>, all: &[Contour<i32>]) -> bool {
    if contour.border_type != BorderType::Hole {
        return false;
    }
    let Some(parent) = contour.parent.and_then(|i| all.get(i)) else {
        return false;
    };
    let own: HashSet<Pixel> = pixels_of(contour).into_iter().collect();
    let theirs: HashSet<Pixel> = pixels_of(parent).into_iter().collect();
    own.is_subset(&theirs)
}

/// Fold an out-and-back trace of a simple open curve into one pass.
///
/// Border following around a one-pixel-wide curve produces a cyclic
/// sequence with exactly two turnarounds (one at each end of the curve,
/// where the trace steps in and straight back out). The two passes
/// between them cover the same pixels, except that the pass on the
/// inside of a bend may cut the corner diagonally.
///
/// Returns the pass covering more pixels, or `None` when the trace is
/// not of that shape (closed loops, branching skeletons, blobs).
fn fold_retrace(pixels: &[Pixel]) -> Option<Vec<Pixel>> {
    let n = pixels.len();
    if n < 4 {
        return None;
    }

    let turns: Vec<usize> = (0..n)
        .filter(|&t| pixels[(t + n - 1) % n] == pixels[(t + 1) % n])
        .collect();
    let &[a, b] = turns.as_slice() else {
        return None;
    };

    let pass = |from: usize, to: usize| -> Vec<Pixel> {
        let steps = (to + n - from) % n;
        (0..=steps).map(|k| pixels[(from + k) % n]).collect()
    };
    let forward = pass(a, b);
    let back = pass(b, a);

    let forward_set: HashSet<Pixel> = forward.iter().copied().collect();
    let back_set: HashSet<Pixel> = back.iter().copied().collect();

    let shadows = |only: &HashSet<Pixel>, other: &HashSet<Pixel>| {
        only.difference(other)
            .all(|&p| neighbours(p).any(|q| other.contains(&q)))
    };
    if !shadows(&forward_set, &back_set) || !shadows(&back_set, &forward_set) {
        return None;
    }

    Some(if back_set.len() > forward_set.len() {
        back
    } else {
        forward
    })
}

/// The 8-connected neighbours of a pixel.
fn neighbours((x, y): Pixel) -> impl Iterator<Item = Pixel> {
    (-1..=1)
        .flat_map(move |dy| (-1..=1).map(move |dx| (x + dx, y + dy)))
        .filter(move |&q| q != (x, y))
}

/// Collapse runs of identical unit steps to their end pixels.
///
/// Equivalent to keeping only the pixels where the chain code changes;
/// arc length and enclosed area are unchanged.
fn compress_runs(pixels: &[Pixel]) -> Vec<Pixel> {
    if pixels.len() < 3 {
        return pixels.to_vec();
    }

    let step = |a: Pixel, b: Pixel| (b.0 - a.0, b.1 - a.1);

    let mut out = Vec::with_capacity(pixels.len());
    out.push(pixels[0]);
    for w in pixels.windows(3) {
        if step(w[0], w[1]) != step(w[1], w[2]) {
            out.push(w[1]);
        }
    }
    out.push(pixels[pixels.len() - 1]);
    out
}

fn to_polyline(pixels: &[Pixel]) -> Polyline {
    Polyline::new(
        pixels
            .iter()
            .map(|&(x, y)| Point::new(f64::from(x), f64::from(y)))
            .collect(),
    )
}

/// Traces a skeleton into the line layer.
///
/// Each traced polyline is kept when it is longer than `min_length` OR
/// its shoelace area exceeds `min_area`, then simplified with a
/// tolerance proportional to its own length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContourExtractor {
    /// Tracing strategy.
    pub tracer: ContourTracerKind,
    /// Keep polylines with arc length strictly above this.
    pub min_length: f64,
    /// Keep polylines with shoelace area strictly above this.
    pub min_area: f64,
    /// Simplification tolerance per pixel of arc length.
    pub epsilon_factor: f64,
}

impl ContourExtractor {
    /// Extractor configured from the pipeline settings.
    #[must_use]
    pub const fn from_config(config: &PipelineConfig) -> Self {
        Self {
            tracer: config.contour_tracer,
            min_length: config.min_contour_length,
            min_area: config.min_contour_area,
            epsilon_factor: config.simplify_epsilon_factor,
        }
    }

    /// Whether a raw traced polyline survives the length/area filter.
    #[must_use]
    pub fn keeps(&self, polyline: &Polyline) -> bool {
        polyline.arc_length() > self.min_length || polyline.area() > self.min_area
    }

    /// Trace, filter and simplify.
    #[must_use]
    pub fn trace(&self, mask: &GrayImage) -> Vec<Polyline> {
        self.refine(self.tracer.trace(mask))
    }

    /// Filter and simplify already traced polylines.
    #[must_use]
    pub fn refine(&self, traced: Vec<Polyline>) -> Vec<Polyline> {
        traced
            .into_iter()
            .filter(|pl| self.keeps(pl))
            .map(|pl| simplify_relative(&pl, self.epsilon_factor))
            .collect()
    }
}
