//! Path ordering and merging: greedy nearest-neighbour chaining.
//!
//! The plotter lifts the pen between paths, and every lift costs travel
//! time. Polylines are visited longest first, each time jumping to the
//! unvisited polyline with the endpoint nearest to where the pen is.
//! When that endpoint is closer than the merge threshold the pen stays
//! down and the polyline is spliced onto the current stroke.
//!
//! The visit sequence does not depend on the threshold: the pen ends up
//! at the far end of the chosen polyline whether it was spliced or
//! started a new path. Raising the threshold can therefore only turn
//! path breaks into splices, never the reverse.
//!
//! O(n²) in the number of polylines, which stays in the low hundreds
//! after filtering.

use crate::simplify::simplify;
use crate::types::{Path, PathSet, Point, Polyline};

/// Simplification tolerance applied to each finished stroke, in pixels.
pub const STROKE_TOLERANCE: f64 = 2.0;

/// Nearest attachment found by a scan of the unvisited polylines.
#[derive(Debug, Clone, Copy)]
struct Attachment {
    /// Index into the unvisited list.
    index: usize,
    /// Euclidean distance from the pen to the attaching endpoint.
    distance: f64,
    /// Attach by the candidate's end point, drawing it backwards.
    reverse: bool,
}

/// Order polylines for drawing and splice near-touching ones together.
///
/// Empty and zero-length polylines are dropped first. The rest are
/// sorted by arc length, longest first (stable, so equal lengths keep
/// their input order), and the longest seeds the first stroke. From the
/// current stroke's last point, each step picks the unvisited polyline
/// with the nearest start or end point (the first scanned wins ties,
/// start before end). Below `merge_threshold` it is appended to the
/// current stroke, otherwise the current stroke is finished and the
/// candidate starts the next one. Every finished stroke is simplified
/// with [`STROKE_TOLERANCE`].
///
/// Every input polyline ends up in exactly one output path.
#[must_use = "returns the ordered paths"]
pub fn order_and_merge(polylines: Vec<Polyline>, merge_threshold: f64) -> PathSet {
    let mut unvisited: Vec<Polyline> = polylines
        .into_iter()
        .filter(|pl| !pl.is_empty() && pl.arc_length() > 0.0)
        .collect();
    let input_count = unvisited.len();

    unvisited.sort_by(|a, b| b.arc_length().total_cmp(&a.arc_length()));
    if unvisited.is_empty() {
        return PathSet::default();
    }

    let mut paths = Vec::new();
    let mut current: Vec<Point> = unvisited.remove(0).into_points();
    let mut splices = 0usize;

    while let Some(best) = current.last().and_then(|&pen| nearest(pen, &unvisited)) {
        let candidate = unvisited.remove(best.index);
        let candidate = if best.reverse {
            candidate.reversed()
        } else {
            candidate
        };

        if best.distance < merge_threshold {
            splice(&mut current, candidate.into_points());
            splices += 1;
        } else {
            paths.push(finish(std::mem::take(&mut current)));
            current = candidate.into_points();
        }
    }
    paths.push(finish(current));

    tracing::debug!(
        polylines = input_count,
        paths = paths.len(),
        splices,
        "ordered and merged strokes"
    );
    PathSet::new(paths)
}

/// Scan every unvisited polyline's start and end for the one nearest
/// `pen`. Strict comparison keeps the first of equal distances.
fn nearest(pen: Point, unvisited: &[Polyline]) -> Option<Attachment> {
    let mut best: Option<Attachment> = None;

    for (index, candidate) in unvisited.iter().enumerate() {
        let ends = [(candidate.first(), false), (candidate.last(), true)];
        for (end, reverse) in ends {
            let Some(&end) = end else { continue };
            let distance = pen.distance(end);
            if best.is_none_or(|b| distance < b.distance) {
                best = Some(Attachment {
                    index,
                    distance,
                    reverse,
                });
            }
        }
    }

    best
}

/// Append `next` to `stroke`, dropping its first point when it lands
/// exactly on the stroke's last point.
fn splice(stroke: &mut Vec<Point>, next: Vec<Point>) {
    let mut next = next.into_iter().peekable();
    if stroke.last().is_some_and(|last| next.peek() == Some(last)) {
        next.next();
    }
    stroke.extend(next);
}

fn finish(points: Vec<Point>) -> Path {
    Path::new(simplify(&Polyline::new(points), STROKE_TOLERANCE))
}
