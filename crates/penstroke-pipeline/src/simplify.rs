//! Stroke simplification using the Ramer-Douglas-Peucker algorithm.
//!
//! Reduces point count in polylines by removing points that lie within
//! `epsilon` of the segment between the points that survive around them.
//! The first and last points are always kept, so a simplified stroke
//! starts and ends exactly where the original did.
//!
//! Used three ways by the pipeline: length-relative tolerance on the
//! line layer, a fixed 1.0 px tolerance on fill rings, and a fixed
//! 2.0 px tolerance when a merged stroke is closed out.

use crate::types::{Point, Polyline};

/// Simplify a single polyline using the Ramer-Douglas-Peucker algorithm.
///
/// Points within `epsilon` pixels of the segment between their retained
/// neighbours are removed, so every original point stays within
/// `epsilon` of the simplified stroke. An epsilon of 0.0 removes only exactly
/// collinear points.
///
/// Polylines with fewer than 3 points are returned unchanged.
///
/// Simplification is idempotent and never lengthens a stroke.
#[must_use = "returns the simplified polyline"]
pub fn simplify(polyline: &Polyline, epsilon: f64) -> Polyline {
    let points = polyline.points();
    if points.len() < 3 {
        return polyline.clone();
    }

    let kept = rdp_mask(points, epsilon);

    let simplified: Vec<Point> = points
        .iter()
        .zip(&kept)
        .filter(|&(_, k)| *k)
        .map(|(&p, _)| p)
        .collect();

    Polyline::new(simplified)
}

/// Simplify with a tolerance proportional to the polyline's own arc
/// length: `epsilon = factor * arc_length`.
///
/// Long strokes tolerate proportionally coarser simplification.
#[must_use = "returns the simplified polyline"]
pub fn simplify_relative(polyline: &Polyline, factor: f64) -> Polyline {
    simplify(polyline, factor * polyline.arc_length())
}

/// Mark which points survive simplification.
///
/// Iterative rather than recursive: skeleton strokes can run to
/// thousands of points and the split tree can be as deep as the
/// stroke is long.
fn rdp_mask(points: &[Point], epsilon: f64) -> Vec<bool> {
    let last = points.len() - 1;
    let mut kept = vec![false; points.len()];
    kept[0] = true;
    kept[last] = true;

    let mut pending = vec![(0, last)];
    while let Some((start, end)) = pending.pop() {
        if end <= start + 1 {
            continue;
        }

        let mut max_dist = 0.0;
        let mut max_idx = start;
        for (i, &p) in points.iter().enumerate().take(end).skip(start + 1) {
            let d = segment_distance(p, points[start], points[end]);
            if d > max_dist {
                max_dist = d;
                max_idx = i;
            }
        }

        if max_dist > epsilon {
            kept[max_idx] = true;
            pending.push((max_idx, end));
            pending.push((start, max_idx));
        }
    }

    kept
}

/// Distance from point `p` to the segment from `a` to `b`.
///
/// Traced borders end one pixel from where they start, so the chord of
/// a whole ring is tiny; measuring to its infinite extension would put
/// the far side of a thin ring at distance ~0. Projections falling
/// outside the segment measure to the nearer endpoint instead.
fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_sq = dx.mul_add(dx, dy * dy);

    if length_sq == 0.0 {
        return p.distance(a);
    }

    let t = (p.x - a.x).mul_add(dx, (p.y - a.y) * dy) / length_sq;
    if t <= 0.0 {
        return p.distance(a);
    }
    if t >= 1.0 {
        return p.distance(b);
    }

    let cross = dx.mul_add(a.y - p.y, -(dy * (a.x - p.x)));
    cross.abs() / length_sq.sqrt()
}
