//! Shared types for the penstroke image-to-stroke pipeline.

use serde::{Deserialize, Serialize};

use crate::contour::ContourTracerKind;

/// Re-export `GrayImage` so downstream crates can reference
/// intermediate raster data without depending on `image` directly.
pub use image::GrayImage;

/// Re-export `RgbImage` so downstream crates can reference the
/// rendered previews without depending on `image` directly.
pub use image::RgbImage;

/// A 2D point in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from left edge).
    pub x: f64,
    /// Vertical position (pixels from top edge).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// An ordered sequence of points: a traced contour or a pen stroke.
///
/// Polylines are always drawn open; a traced border that closes on
/// itself simply ends next to where it started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline(Vec<Point>);

impl Polyline {
    /// Create a new polyline from a vector of points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the polyline has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of points in the polyline.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the first point, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Point> {
        self.0.first()
    }

    /// Returns the last point, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Point> {
        self.0.last()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Consumes the polyline and returns the underlying vector of points.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.0
    }

    /// Length of the open polyline: the sum of its segment lengths.
    #[must_use]
    pub fn arc_length(&self) -> f64 {
        self.0.windows(2).map(|w| w[0].distance(w[1])).sum()
    }

    /// Enclosed area via the shoelace formula, treating the point
    /// sequence as implicitly closed.
    ///
    /// For thin or self-intersecting traces the value is not a
    /// geometric area in any useful sense; it is only ever compared
    /// against thresholds.
    #[must_use]
    pub fn area(&self) -> f64 {
        let n = self.0.len();
        if n < 3 {
            return 0.0;
        }
        let twice: f64 = (0..n)
            .map(|i| {
                let a = self.0[i];
                let b = self.0[(i + 1) % n];
                a.x.mul_add(b.y, -(b.x * a.y))
            })
            .sum();
        (twice / 2.0).abs()
    }

    /// A new polyline with the points in reverse order.
    ///
    /// The receiver is left untouched; traced contours may still be
    /// referenced by preview rendering.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self(self.0.iter().rev().copied().collect())
    }
}

impl From<Vec<Point>> for Polyline {
    fn from(points: Vec<Point>) -> Self {
        Self(points)
    }
}

/// A stroke drawn with one pen-down/pen-up cycle, tagged with its
/// arc length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    polyline: Polyline,
    length: f64,
}

impl Path {
    /// Wrap a polyline, computing its arc length.
    #[must_use]
    pub fn new(polyline: Polyline) -> Self {
        let length = polyline.arc_length();
        Self { polyline, length }
    }

    /// The stroke geometry.
    #[must_use]
    pub const fn polyline(&self) -> &Polyline {
        &self.polyline
    }

    /// Arc length of the stroke in pixels.
    #[must_use]
    pub const fn length(&self) -> f64 {
        self.length
    }

    /// Consumes the path and returns its polyline.
    #[must_use]
    pub fn into_polyline(self) -> Polyline {
        self.polyline
    }
}

/// The ordered strokes produced by the pipeline.
///
/// Order is draw order: it drives the plotting sequence and the
/// progress/ETA computation downstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathSet(Vec<Path>);

impl PathSet {
    /// Create a path set from strokes already in draw order.
    #[must_use]
    pub const fn new(paths: Vec<Path>) -> Self {
        Self(paths)
    }

    /// Returns `true` if there is nothing to draw.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of strokes (pen lifts).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// The strokes in draw order.
    #[must_use]
    pub fn paths(&self) -> &[Path] {
        &self.0
    }

    /// Iterate over the strokes in draw order.
    pub fn iter(&self) -> std::slice::Iter<'_, Path> {
        self.0.iter()
    }

    /// Iterate over the stroke geometries in draw order.
    pub fn polylines(&self) -> impl Iterator<Item = &Polyline> {
        self.0.iter().map(Path::polyline)
    }

    /// Sum of all stroke lengths, in pixels.
    #[must_use]
    pub fn total_length(&self) -> f64 {
        self.0.iter().map(Path::length).sum()
    }

    /// Total number of points across all strokes.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.0.iter().map(|p| p.polyline().len()).sum()
    }

    /// Consumes the set and returns the strokes.
    #[must_use]
    pub fn into_paths(self) -> Vec<Path> {
        self.0
    }
}

impl<'a> IntoIterator for &'a PathSet {
    type Item = &'a Path;
    type IntoIter = std::slice::Iter<'a, Path>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Dimensions of a raster.
    #[must_use]
    pub fn of(image: &GrayImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
        }
    }

    /// Total pixel count.
    #[must_use]
    pub fn pixel_count(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Normalize a kernel or window size to an odd value of at least 3.
///
/// Even sizes are incremented; anything below 3 becomes 3.
#[must_use]
pub const fn odd_kernel_size(size: u32) -> u32 {
    if size < 3 {
        3
    } else if size % 2 == 0 {
        size + 1
    } else {
        size
    }
}

/// Tuning parameters for one pipeline run.
///
/// Passed by reference into every stage; there is no global state.
/// Degenerate sizes are normalized by the `normalized_*` accessors
/// rather than rejected, so careless tuning never fails a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Side of the Gaussian blur kernel applied after contrast
    /// equalization.
    pub blur_kernel_size: u32,

    /// Side of the local window used for adaptive binarization.
    pub threshold_block_size: u32,

    /// Amount subtracted from the local mean: a pixel is ink when it
    /// is at or below `mean - threshold_constant`.
    pub threshold_constant: f64,

    /// Line-layer simplification tolerance as a fraction of each
    /// polyline's arc length.
    pub simplify_epsilon_factor: f64,

    /// Line-layer polylines whose shoelace area exceeds this are kept
    /// even when shorter than `min_contour_length`.
    pub min_contour_area: f64,

    /// Line-layer polylines longer than this are kept.
    pub min_contour_length: f64,

    /// Endpoint gap (pixels) below which two strokes are spliced into
    /// one continuous stroke.
    pub merge_distance_threshold: f64,

    /// Erosion iterations between consecutive fill rings. Smaller is
    /// denser and slower to draw.
    pub fill_step_density: u32,

    /// Detail regions must have an area strictly above this.
    pub detail_area_min: f64,

    /// Detail regions must have an area strictly below this.
    pub detail_area_max: f64,

    /// Blurred intensity at or below which a pixel counts as very dark
    /// when looking for detail regions.
    pub detail_threshold: u8,

    /// Contrast-limiting clip factor for local equalization.
    pub clahe_clip_limit: f32,

    /// Number of equalization tiles along each axis.
    pub clahe_grid_size: u32,

    /// Which contour tracing algorithm produces the line layer.
    pub contour_tracer: ContourTracerKind,
}

impl PipelineConfig {
    /// Default Gaussian blur kernel side.
    pub const DEFAULT_BLUR_KERNEL_SIZE: u32 = 3;
    /// Default adaptive-threshold window side.
    pub const DEFAULT_THRESHOLD_BLOCK_SIZE: u32 = 9;
    /// Default adaptive-threshold constant.
    pub const DEFAULT_THRESHOLD_CONSTANT: f64 = 4.0;
    /// Default length-relative simplification factor.
    pub const DEFAULT_SIMPLIFY_EPSILON_FACTOR: f64 = 0.002;
    /// Default minimum line-layer area.
    pub const DEFAULT_MIN_CONTOUR_AREA: f64 = 50.0;
    /// Default minimum line-layer length.
    pub const DEFAULT_MIN_CONTOUR_LENGTH: f64 = 25.0;
    /// Default stroke splice distance.
    pub const DEFAULT_MERGE_DISTANCE_THRESHOLD: f64 = 1.0;
    /// Default erosions between fill rings.
    pub const DEFAULT_FILL_STEP_DENSITY: u32 = 3;
    /// Default lower bound on detail-region area.
    pub const DEFAULT_DETAIL_AREA_MIN: f64 = 15.0;
    /// Default upper bound on detail-region area.
    pub const DEFAULT_DETAIL_AREA_MAX: f64 = 400.0;
    /// Default very-dark intensity level.
    pub const DEFAULT_DETAIL_THRESHOLD: u8 = 90;
    /// Default contrast clip factor.
    pub const DEFAULT_CLAHE_CLIP_LIMIT: f32 = 2.0;
    /// Default equalization tiles per axis.
    pub const DEFAULT_CLAHE_GRID_SIZE: u32 = 8;

    /// Blur kernel side, forced odd and at least 3.
    #[must_use]
    pub const fn normalized_blur_kernel_size(&self) -> u32 {
        odd_kernel_size(self.blur_kernel_size)
    }

    /// Threshold window side, forced odd and at least 3.
    #[must_use]
    pub const fn normalized_block_size(&self) -> u32 {
        odd_kernel_size(self.threshold_block_size)
    }

    /// Erosions between fill rings, at least 1.
    #[must_use]
    pub const fn normalized_fill_step(&self) -> u32 {
        if self.fill_step_density == 0 {
            1
        } else {
            self.fill_step_density
        }
    }

    /// Equalization tiles per axis, at least 1.
    #[must_use]
    pub const fn normalized_grid_size(&self) -> u32 {
        if self.clahe_grid_size == 0 {
            1
        } else {
            self.clahe_grid_size
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            blur_kernel_size: Self::DEFAULT_BLUR_KERNEL_SIZE,
            threshold_block_size: Self::DEFAULT_THRESHOLD_BLOCK_SIZE,
            threshold_constant: Self::DEFAULT_THRESHOLD_CONSTANT,
            simplify_epsilon_factor: Self::DEFAULT_SIMPLIFY_EPSILON_FACTOR,
            min_contour_area: Self::DEFAULT_MIN_CONTOUR_AREA,
            min_contour_length: Self::DEFAULT_MIN_CONTOUR_LENGTH,
            merge_distance_threshold: Self::DEFAULT_MERGE_DISTANCE_THRESHOLD,
            fill_step_density: Self::DEFAULT_FILL_STEP_DENSITY,
            detail_area_min: Self::DEFAULT_DETAIL_AREA_MIN,
            detail_area_max: Self::DEFAULT_DETAIL_AREA_MAX,
            detail_threshold: Self::DEFAULT_DETAIL_THRESHOLD,
            clahe_clip_limit: Self::DEFAULT_CLAHE_CLIP_LIMIT,
            clahe_grid_size: Self::DEFAULT_CLAHE_GRID_SIZE,
            contour_tracer: ContourTracerKind::default(),
        }
    }
}

/// Output of a pipeline run: the strokes plus what a progress display
/// needs.
#[derive(Debug, Clone)]
pub struct ProcessResult {
    /// Strokes in draw order, in pixel coordinates.
    pub paths: PathSet,

    /// Sum of all stroke lengths in pixels (for ETA display).
    pub total_length: f64,

    /// Source raster with every stroke overlaid in red.
    pub preview: RgbImage,

    /// Dimensions of the source raster in pixels.
    ///
    /// Export serializers use this to set coordinate spaces
    /// (e.g., SVG `viewBox`).
    pub dimensions: Dimensions,
}

/// Result of running the pipeline with all intermediate stage outputs
/// preserved.
///
/// Each field captures the output of one logical stage so callers can
/// inspect or render every step of the chain.
#[derive(Debug, Clone)]
pub struct StagedResult {
    /// Stage 1: decoded grayscale raster.
    pub grayscale: GrayImage,
    /// Stage 2a: locally equalized raster.
    pub enhanced: GrayImage,
    /// Stage 2b: blurred raster.
    pub blurred: GrayImage,
    /// Stage 2c: binary ink mask (0 or 255).
    pub ink: GrayImage,
    /// Stage 3: one-pixel-wide skeleton of the thickened ink mask.
    pub skeleton: GrayImage,
    /// Stage 4: filtered, simplified skeleton polylines.
    pub line_layer: Vec<Polyline>,
    /// Stage 5a: solid mask of small very-dark regions.
    pub detail_mask: GrayImage,
    /// Stage 5b: concentric fill rings, outer to inner.
    pub fill_layer: Vec<Polyline>,
    /// Stage 6: ordered, merged and simplified strokes.
    pub paths: PathSet,
    /// Source raster with every stroke overlaid.
    pub preview: RgbImage,
    /// Source raster dimensions in pixels.
    pub dimensions: Dimensions,
}

impl StagedResult {
    /// Sum of all stroke lengths in pixels.
    #[must_use]
    pub fn total_length(&self) -> f64 {
        self.paths.total_length()
    }

    /// Drop the intermediates, keeping what downstream consumers need.
    #[must_use]
    pub fn into_process_result(self) -> ProcessResult {
        ProcessResult {
            total_length: self.paths.total_length(),
            paths: self.paths,
            preview: self.preview,
            dimensions: self.dimensions,
        }
    }
}

/// Errors that can occur during pipeline processing.
///
/// Finding no ink is not an error: it yields an empty [`PathSet`].
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// The raster has a zero dimension.
    #[error("raster has no pixels ({width}x{height})")]
    EmptyRaster {
        /// Raster width in pixels.
        width: u32,
        /// Raster height in pixels.
        height: u32,
    },
}
