//! Pipeline diagnostics: timing, counts, and other metrics for each stage.
//!
//! These diagnostics are permanent instrumentation for parameter tuning.
//! [`process_staged_with_diagnostics`] drives the [`Stage`] state machine
//! one transition at a time, timing each with a caller-supplied
//! [`Clock`] so the core never reads the system time itself.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::pipeline::{Advance, Pipeline, Stage};
use crate::types::{PipelineConfig, PipelineError, Polyline, StagedResult};

/// Source of monotonic time.
///
/// Implemented by the front end (for example over `std::time::Instant`)
/// so the pipeline stays platform-agnostic.
pub trait Clock {
    /// Opaque point in time.
    type Instant;

    /// The current instant.
    fn now(&self) -> Self::Instant;

    /// Time passed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom("duration seconds must be finite and non-negative")
        })
    }
}

/// Diagnostics collected from a single pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// One entry per executed stage, in execution order.
    pub stages: Vec<StageDiagnostics>,
    /// Total wall-clock duration of the entire pipeline (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: PipelineSummary,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Short stage name (e.g. `"skeleton"`).
    pub stage: String,
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics (counts, sizes, etc.).
    pub metrics: StageMetrics,
}

/// Stage-specific metrics that vary by pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Image decoding metrics.
    Decode {
        /// Size of the input image bytes (0 when a raster was supplied).
        input_bytes: usize,
        /// Decoded image width in pixels.
        width: u32,
        /// Decoded image height in pixels.
        height: u32,
        /// Total pixel count (`width * height`).
        pixel_count: u64,
    },
    /// Equalization, blur and binarization metrics.
    Preprocess {
        /// Effective blur kernel side.
        blur_kernel_size: u32,
        /// Gaussian sigma derived from the kernel side.
        sigma: f32,
        /// Effective threshold window side.
        block_size: u32,
        /// Number of ink pixels in the binary mask.
        ink_pixel_count: u64,
        /// Total pixel count for computing ink density.
        total_pixel_count: u64,
    },
    /// Skeletonization metrics.
    Skeletonize {
        /// Ink pixels after thickening, before thinning.
        thickened_pixel_count: u64,
        /// Ink pixels in the skeleton.
        skeleton_pixel_count: u64,
    },
    /// Line-layer tracing metrics.
    TraceLines {
        /// Which tracer was used.
        tracer: String,
        /// Polylines traced before the length/area filter.
        traced_count: usize,
        /// Polylines kept.
        kept_count: usize,
        /// Total points across kept polylines.
        point_count: usize,
    },
    /// Fill-layer metrics.
    FillDetails {
        /// Ink pixels in the detail mask.
        detail_pixel_count: u64,
        /// Number of fill rings generated.
        ring_count: usize,
        /// Total points across the rings.
        point_count: usize,
    },
    /// Ordering and merging metrics.
    Order {
        /// Merge distance threshold in pixels.
        merge_threshold: f64,
        /// Polylines handed to the orderer.
        input_polyline_count: usize,
        /// Paths after merging.
        path_count: usize,
        /// Total points across paths.
        point_count: usize,
        /// Total stroke length in pixels.
        total_length: f64,
    },
}

/// High-level summary counts for the entire pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Source image width in pixels.
    pub image_width: u32,
    /// Source image height in pixels.
    pub image_height: u32,
    /// Total pixel count.
    pub pixel_count: u64,
    /// Polylines in the line layer.
    pub line_count: usize,
    /// Rings in the fill layer.
    pub ring_count: usize,
    /// Paths in the final draw order.
    pub path_count: usize,
    /// Sum of path lengths in pixels.
    pub total_length: f64,
}

impl PipelineSummary {
    fn of(result: &StagedResult) -> Self {
        Self {
            image_width: result.dimensions.width,
            image_height: result.dimensions.height,
            pixel_count: result.dimensions.pixel_count(),
            line_count: result.line_layer.len(),
            ring_count: result.fill_layer.len(),
            path_count: result.paths.len(),
            total_length: result.paths.total_length(),
        }
    }
}

/// Run the whole pipeline on encoded image bytes, timing every stage.
///
/// # Errors
///
/// Returns the same errors as [`crate::process_staged`].
pub fn process_staged_with_diagnostics<C: Clock>(
    image_bytes: &[u8],
    config: &PipelineConfig,
    clock: &C,
) -> Result<(StagedResult, PipelineDiagnostics), PipelineError> {
    let run_start = clock.now();
    let mut stage: Stage = Pipeline::new(image_bytes.to_vec(), config.clone()).into();
    let mut stages = Vec::new();

    loop {
        let start = clock.now();
        match stage.advance()? {
            Advance::Next(next) => {
                let duration = clock.elapsed(&start);
                if let Some(metrics) = next.metrics() {
                    stages.push(StageDiagnostics {
                        stage: next.name().to_owned(),
                        duration,
                        metrics,
                    });
                }
                stage = next;
            }
            Advance::Complete(done) => {
                stage = done;
                break;
            }
        }
    }

    let result = stage.complete()?;
    let diagnostics = PipelineDiagnostics {
        stages,
        total_duration: clock.elapsed(&run_start),
        summary: PipelineSummary::of(&result),
    };
    Ok((result, diagnostics))
}

impl PipelineDiagnostics {
    /// Duration of the named stage, if it ran.
    #[must_use]
    pub fn stage_duration(&self, name: &str) -> Option<Duration> {
        self.stages.iter().find(|s| s.stage == name).map(|s| s.duration)
    }

    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Pipeline Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {}x{} ({} pixels)",
            self.summary.image_width, self.summary.image_height, self.summary.pixel_count,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<16} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);
        for diag in &self.stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{:<16} {ms:>8.3}ms {pct:>9.1}%  {details}", diag.stage));
        }

        lines.push(String::new());
        lines.push(format!(
            "Lines: {}  |  Fill rings: {}  |  Paths: {}  |  Total length: {:.1}px",
            self.summary.line_count,
            self.summary.ring_count,
            self.summary.path_count,
            self.summary.total_length,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Decode {
            input_bytes,
            width,
            height,
            ..
        } => format!("{input_bytes} bytes -> {width}x{height}"),
        StageMetrics::Preprocess {
            blur_kernel_size,
            sigma,
            block_size,
            ink_pixel_count,
            total_pixel_count,
        } => {
            #[allow(clippy::cast_precision_loss)]
            let density = if *total_pixel_count > 0 {
                *ink_pixel_count as f64 / *total_pixel_count as f64 * 100.0
            } else {
                0.0
            };
            format!(
                "blur={blur_kernel_size} (sigma={sigma:.2}) block={block_size} ink={ink_pixel_count} ({density:.1}%)",
            )
        }
        StageMetrics::Skeletonize {
            thickened_pixel_count,
            skeleton_pixel_count,
        } => format!("{thickened_pixel_count} -> {skeleton_pixel_count} px"),
        StageMetrics::TraceLines {
            tracer,
            traced_count,
            kept_count,
            point_count,
        } => format!("{tracer} {traced_count} traced, {kept_count} kept, {point_count} pts"),
        StageMetrics::FillDetails {
            detail_pixel_count,
            ring_count,
            point_count,
        } => format!("{detail_pixel_count} px -> {ring_count} rings, {point_count} pts"),
        StageMetrics::Order {
            merge_threshold,
            input_polyline_count,
            path_count,
            point_count,
            total_length,
        } => format!(
            "merge<{merge_threshold:.1} {input_polyline_count} polys -> {path_count} paths, {point_count} pts, {total_length:.1}px",
        ),
    }
}

/// Count ink pixels (non-zero) in a mask.
pub(crate) fn count_ink_pixels(mask: &image::GrayImage) -> u64 {
    mask.pixels().map(|p| u64::from(p.0[0] != 0)).sum()
}

/// Total points across a slice of polylines.
pub(crate) fn total_points(polylines: &[Polyline]) -> usize {
    polylines.iter().map(Polyline::len).sum()
}
