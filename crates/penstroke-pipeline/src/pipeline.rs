//! Incremental pipeline: advance stage-by-stage, inspecting each
//! intermediate result before continuing.
//!
//! Unlike [`crate::process_staged`] which runs the entire pipeline in one
//! call, [`Pipeline`] lets the caller drive execution one step at a time:
//!
//! ```rust
//! # use penstroke_pipeline::{Pipeline, PipelineConfig, PipelineError};
//! # fn run(png: Vec<u8>) -> Result<(), PipelineError> {
//! let staged = Pipeline::new(png, PipelineConfig::default())
//!     .decode()?
//!     .binarize()?
//!     .skeletonize()
//!     .trace_lines()
//!     .fill_details()
//!     .order()
//!     .into_result();
//! # Ok(())
//! # }
//! ```
//!
//! Each stage method consumes `self` and returns the next pipeline state,
//! carrying all previously computed intermediates.
//!
//! # Memory
//!
//! Every stage retains the raster stack computed so far, so a
//! 1000×1000 source pins roughly 5 MB of grayscale rasters until
//! [`Ordered::into_result`] hands them over. Callers that only need the
//! strokes should prefer [`crate::process`].

use crate::contour::{ContourExtractor, ContourTracer};
use crate::diagnostics::{StageMetrics, count_ink_pixels, total_points};
use crate::types::{
    Dimensions, GrayImage, PathSet, PipelineConfig, PipelineError, Polyline, RgbImage,
    StagedResult,
};

// ───────────────────────── Stage 0: Pending ──────────────────────────

/// Pipeline state before any processing has occurred.
///
/// Call [`decode`](Self::decode) to advance.
#[must_use = "pipeline stages are consumed by advancing, call .decode() to continue"]
pub struct Pending {
    config: PipelineConfig,
    source: Vec<u8>,
}

impl Pending {
    /// The raw source image bytes.
    #[must_use]
    pub fn source(&self) -> &[u8] {
        &self.source
    }

    /// Decode the source image to grayscale.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::EmptyInput`] for empty bytes,
    /// [`PipelineError::ImageDecode`] for unreadable data and
    /// [`PipelineError::EmptyRaster`] for a zero-dimension image.
    pub fn decode(self) -> Result<Decoded, PipelineError> {
        let grayscale = crate::grayscale::decode_and_grayscale(&self.source)?;
        tracing::debug!(
            bytes = self.source.len(),
            width = grayscale.width(),
            height = grayscale.height(),
            "decoded source image"
        );
        Ok(Decoded {
            config: self.config,
            source_len: self.source.len(),
            grayscale,
        })
    }
}

// ───────────────────────── Stage 1: Decoded ──────────────────────────

/// Pipeline state holding the grayscale source raster.
#[must_use = "pipeline stages are consumed by advancing, call .binarize() to continue"]
pub struct Decoded {
    config: PipelineConfig,
    source_len: usize,
    grayscale: GrayImage,
}

impl Decoded {
    /// The grayscale source raster.
    #[must_use]
    pub const fn grayscale(&self) -> &GrayImage {
        &self.grayscale
    }

    /// Equalize, blur and threshold into an ink mask.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::EmptyRaster`] for a zero-dimension raster.
    pub fn binarize(self) -> Result<Binarized, PipelineError> {
        let pre = crate::preprocess::preprocess(&self.grayscale, &self.config)?;
        tracing::debug!(
            ink = crate::morphology::ink_count(&pre.mask),
            "binarized raster"
        );
        Ok(Binarized {
            config: self.config,
            grayscale: self.grayscale,
            enhanced: pre.enhanced,
            blurred: pre.blurred,
            ink: pre.mask,
        })
    }
}

// ───────────────────────── Stage 2: Binarized ────────────────────────

/// Pipeline state after preprocessing.
#[must_use = "pipeline stages are consumed by advancing, call .skeletonize() to continue"]
pub struct Binarized {
    config: PipelineConfig,
    grayscale: GrayImage,
    enhanced: GrayImage,
    blurred: GrayImage,
    ink: GrayImage,
}

impl Binarized {
    /// The locally equalized raster.
    #[must_use]
    pub const fn enhanced(&self) -> &GrayImage {
        &self.enhanced
    }

    /// The blurred raster.
    #[must_use]
    pub const fn blurred(&self) -> &GrayImage {
        &self.blurred
    }

    /// The binary ink mask.
    #[must_use]
    pub const fn ink(&self) -> &GrayImage {
        &self.ink
    }

    /// Thicken the ink mask by one pixel, then thin it to a skeleton.
    ///
    /// The thickening closes single-pixel gaps that the threshold leaves
    /// in faint strokes.
    pub fn skeletonize(self) -> Skeletonized {
        let thickened = crate::morphology::dilate_cross(&self.ink);
        let thickened_pixels = count_ink_pixels(&thickened);
        let skeleton = crate::skeleton::skeletonize(&thickened);
        tracing::debug!(
            thickened = thickened_pixels,
            skeleton = count_ink_pixels(&skeleton),
            "skeletonized ink mask"
        );
        Skeletonized {
            config: self.config,
            grayscale: self.grayscale,
            enhanced: self.enhanced,
            blurred: self.blurred,
            ink: self.ink,
            thickened_pixels,
            skeleton,
        }
    }
}

// ───────────────────────── Stage 3: Skeletonized ─────────────────────

/// Pipeline state holding the one-pixel-wide skeleton.
#[must_use = "pipeline stages are consumed by advancing, call .trace_lines() to continue"]
pub struct Skeletonized {
    config: PipelineConfig,
    grayscale: GrayImage,
    enhanced: GrayImage,
    blurred: GrayImage,
    ink: GrayImage,
    thickened_pixels: u64,
    skeleton: GrayImage,
}

impl Skeletonized {
    /// The skeleton mask.
    #[must_use]
    pub const fn skeleton(&self) -> &GrayImage {
        &self.skeleton
    }

    /// Trace the skeleton into the filtered, simplified line layer.
    pub fn trace_lines(self) -> LinesTraced {
        let extractor = ContourExtractor::from_config(&self.config);
        let traced = extractor.tracer.trace(&self.skeleton);
        let traced_count = traced.len();
        let line_layer = extractor.refine(traced);
        tracing::debug!(
            tracer = ?extractor.tracer,
            traced = traced_count,
            kept = line_layer.len(),
            "traced line layer"
        );
        LinesTraced {
            config: self.config,
            grayscale: self.grayscale,
            enhanced: self.enhanced,
            blurred: self.blurred,
            ink: self.ink,
            skeleton: self.skeleton,
            traced_count,
            line_layer,
        }
    }
}

// ───────────────────────── Stage 4: LinesTraced ──────────────────────

/// Pipeline state holding the line layer.
#[must_use = "pipeline stages are consumed by advancing, call .fill_details() to continue"]
pub struct LinesTraced {
    config: PipelineConfig,
    grayscale: GrayImage,
    enhanced: GrayImage,
    blurred: GrayImage,
    ink: GrayImage,
    skeleton: GrayImage,
    traced_count: usize,
    line_layer: Vec<Polyline>,
}

impl LinesTraced {
    /// The line layer polylines.
    #[must_use]
    pub fn line_layer(&self) -> &[Polyline] {
        &self.line_layer
    }

    /// Find small dark regions and cover them with concentric rings.
    pub fn fill_details(self) -> DetailsFilled {
        let detail_mask = crate::fill::detail_mask(&self.blurred, &self.config);
        let fill_layer =
            crate::fill::concentric_fill(&detail_mask, self.config.normalized_fill_step());
        tracing::debug!(rings = fill_layer.len(), "generated detail fill");
        DetailsFilled {
            config: self.config,
            grayscale: self.grayscale,
            enhanced: self.enhanced,
            blurred: self.blurred,
            ink: self.ink,
            skeleton: self.skeleton,
            line_layer: self.line_layer,
            detail_mask,
            fill_layer,
        }
    }
}

// ───────────────────────── Stage 5: DetailsFilled ────────────────────

/// Pipeline state holding both stroke layers.
#[must_use = "pipeline stages are consumed by advancing, call .order() to continue"]
pub struct DetailsFilled {
    config: PipelineConfig,
    grayscale: GrayImage,
    enhanced: GrayImage,
    blurred: GrayImage,
    ink: GrayImage,
    skeleton: GrayImage,
    line_layer: Vec<Polyline>,
    detail_mask: GrayImage,
    fill_layer: Vec<Polyline>,
}

impl DetailsFilled {
    /// The detail mask.
    #[must_use]
    pub const fn detail_mask(&self) -> &GrayImage {
        &self.detail_mask
    }

    /// The fill rings, outer to inner.
    #[must_use]
    pub fn fill_layer(&self) -> &[Polyline] {
        &self.fill_layer
    }

    /// Order both layers for drawing and render the preview.
    pub fn order(self) -> Ordered {
        let polylines: Vec<Polyline> = self
            .line_layer
            .iter()
            .chain(&self.fill_layer)
            .cloned()
            .collect();
        let paths =
            crate::order::order_and_merge(polylines, self.config.merge_distance_threshold);
        let preview = crate::preview::render_preview(&self.grayscale, &paths);
        Ordered {
            config: self.config,
            grayscale: self.grayscale,
            enhanced: self.enhanced,
            blurred: self.blurred,
            ink: self.ink,
            skeleton: self.skeleton,
            line_layer: self.line_layer,
            detail_mask: self.detail_mask,
            fill_layer: self.fill_layer,
            paths,
            preview,
        }
    }
}

// ───────────────────────── Stage 6: Ordered ──────────────────────────

/// Final pipeline state: strokes in draw order.
#[must_use = "call .into_result() to take the staged result"]
pub struct Ordered {
    config: PipelineConfig,
    grayscale: GrayImage,
    enhanced: GrayImage,
    blurred: GrayImage,
    ink: GrayImage,
    skeleton: GrayImage,
    line_layer: Vec<Polyline>,
    detail_mask: GrayImage,
    fill_layer: Vec<Polyline>,
    paths: PathSet,
    preview: RgbImage,
}

impl Ordered {
    /// The ordered strokes.
    #[must_use]
    pub const fn paths(&self) -> &PathSet {
        &self.paths
    }

    /// The preview raster.
    #[must_use]
    pub const fn preview(&self) -> &RgbImage {
        &self.preview
    }

    /// Consume the pipeline, returning every intermediate.
    #[must_use]
    pub fn into_result(self) -> StagedResult {
        StagedResult {
            dimensions: Dimensions::of(&self.grayscale),
            grayscale: self.grayscale,
            enhanced: self.enhanced,
            blurred: self.blurred,
            ink: self.ink,
            skeleton: self.skeleton,
            line_layer: self.line_layer,
            detail_mask: self.detail_mask,
            fill_layer: self.fill_layer,
            paths: self.paths,
            preview: self.preview,
        }
    }
}

// ───────────────────────── Dynamic dispatch ──────────────────────────

/// Total number of pipeline stages, including [`Pending`].
pub const STAGE_COUNT: usize = 7;

/// Common interface implemented by every pipeline stage.
///
/// Used through [`Stage`] to drive the pipeline in a loop:
///
/// ```rust
/// # use penstroke_pipeline::{Pipeline, PipelineConfig, PipelineError};
/// # use penstroke_pipeline::pipeline::{Advance, Stage};
/// # fn run(png: Vec<u8>) -> Result<(), PipelineError> {
/// let mut stage: Stage = Pipeline::new(png, PipelineConfig::default()).into();
/// loop {
///     match stage.advance()? {
///         Advance::Next(next) => stage = next,
///         Advance::Complete(done) => { stage = done; break; }
///     }
/// }
/// let result = stage.complete()?;
/// # Ok(())
/// # }
/// ```
pub trait PipelineStage: Sized {
    /// Short name of this stage (e.g. `"skeleton"`).
    const NAME: &str;

    /// Zero-based index of this stage (`0` for Pending through `6` for
    /// Ordered).
    const INDEX: usize;

    /// Metrics describing the work done to reach this state. `None` for
    /// [`Pending`].
    fn metrics(&self) -> Option<StageMetrics>;

    /// Advance to the next stage; `Ok(None)` at the final stage.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] when decoding or preprocessing fails.
    fn next(self) -> Result<Option<Stage>, PipelineError>;

    /// Run all remaining stages to completion.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if any remaining fallible stage fails.
    fn complete(self) -> Result<StagedResult, PipelineError>;
}

impl PipelineStage for Pending {
    const NAME: &str = "source";
    const INDEX: usize = 0;

    fn metrics(&self) -> Option<StageMetrics> {
        None
    }

    fn next(self) -> Result<Option<Stage>, PipelineError> {
        Ok(Some(self.decode()?.into()))
    }

    fn complete(self) -> Result<StagedResult, PipelineError> {
        self.decode()?.complete()
    }
}

impl PipelineStage for Decoded {
    const NAME: &str = "decode";
    const INDEX: usize = 1;

    fn metrics(&self) -> Option<StageMetrics> {
        let dims = Dimensions::of(&self.grayscale);
        Some(StageMetrics::Decode {
            input_bytes: self.source_len,
            width: dims.width,
            height: dims.height,
            pixel_count: dims.pixel_count(),
        })
    }

    fn next(self) -> Result<Option<Stage>, PipelineError> {
        Ok(Some(self.binarize()?.into()))
    }

    fn complete(self) -> Result<StagedResult, PipelineError> {
        self.binarize()?.complete()
    }
}

impl PipelineStage for Binarized {
    const NAME: &str = "preprocess";
    const INDEX: usize = 2;

    fn metrics(&self) -> Option<StageMetrics> {
        let blur_kernel_size = self.config.normalized_blur_kernel_size();
        Some(StageMetrics::Preprocess {
            blur_kernel_size,
            sigma: crate::blur::sigma_for_kernel(blur_kernel_size),
            block_size: self.config.normalized_block_size(),
            ink_pixel_count: count_ink_pixels(&self.ink),
            total_pixel_count: Dimensions::of(&self.ink).pixel_count(),
        })
    }

    fn next(self) -> Result<Option<Stage>, PipelineError> {
        Ok(Some(self.skeletonize().into()))
    }

    fn complete(self) -> Result<StagedResult, PipelineError> {
        self.skeletonize().complete()
    }
}

impl PipelineStage for Skeletonized {
    const NAME: &str = "skeleton";
    const INDEX: usize = 3;

    fn metrics(&self) -> Option<StageMetrics> {
        Some(StageMetrics::Skeletonize {
            thickened_pixel_count: self.thickened_pixels,
            skeleton_pixel_count: count_ink_pixels(&self.skeleton),
        })
    }

    fn next(self) -> Result<Option<Stage>, PipelineError> {
        Ok(Some(self.trace_lines().into()))
    }

    fn complete(self) -> Result<StagedResult, PipelineError> {
        self.trace_lines().complete()
    }
}

impl PipelineStage for LinesTraced {
    const NAME: &str = "lines";
    const INDEX: usize = 4;

    fn metrics(&self) -> Option<StageMetrics> {
        Some(StageMetrics::TraceLines {
            tracer: format!("{:?}", self.config.contour_tracer),
            traced_count: self.traced_count,
            kept_count: self.line_layer.len(),
            point_count: total_points(&self.line_layer),
        })
    }

    fn next(self) -> Result<Option<Stage>, PipelineError> {
        Ok(Some(self.fill_details().into()))
    }

    fn complete(self) -> Result<StagedResult, PipelineError> {
        self.fill_details().complete()
    }
}

impl PipelineStage for DetailsFilled {
    const NAME: &str = "fill";
    const INDEX: usize = 5;

    fn metrics(&self) -> Option<StageMetrics> {
        Some(StageMetrics::FillDetails {
            detail_pixel_count: count_ink_pixels(&self.detail_mask),
            ring_count: self.fill_layer.len(),
            point_count: total_points(&self.fill_layer),
        })
    }

    fn next(self) -> Result<Option<Stage>, PipelineError> {
        Ok(Some(self.order().into()))
    }

    fn complete(self) -> Result<StagedResult, PipelineError> {
        self.order().complete()
    }
}

impl PipelineStage for Ordered {
    const NAME: &str = "order";
    const INDEX: usize = 6;

    fn metrics(&self) -> Option<StageMetrics> {
        Some(StageMetrics::Order {
            merge_threshold: self.config.merge_distance_threshold,
            input_polyline_count: self.line_layer.len() + self.fill_layer.len(),
            path_count: self.paths.len(),
            point_count: self.paths.point_count(),
            total_length: self.paths.total_length(),
        })
    }

    fn next(self) -> Result<Option<Stage>, PipelineError> {
        Ok(None)
    }

    fn complete(self) -> Result<StagedResult, PipelineError> {
        Ok(self.into_result())
    }
}

/// Any pipeline stage, for callers that advance in a loop.
#[must_use]
pub enum Stage {
    /// See [`Pending`].
    Pending(Pending),
    /// See [`Decoded`].
    Decoded(Decoded),
    /// See [`Binarized`].
    Binarized(Binarized),
    /// See [`Skeletonized`].
    Skeletonized(Skeletonized),
    /// See [`LinesTraced`].
    LinesTraced(LinesTraced),
    /// See [`DetailsFilled`].
    DetailsFilled(DetailsFilled),
    /// See [`Ordered`].
    Ordered(Ordered),
}

/// Fails to compile when a [`Stage`] variant is added without updating
/// [`STAGE_COUNT`].
#[allow(dead_code, clippy::match_same_arms)]
const fn _stage_count_guard(s: &Stage) {
    match s {
        Stage::Pending(_)
        | Stage::Decoded(_)
        | Stage::Binarized(_)
        | Stage::Skeletonized(_)
        | Stage::LinesTraced(_)
        | Stage::DetailsFilled(_)
        | Stage::Ordered(_) => {}
    }
}

/// Result of [`Stage::advance`].
#[must_use]
pub enum Advance {
    /// The pipeline advanced to this stage.
    Next(Stage),
    /// Already at the final stage, returned unchanged.
    Complete(Stage),
}

macro_rules! delegate {
    ($self:ident, $method:ident) => {
        match $self {
            Self::Pending(s) => s.$method(),
            Self::Decoded(s) => s.$method(),
            Self::Binarized(s) => s.$method(),
            Self::Skeletonized(s) => s.$method(),
            Self::LinesTraced(s) => s.$method(),
            Self::DetailsFilled(s) => s.$method(),
            Self::Ordered(s) => s.$method(),
        }
    };
}

impl Stage {
    /// Short name of the current stage.
    #[must_use]
    pub fn name(&self) -> &'static str {
        delegate!(self, name)
    }

    /// Zero-based index of the current stage.
    #[must_use]
    pub fn index(&self) -> usize {
        delegate!(self, index)
    }

    /// Metrics of the current stage; `None` while pending.
    #[must_use]
    pub fn metrics(&self) -> Option<StageMetrics> {
        delegate!(self, metrics)
    }

    /// Whether the pipeline is at the final stage.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::Ordered(_))
    }

    /// Advance to the next stage; `Ok(None)` consumes the final stage.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if a fallible stage transition fails.
    pub fn next(self) -> Result<Option<Self>, PipelineError> {
        delegate!(self, next)
    }

    /// Advance to the next stage, handing the final stage back unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if a fallible stage transition fails.
    pub fn advance(self) -> Result<Advance, PipelineError> {
        if self.is_complete() {
            return Ok(Advance::Complete(self));
        }
        // Only the final stage yields None.
        #[allow(clippy::unreachable)]
        let next = self
            .next()?
            .unwrap_or_else(|| unreachable!("non-final stage returned None from next()"));
        Ok(Advance::Next(next))
    }

    /// Run all remaining stages to completion.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if any remaining fallible stage fails.
    pub fn complete(self) -> Result<StagedResult, PipelineError> {
        delegate!(self, complete)
    }
}

// Associated constants are not reachable through `self`, so the macro
// goes through this blanket trait.
trait StageMetadata {
    fn name(&self) -> &'static str;
    fn index(&self) -> usize;
}

impl<T: PipelineStage> StageMetadata for T {
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn index(&self) -> usize {
        T::INDEX
    }
}

macro_rules! impl_from_stage {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Stage {
                fn from(s: $variant) -> Self {
                    Self::$variant(s)
                }
            }
        )*
    };
}

impl_from_stage!(
    Pending,
    Decoded,
    Binarized,
    Skeletonized,
    LinesTraced,
    DetailsFilled,
    Ordered
);

// ───────────────────── Pipeline entry point ──────────────────────────

/// Incremental image-to-strokes pipeline.
///
/// [`Pipeline::new`] stores encoded bytes; [`Pipeline::from_raster`]
/// starts from an already decoded grayscale raster.
pub struct Pipeline;

impl Pipeline {
    /// Start a pipeline from encoded image bytes. Nothing is processed
    /// until the first stage method is called.
    pub const fn new(source: Vec<u8>, config: PipelineConfig) -> Pending {
        Pending { config, source }
    }

    /// Start a pipeline from a grayscale raster, skipping decoding.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::EmptyRaster`] for a zero-dimension raster.
    pub fn from_raster(
        grayscale: GrayImage,
        config: PipelineConfig,
    ) -> Result<Decoded, PipelineError> {
        crate::grayscale::validate(&grayscale)?;
        Ok(Decoded {
            config,
            source_len: 0,
            grayscale,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// White canvas with a dark three-pixel-wide vertical bar.
    fn bar() -> GrayImage {
        GrayImage::from_fn(60, 60, |x, y| {
            let ink = (28..31).contains(&x) && (10..50).contains(&y);
            image::Luma([if ink { 0 } else { 255 }])
        })
    }

    fn png(img: &GrayImage) -> Vec<u8> {
        let mut buf = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn typed_chain_produces_strokes() {
        let result = Pipeline::new(png(&bar()), PipelineConfig::default())
            .decode()
            .unwrap()
            .binarize()
            .unwrap()
            .skeletonize()
            .trace_lines()
            .fill_details()
            .order()
            .into_result();

        assert_eq!(result.dimensions, Dimensions::of(&bar()));
        assert!(!result.line_layer.is_empty());
        assert!(!result.paths.is_empty());
        assert_eq!(result.preview.dimensions(), (60, 60));
    }

    #[test]
    fn empty_bytes_fail_to_decode() {
        let err = Pipeline::new(Vec::new(), PipelineConfig::default())
            .decode()
            .err();
        assert!(matches!(err, Some(PipelineError::EmptyInput)));
    }

    #[test]
    fn zero_sized_raster_is_rejected() {
        let err = Pipeline::from_raster(GrayImage::new(0, 4), PipelineConfig::default()).err();
        assert!(matches!(
            err,
            Some(PipelineError::EmptyRaster {
                width: 0,
                height: 4
            })
        ));
    }

    #[test]
    fn stage_loop_visits_every_stage_in_order() {
        let mut stage: Stage = Pipeline::new(png(&bar()), PipelineConfig::default()).into();
        let mut names = vec![stage.name()];
        assert!(stage.metrics().is_none());
        loop {
            match stage.advance().unwrap() {
                Advance::Next(next) => {
                    assert_eq!(next.index(), names.len());
                    assert!(next.metrics().is_some());
                    names.push(next.name());
                    stage = next;
                }
                Advance::Complete(done) => {
                    stage = done;
                    break;
                }
            }
        }
        assert_eq!(names.len(), STAGE_COUNT);
        assert_eq!(
            names,
            ["source", "decode", "preprocess", "skeleton", "lines", "fill", "order"]
        );
        assert!(stage.is_complete());
        assert!(stage.complete().is_ok());
    }

    #[test]
    fn decode_metrics_report_source_size() {
        let bytes = png(&bar());
        let len = bytes.len();
        let decoded = Pipeline::new(bytes, PipelineConfig::default()).decode().unwrap();
        assert!(matches!(
            decoded.metrics(),
            Some(StageMetrics::Decode { input_bytes, width: 60, height: 60, .. }) if input_bytes == len
        ));

        let from_raster = Pipeline::from_raster(bar(), PipelineConfig::default()).unwrap();
        assert!(matches!(
            from_raster.metrics(),
            Some(StageMetrics::Decode { input_bytes: 0, .. })
        ));
    }

    #[test]
    fn final_stage_has_no_next() {
        let ordered = Pipeline::from_raster(bar(), PipelineConfig::default())
            .unwrap()
            .binarize()
            .unwrap()
            .skeletonize()
            .trace_lines()
            .fill_details()
            .order();
        assert!(Stage::from(ordered).next().unwrap().is_none());
    }

    #[test]
    fn complete_from_any_stage_matches_chain() {
        let config = PipelineConfig::default();
        let chained = Pipeline::from_raster(bar(), config.clone())
            .unwrap()
            .binarize()
            .unwrap()
            .skeletonize()
            .trace_lines()
            .fill_details()
            .order()
            .into_result();
        let completed = Stage::from(Pipeline::from_raster(bar(), config).unwrap())
            .complete()
            .unwrap();
        assert_eq!(completed.paths, chained.paths);
        assert_eq!(completed.skeleton, chained.skeleton);
    }

    #[test]
    fn blank_raster_yields_no_strokes() {
        let white = GrayImage::from_pixel(32, 32, image::Luma([255]));
        let result = Stage::from(Pipeline::from_raster(white, PipelineConfig::default()).unwrap())
            .complete()
            .unwrap();
        assert!(result.paths.is_empty());
        assert!(result.fill_layer.is_empty());
    }
}
