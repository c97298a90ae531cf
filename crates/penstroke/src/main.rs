//! penstroke: turn an image into ordered pen strokes.
//!
//! Runs the stroke pipeline on an image file, prints per-stage
//! diagnostics, and optionally writes the preview, an SVG, the strokes
//! as JSON, and a preset comparison sheet.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin penstroke -- [OPTIONS] <IMAGE_PATH>
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default
//! `info`).

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod compare;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use penstroke_pipeline::diagnostics::{Clock, PipelineDiagnostics};
use penstroke_pipeline::{ContourTracerKind, PipelineConfig, Preset, StagedResult};
use tracing_subscriber::EnvFilter;

/// Convert a photograph or drawing into pen strokes for a plotter.
///
/// Parameters start from the chosen preset; individual flags override
/// it, and `--config-json` replaces everything.
#[derive(Parser)]
#[command(name = "penstroke", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Named parameter set to start from.
    #[arg(long, value_enum, default_value_t = PresetArg::SmartHybrid)]
    preset: PresetArg,

    /// Gaussian blur kernel side (forced odd, at least 3).
    #[arg(long)]
    blur_kernel_size: Option<u32>,

    /// Adaptive-threshold window side (forced odd, at least 3).
    #[arg(long)]
    threshold_block_size: Option<u32>,

    /// Amount subtracted from the local mean before thresholding.
    #[arg(long)]
    threshold_constant: Option<f64>,

    /// Line simplification tolerance as a fraction of arc length.
    #[arg(long)]
    simplify_epsilon_factor: Option<f64>,

    /// Keep line-layer polylines with a larger shoelace area.
    #[arg(long)]
    min_contour_area: Option<f64>,

    /// Keep line-layer polylines longer than this (pixels).
    #[arg(long)]
    min_contour_length: Option<f64>,

    /// Splice strokes whose endpoints are closer than this (pixels).
    #[arg(long)]
    merge_distance: Option<f64>,

    /// Erosions between detail fill rings.
    #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    fill_step: Option<u32>,

    /// Blurred intensity at or below which a pixel is very dark.
    #[arg(long)]
    detail_threshold: Option<u8>,

    /// Fill dark regions enclosing more than this area (pixels²).
    #[arg(long)]
    detail_area_min: Option<f64>,

    /// Fill dark regions enclosing less than this area (pixels²).
    #[arg(long)]
    detail_area_max: Option<f64>,

    /// Contrast-limiting clip factor for local equalization.
    #[arg(long)]
    clahe_clip_limit: Option<f32>,

    /// Local equalization tiles per axis.
    #[arg(long)]
    clahe_grid_size: Option<u32>,

    /// Contour tracing strategy for the line layer.
    #[arg(long, value_enum)]
    tracer: Option<Tracer>,

    /// Full pipeline config as a JSON string.
    ///
    /// When provided, the preset and all other parameter flags are
    /// ignored. Missing fields take their defaults.
    #[arg(long)]
    config_json: Option<String>,

    /// Number of runs for averaging.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Output diagnostics as JSON instead of the human-readable report.
    #[arg(long)]
    json: bool,

    /// Write the preview overlay (PNG).
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Write the strokes as SVG.
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Write the strokes as JSON.
    #[arg(long)]
    paths: Option<PathBuf>,

    /// Write a sheet comparing every preset (PNG).
    #[arg(long)]
    compare: Option<PathBuf>,
}

/// Preset selection.
#[derive(Clone, Copy, ValueEnum)]
enum PresetArg {
    /// Balanced line and fill detail.
    SmartHybrid,
    /// Faint fine lines.
    DetailFocus,
    /// Fewer wobbly fragments.
    SmoothLines,
    /// Bold outlines.
    ThickLines,
    /// Quick, coarse drawings.
    Simple,
}

impl From<PresetArg> for Preset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::SmartHybrid => Self::SmartHybrid,
            PresetArg::DetailFocus => Self::DetailFocus,
            PresetArg::SmoothLines => Self::SmoothLines,
            PresetArg::ThickLines => Self::ThickLines,
            PresetArg::Simple => Self::Simple,
        }
    }
}

/// Contour tracer selection.
#[derive(Clone, Copy, ValueEnum)]
enum Tracer {
    /// Raw border following.
    Border,
    /// Border following with out-and-back traces folded.
    Centerline,
}

impl From<Tracer> for ContourTracerKind {
    fn from(arg: Tracer) -> Self {
        match arg {
            Tracer::Border => Self::BorderFollowing,
            Tracer::Centerline => Self::Centerline,
        }
    }
}

/// Build a [`PipelineConfig`] from CLI arguments.
fn config_from_cli(cli: &Cli) -> Result<PipelineConfig> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).context("parsing --config-json");
    }

    let mut config = Preset::from(cli.preset).config();
    if let Some(v) = cli.blur_kernel_size {
        config.blur_kernel_size = v;
    }
    if let Some(v) = cli.threshold_block_size {
        config.threshold_block_size = v;
    }
    if let Some(v) = cli.threshold_constant {
        config.threshold_constant = v;
    }
    if let Some(v) = cli.simplify_epsilon_factor {
        config.simplify_epsilon_factor = v;
    }
    if let Some(v) = cli.min_contour_area {
        config.min_contour_area = v;
    }
    if let Some(v) = cli.min_contour_length {
        config.min_contour_length = v;
    }
    if let Some(v) = cli.merge_distance {
        config.merge_distance_threshold = v;
    }
    if let Some(v) = cli.fill_step {
        config.fill_step_density = v;
    }
    if let Some(v) = cli.detail_threshold {
        config.detail_threshold = v;
    }
    if let Some(v) = cli.detail_area_min {
        config.detail_area_min = v;
    }
    if let Some(v) = cli.detail_area_max {
        config.detail_area_max = v;
    }
    if let Some(v) = cli.clahe_clip_limit {
        config.clahe_clip_limit = v;
    }
    if let Some(v) = cli.clahe_grid_size {
        config.clahe_grid_size = v;
    }
    if let Some(v) = cli.tracer {
        config.contour_tracer = v.into();
    }
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = config_from_cli(&cli)?;

    let image_bytes = std::fs::read(&cli.image_path)
        .with_context(|| format!("reading {}", cli.image_path.display()))?;

    tracing::info!(
        image = %cli.image_path.display(),
        bytes = image_bytes.len(),
        runs = cli.runs,
        "starting"
    );
    tracing::debug!(?config, "pipeline config");

    let mut all_diagnostics = Vec::with_capacity(cli.runs);
    let mut first_result = None;

    for run in 0..cli.runs {
        if cli.runs > 1 {
            eprintln!("--- Run {}/{} ---", run + 1, cli.runs);
        }

        let (staged, diagnostics) = penstroke_pipeline::diagnostics::process_staged_with_diagnostics(
            &image_bytes,
            &config,
            &StdClock,
        )
        .context("pipeline failed")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&diagnostics).context("serializing diagnostics")?
            );
        } else {
            println!("{}", diagnostics.report());
        }

        if first_result.is_none() {
            first_result = Some(staged);
        }
        all_diagnostics.push(diagnostics);
    }

    if cli.runs > 1 {
        print_multi_run_summary(&all_diagnostics);
    }

    if let Some(staged) = first_result {
        write_outputs(&cli, &config, &staged)?;
    }

    if let Some(ref sheet_path) = cli.compare {
        let grayscale = penstroke_pipeline::grayscale::decode_and_grayscale(&image_bytes)?;
        let sheet = compare::comparison_sheet(&grayscale, &Preset::ALL)?;
        save_png(&sheet, sheet_path)?;
    }

    Ok(())
}

/// Write every requested output file for one staged result.
fn write_outputs(cli: &Cli, config: &PipelineConfig, staged: &StagedResult) -> Result<()> {
    if let Some(ref preview_path) = cli.preview {
        save_png(&staged.preview, preview_path)?;
    }

    if let Some(ref svg_path) = cli.svg {
        let title = cli
            .image_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("penstroke");
        let description = format!(
            "{} strokes, {:.1}px total",
            staged.paths.len(),
            staged.total_length()
        );
        let config_json = serde_json::to_string(config).context("serializing config")?;
        let metadata = penstroke_export::SvgMetadata {
            title: Some(title),
            description: Some(&description),
            config_json: Some(&config_json),
        };
        let svg = penstroke_export::to_svg(&staged.paths, staged.dimensions, &metadata);
        write_file(svg_path, svg.as_bytes())?;
    }

    if let Some(ref paths_path) = cli.paths {
        let json = penstroke_export::to_json_with_dimensions(&staged.paths, staged.dimensions)?;
        write_file(paths_path, json.as_bytes())?;
    }

    Ok(())
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = contents.len(), "wrote output");
    Ok(())
}

fn save_png(image: &image::RgbImage, path: &Path) -> Result<()> {
    image
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        "wrote image"
    );
    Ok(())
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

/// Print aggregated statistics across multiple runs.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(all_diagnostics: &[PipelineDiagnostics]) {
    let Some(first) = all_diagnostics.first() else {
        println!("Warning: no diagnostics to summarize");
        return;
    };

    println!();
    println!(
        "Summary ({} runs)\n{}",
        all_diagnostics.len(),
        "=".repeat(60),
    );

    let durations: Vec<f64> = all_diagnostics
        .iter()
        .map(|d| d.total_duration.as_secs_f64() * 1000.0)
        .collect();

    let min = durations.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = durations.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;

    println!("Total duration: min={min:.3}ms  mean={mean:.3}ms  max={max:.3}ms");

    println!();
    println!("{:<16} {:>12}", "Stage", "Mean (ms)");
    println!("{}", "-".repeat(32));

    for stage in &first.stages {
        let stage_durations: Vec<f64> = all_diagnostics
            .iter()
            .filter_map(|d| d.stage_duration(&stage.stage))
            .map(|dur| dur.as_secs_f64() * 1000.0)
            .collect();

        if stage_durations.is_empty() {
            continue;
        }

        let stage_mean = stage_durations.iter().sum::<f64>() / stage_durations.len() as f64;
        println!("{:<16} {stage_mean:>10.3}ms", stage.stage);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config_for(args: &[&str]) -> PipelineConfig {
        let cli = Cli::try_parse_from(["penstroke", "input.png"].iter().chain(args)).unwrap();
        config_from_cli(&cli).unwrap()
    }

    #[test]
    fn flags_override_the_preset() {
        let config = config_for(&[
            "--preset",
            "simple",
            "--detail-area-min",
            "5",
            "--detail-area-max",
            "900",
            "--clahe-grid-size",
            "4",
        ]);
        let simple = Preset::Simple.config();
        assert!((config.detail_area_min - 5.0).abs() < f64::EPSILON);
        assert!((config.detail_area_max - 900.0).abs() < f64::EPSILON);
        assert_eq!(config.clahe_grid_size, 4);
        assert_eq!(config.blur_kernel_size, simple.blur_kernel_size);
    }

    #[test]
    fn config_json_ignores_other_flags() {
        let config = config_for(&[
            "--detail-area-max",
            "900",
            "--config-json",
            r#"{"detail_area_max": 50.0}"#,
        ]);
        assert!((config.detail_area_max - 50.0).abs() < f64::EPSILON);
    }
}
