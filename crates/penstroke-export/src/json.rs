//! JSON export of ordered strokes.
//!
//! The document is what the calibration step needs to map strokes into
//! plotter space: the source dimensions, the strokes in draw order with
//! their lengths, and the total length for progress estimates.

use serde::{Deserialize, Serialize};

use penstroke_pipeline::{Dimensions, PathSet, Point};

/// Errors that can occur while serializing strokes.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// JSON serialization failed.
    #[error("failed to serialize strokes: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serialized form of a [`PathSet`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeDocument {
    /// Source raster dimensions in pixels, when known.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub dimensions: Option<Dimensions>,
    /// Sum of stroke lengths in pixels.
    pub total_length: f64,
    /// Strokes in draw order.
    pub strokes: Vec<StrokeEntry>,
}

/// One pen-down stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeEntry {
    /// Arc length in pixels.
    pub length: f64,
    /// Vertices in drawing direction.
    pub points: Vec<Point>,
}

impl StrokeDocument {
    /// Build the document for `paths`.
    #[must_use]
    pub fn new(paths: &PathSet, dimensions: Option<Dimensions>) -> Self {
        Self {
            dimensions,
            total_length: paths.total_length(),
            strokes: paths
                .iter()
                .map(|path| StrokeEntry {
                    length: path.length(),
                    points: path.polyline().points().to_vec(),
                })
                .collect(),
        }
    }
}

/// Serialize ordered strokes as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`ExportError::Json`] if serialization fails.
pub fn to_json(paths: &PathSet) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(&StrokeDocument::new(paths, None))?)
}

/// Like [`to_json`], recording the source dimensions as well.
///
/// # Errors
///
/// Returns [`ExportError::Json`] if serialization fails.
pub fn to_json_with_dimensions(
    paths: &PathSet,
    dimensions: Dimensions,
) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(&StrokeDocument::new(
        paths,
        Some(dimensions),
    ))?)
}
