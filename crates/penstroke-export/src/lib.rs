//! penstroke-export: Pure format serializers (sans-IO)
//!
//! Converts ordered strokes into output formats: an SVG document for
//! viewing and a JSON document for the calibration step.

pub mod json;
pub mod svg;

pub use json::{ExportError, StrokeDocument, StrokeEntry, to_json, to_json_with_dimensions};
pub use svg::{SvgMetadata, build_path_data, to_svg};
