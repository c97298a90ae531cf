//! SVG export serializer.
//!
//! Converts a [`PathSet`] into an SVG string with one `<path>` element
//! per stroke, in draw order, using the [`svg`] crate for document
//! construction, XML escaping, and path data formatting.
//!
//! Coordinates stay in source pixels: the `viewBox` is the raster's
//! pixel grid, so the file overlays the source image exactly. Mapping
//! into plotter space is left to the calibration step downstream.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Description, Element, Path, Title};
use svg::node::{Node, Text, Value};

use penstroke_pipeline::{Dimensions, PathSet, Polyline};

/// Namespace of the `<metadata>` child that carries the pipeline
/// configuration.
pub const PIPELINE_NAMESPACE: &str = "urn:penstroke:pipeline:1";

/// Metadata to embed in the SVG document.
///
/// Every field is optional. Text values are XML-escaped automatically
/// by the `svg` crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, emitted as `<title>`.
    ///
    /// Typically the source image filename without extension.
    pub title: Option<&'a str>,

    /// Document description, emitted as `<desc>`.
    pub description: Option<&'a str>,

    /// Serialized pipeline configuration, emitted inside `<metadata>`
    /// so an exported drawing records the settings that produced it.
    pub config_json: Option<&'a str>,
}

/// Build an SVG path `d` attribute string from a polyline.
///
/// Uses `M` for the first point and `L` for subsequent points.
/// Returns an empty string for polylines with fewer than 2 points.
///
/// # Examples
///
/// ```
/// use penstroke_pipeline::{Point, Polyline};
/// use penstroke_export::build_path_data;
///
/// let polyline = Polyline::new(vec![
///     Point::new(10.0, 20.0),
///     Point::new(30.0, 40.0),
/// ]);
/// assert_eq!(build_path_data(&polyline), "M10,20 L30,40");
/// ```
#[must_use]
pub fn build_path_data(polyline: &Polyline) -> String {
    let points = polyline.points();
    let Some((first, rest)) = points.split_first() else {
        return String::new();
    };
    if rest.is_empty() {
        return String::new();
    }

    let mut data = Data::new().move_to((first.x, first.y));
    for p in rest {
        data = data.line_to((p.x, p.y));
    }
    String::from(Value::from(data))
}

/// Serialize ordered strokes into an SVG document string.
///
/// Each path with 2 or more points becomes a `<path>` element; single
/// points cannot form a visible segment and are skipped. Paths appear
/// in draw order, so document order is pen order.
///
/// # Examples
///
/// ```
/// use penstroke_pipeline::{Dimensions, Path, PathSet, Point, Polyline};
/// use penstroke_export::{SvgMetadata, to_svg};
///
/// let paths = PathSet::new(vec![Path::new(Polyline::new(vec![
///     Point::new(10.0, 15.0),
///     Point::new(12.5, 18.3),
/// ]))]);
/// let dims = Dimensions { width: 800, height: 600 };
/// let metadata = SvgMetadata {
///     title: Some("portrait"),
///     ..SvgMetadata::default()
/// };
/// let svg = to_svg(&paths, dims, &metadata);
/// assert!(svg.contains("<title>portrait</title>"));
/// assert!(svg.contains("M10,15 L12.5,18.3"));
/// ```
#[must_use]
pub fn to_svg(paths: &PathSet, dimensions: Dimensions, metadata: &SvgMetadata<'_>) -> String {
    let Dimensions { width, height } = dimensions;
    let mut doc = Document::new()
        .set("width", width)
        .set("height", height)
        .set("viewBox", (0, 0, width, height));

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }

    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    if let Some(config_json) = metadata.config_json {
        let mut pipeline_el = Element::new("penstroke:pipeline");
        pipeline_el.assign("xmlns:penstroke", PIPELINE_NAMESPACE);
        pipeline_el.append(Text::new(config_json));
        let mut metadata_el = Element::new("metadata");
        metadata_el.append(pipeline_el);
        doc = doc.add(metadata_el);
    }

    for polyline in paths.polylines() {
        let d = build_path_data(polyline);
        if d.is_empty() {
            continue;
        }
        let path = Path::new()
            .set("d", d)
            .set("fill", "none")
            .set("stroke", "black")
            .set("stroke-width", 1)
            .set("stroke-linecap", "round")
            .set("stroke-linejoin", "round");
        doc = doc.add(path);
    }

    // The svg crate omits the XML declaration.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use penstroke_pipeline::{Path as Stroke, Point};

    use super::*;

    fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions { width, height }
    }

    fn no_meta() -> SvgMetadata<'static> {
        SvgMetadata::default()
    }

    fn strokes(polylines: Vec<Polyline>) -> PathSet {
        PathSet::new(polylines.into_iter().map(Stroke::new).collect())
    }

    fn short() -> PathSet {
        strokes(vec![Polyline::new(vec![
            Point::new(1.0, 2.0),
            Point::new(3.0, 4.0),
        ])])
    }

    #[test]
    fn path_data_skips_degenerate_polylines() {
        assert_eq!(build_path_data(&Polyline::new(vec![])), "");
        assert_eq!(build_path_data(&Polyline::new(vec![Point::new(1.0, 1.0)])), "");
    }

    #[test]
    fn path_data_keeps_fractions() {
        let polyline = Polyline::new(vec![
            Point::new(0.5, 1.25),
            Point::new(2.0, 3.0),
            Point::new(4.75, 0.0),
        ]);
        assert_eq!(build_path_data(&polyline), "M0.5,1.25 L2,3 L4.75,0");
    }

    #[test]
    fn one_path_element_per_stroke_in_draw_order() {
        let set = strokes(vec![
            Polyline::new(vec![Point::new(5.0, 6.0), Point::new(7.0, 8.0)]),
            Polyline::new(vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)]),
        ]);
        let svg = to_svg(&set, dims(100, 100), &no_meta());

        assert_eq!(svg.matches("<path").count(), 2);
        let first = svg.find(r#"d="M5,6 L7,8""#).unwrap();
        let second = svg.find(r#"d="M1,2 L3,4""#).unwrap();
        assert!(first < second);
    }

    #[test]
    fn empty_path_set_has_no_paths() {
        let svg = to_svg(&PathSet::default(), dims(10, 10), &no_meta());
        assert!(!svg.contains("<path"));
    }

    #[test]
    fn viewbox_reflects_dimensions() {
        let svg = to_svg(&PathSet::default(), dims(1920, 1080), &no_meta());
        assert!(svg.contains(r#"width="1920""#));
        assert!(svg.contains(r#"height="1080""#));
        assert!(svg.contains(r#"viewBox="0 0 1920 1080""#));
    }

    #[test]
    fn document_structure() {
        let svg = to_svg(&short(), dims(100, 100), &no_meta());
        assert!(svg.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(svg.contains(r#"xmlns="http://www.w3.org/2000/svg""#));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains(r#"fill="none""#));
    }

    #[test]
    fn title_and_desc_emitted_before_paths() {
        let meta = SvgMetadata {
            title: Some("test"),
            description: Some("desc"),
            ..SvgMetadata::default()
        };
        let svg = to_svg(&short(), dims(100, 100), &meta);

        let title_pos = svg.find("<title>test</title>").unwrap();
        let desc_pos = svg.find("<desc>desc</desc>").unwrap();
        let path_pos = svg.find("<path").unwrap();
        assert!(title_pos < desc_pos);
        assert!(desc_pos < path_pos);
    }

    #[test]
    fn title_and_desc_omitted_when_none() {
        let svg = to_svg(&short(), dims(100, 100), &no_meta());
        assert!(!svg.contains("<title>"));
        assert!(!svg.contains("<desc>"));
        assert!(!svg.contains("<metadata>"));
    }

    #[test]
    fn special_characters_are_escaped() {
        let meta = SvgMetadata {
            title: Some("A <B> & C"),
            config_json: Some(r#"{"note":"a < b"}"#),
            ..SvgMetadata::default()
        };
        let svg = to_svg(&PathSet::default(), dims(100, 100), &meta);
        assert!(svg.contains("<title>A &lt;B&gt; &amp; C</title>"));
        assert!(svg.contains("a &lt; b"));
    }

    #[test]
    fn config_json_lands_in_namespaced_metadata() {
        let meta = SvgMetadata {
            description: Some("desc"),
            config_json: Some(r#"{"blur_kernel_size":3}"#),
            ..SvgMetadata::default()
        };
        let svg = to_svg(&short(), dims(100, 100), &meta);
        assert!(svg.contains(&format!(
            r#"<penstroke:pipeline xmlns:penstroke="{PIPELINE_NAMESPACE}">"#
        )));

        let desc_pos = svg.find("<desc>").unwrap();
        let metadata_pos = svg.find("<metadata>").unwrap();
        let path_pos = svg.find("<path").unwrap();
        assert!(desc_pos < metadata_pos);
        assert!(metadata_pos < path_pos);
    }
}
