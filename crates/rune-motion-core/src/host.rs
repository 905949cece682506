//! Geometry and style capability consumed by the analyzer and strategies.
//!
//! A host answers three questions about a node: how long its outline is, where
//! its local bounding box sits, and what presentation style applies to it.
//! [`DocumentGeometry`] answers them from the document's own attributes with
//! `kurbo`; [`FixedGeometry`] answers them from explicit tables and is what
//! tests and precomputed-layout hosts use.

use std::collections::{BTreeMap, HashMap};

use ego_tree::NodeId;
use kurbo::{BezPath, Circle, Ellipse, Line, Rect, RoundedRect, Shape};
use serde::{Deserialize, Serialize};

use crate::document::SvgDocument;

/// Accuracy used for arc-length computation of curved outlines.
const LENGTH_ACCURACY: f64 = 1e-3;

/// Properties inherited from ancestors when resolving style.
const INHERITED_PROPERTIES: &[&str] = &[
    "stroke",
    "stroke-width",
    "stroke-opacity",
    "stroke-linecap",
    "stroke-linejoin",
    "stroke-dasharray",
    "fill",
    "fill-opacity",
    "visibility",
    "color",
];

/// Non-inherited presentation properties read from the node itself.
const LOCAL_PROPERTIES: &[&str] = &[
    "opacity",
    "display",
    "stroke-dashoffset",
    "transform-origin",
];

/// Axis-aligned rectangle in a node's local coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Geometric center.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Bounds) -> Bounds {
        Rect::from(*self).union(Rect::from(*other)).into()
    }
}

impl From<Rect> for Bounds {
    fn from(rect: Rect) -> Self {
        Self::new(rect.x0, rect.y0, rect.width(), rect.height())
    }
}

impl From<Bounds> for Rect {
    fn from(b: Bounds) -> Self {
        Rect::new(b.x, b.y, b.x + b.width, b.y + b.height)
    }
}

/// Resolved presentation properties of one node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StyleSnapshot {
    properties: BTreeMap<String, String>,
}

impl StyleSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property, replacing any previous value.
    pub fn set(&mut self, property: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(property.into(), value.into());
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.properties.get(property).map(String::as_str)
    }

    pub fn stroke(&self) -> Option<&str> {
        self.get("stroke")
    }

    pub fn stroke_width(&self) -> Option<&str> {
        self.get("stroke-width")
    }

    /// Whether a stroke would actually be painted.
    pub fn has_visible_stroke(&self) -> bool {
        is_visible_paint(self.stroke()) && !is_zero_width(self.stroke_width())
    }
}

/// True when a paint value names something other than `none`/`transparent`.
pub fn is_visible_paint(value: Option<&str>) -> bool {
    match value.map(str::trim) {
        Some(paint) => {
            !paint.is_empty()
                && !paint.eq_ignore_ascii_case("none")
                && !paint.eq_ignore_ascii_case("transparent")
        }
        None => false,
    }
}

/// True when a width value parses to exactly zero.
pub fn is_zero_width(value: Option<&str>) -> bool {
    value.and_then(parse_number).is_some_and(|width| width == 0.0)
}

/// Parse an SVG number or pixel length.
pub fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    let trimmed = trimmed.strip_suffix("px").unwrap_or(trimmed).trim();
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Geometry/style capability supplied by the host document model.
pub trait GeometryHost {
    /// Total outline length, or `None` when the node has no well-defined one.
    fn total_length(&self, document: &SvgDocument, node: NodeId) -> Option<f64>;

    /// Local bounding box, or `None` when it cannot be determined.
    fn bounding_box(&self, document: &SvgDocument, node: NodeId) -> Option<Bounds>;

    /// Resolved presentation style.
    fn computed_style(&self, document: &SvgDocument, node: NodeId) -> StyleSnapshot;
}

/// Geometry computed from element attributes.
///
/// Transforms are ignored; every answer is in the node's local space.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentGeometry;

impl DocumentGeometry {
    pub fn new() -> Self {
        Self
    }
}

enum Outline {
    Path(BezPath),
    Circle(Circle),
    Ellipse(Ellipse),
    Rect(Rect),
    RoundedRect(RoundedRect),
    Line(Line),
}

impl Outline {
    fn length(&self) -> f64 {
        match self {
            Self::Path(path) => path.perimeter(LENGTH_ACCURACY),
            Self::Circle(circle) => circle.perimeter(LENGTH_ACCURACY),
            Self::Ellipse(ellipse) => ellipse.perimeter(LENGTH_ACCURACY),
            Self::Rect(rect) => rect.perimeter(LENGTH_ACCURACY),
            Self::RoundedRect(rect) => rect.perimeter(LENGTH_ACCURACY),
            Self::Line(line) => line.perimeter(LENGTH_ACCURACY),
        }
    }

    fn bounds(&self) -> Rect {
        match self {
            Self::Path(path) => path.bounding_box(),
            Self::Circle(circle) => circle.bounding_box(),
            Self::Ellipse(ellipse) => ellipse.bounding_box(),
            Self::Rect(rect) => rect.bounding_box(),
            Self::RoundedRect(rect) => rect.bounding_box(),
            Self::Line(line) => line.bounding_box(),
        }
    }
}

fn number_attr(document: &SvgDocument, node: NodeId, name: &str) -> Option<f64> {
    document.attr(node, name).and_then(parse_number)
}

fn coordinate(document: &SvgDocument, node: NodeId, name: &str) -> f64 {
    number_attr(document, node, name).unwrap_or(0.0)
}

fn parse_points(text: &str) -> Vec<(f64, f64)> {
    let numbers: Vec<f64> = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map_while(parse_number)
        .collect();
    numbers.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect()
}

fn polyline(points: &[(f64, f64)], closed: bool) -> Option<BezPath> {
    let (first, rest) = points.split_first()?;
    if rest.is_empty() {
        return None;
    }
    let mut path = BezPath::new();
    path.move_to(*first);
    for point in rest {
        path.line_to(*point);
    }
    if closed {
        path.close_path();
    }
    Some(path)
}

fn outline(document: &SvgDocument, node: NodeId) -> Option<Outline> {
    match document.tag_name(node)? {
        "path" => {
            let path = BezPath::from_svg(document.attr(node, "d")?).ok()?;
            let has_segments = path.segments().next().is_some();
            has_segments.then_some(Outline::Path(path))
        }
        "circle" => {
            let r = number_attr(document, node, "r")?;
            (r >= 0.0).then(|| {
                Outline::Circle(Circle::new(
                    (coordinate(document, node, "cx"), coordinate(document, node, "cy")),
                    r,
                ))
            })
        }
        "ellipse" => {
            let rx = number_attr(document, node, "rx")?;
            let ry = number_attr(document, node, "ry")?;
            (rx >= 0.0 && ry >= 0.0).then(|| {
                Outline::Ellipse(Ellipse::new(
                    (coordinate(document, node, "cx"), coordinate(document, node, "cy")),
                    (rx, ry),
                    0.0,
                ))
            })
        }
        "rect" => {
            let width = number_attr(document, node, "width")?;
            let height = number_attr(document, node, "height")?;
            if width < 0.0 || height < 0.0 {
                return None;
            }
            let rect = Rect::from_origin_size(
                (coordinate(document, node, "x"), coordinate(document, node, "y")),
                (width, height),
            );
            let radius = number_attr(document, node, "rx")
                .or_else(|| number_attr(document, node, "ry"))
                .unwrap_or(0.0)
                .clamp(0.0, width.min(height) / 2.0);
            if radius > 0.0 {
                Some(Outline::RoundedRect(RoundedRect::from_rect(rect, radius)))
            } else {
                Some(Outline::Rect(rect))
            }
        }
        "line" => Some(Outline::Line(Line::new(
            (coordinate(document, node, "x1"), coordinate(document, node, "y1")),
            (coordinate(document, node, "x2"), coordinate(document, node, "y2")),
        ))),
        "polyline" => polyline(&parse_points(document.attr(node, "points")?), false).map(Outline::Path),
        "polygon" => polyline(&parse_points(document.attr(node, "points")?), true).map(Outline::Path),
        _ => None,
    }
}

impl GeometryHost for DocumentGeometry {
    fn total_length(&self, document: &SvgDocument, node: NodeId) -> Option<f64> {
        let length = outline(document, node)?.length();
        if length.is_finite() && length >= 0.0 {
            Some(length)
        } else {
            tracing::trace!(?node, length, "discarding non-finite outline length");
            None
        }
    }

    fn bounding_box(&self, document: &SvgDocument, node: NodeId) -> Option<Bounds> {
        if let Some(shape) = outline(document, node) {
            return Some(shape.bounds().into());
        }
        match document.tag_name(node)? {
            "g" => document
                .children(node)
                .into_iter()
                .filter_map(|child| self.bounding_box(document, child))
                .reduce(|acc, bounds| acc.union(&bounds)),
            "image" | "use" | "svg" | "foreignObject" => {
                let width = number_attr(document, node, "width")?;
                let height = number_attr(document, node, "height")?;
                Some(Bounds::new(
                    coordinate(document, node, "x"),
                    coordinate(document, node, "y"),
                    width,
                    height,
                ))
            }
            _ => None,
        }
    }

    fn computed_style(&self, document: &SvgDocument, node: NodeId) -> StyleSnapshot {
        let mut snapshot = StyleSnapshot::new();
        snapshot.set("stroke", "none");
        snapshot.set("stroke-width", "1");

        let mut apply = |element: NodeId, properties: &[&str], inherited_only: bool| {
            for property in properties {
                if let Some(value) = document.attr(element, property) {
                    snapshot.set(*property, value.trim());
                }
            }
            if let Some(inline) = document.inline_style(element) {
                for (property, value) in inline {
                    if !inherited_only || INHERITED_PROPERTIES.contains(&property.as_str()) {
                        snapshot.set(property.as_str(), value.as_str());
                    }
                }
            }
        };

        for ancestor in document.ancestors(node).into_iter().rev() {
            apply(ancestor, INHERITED_PROPERTIES, true);
        }
        apply(node, INHERITED_PROPERTIES, false);
        apply(node, LOCAL_PROPERTIES, false);
        snapshot
    }
}

/// Host answering from explicit tables keyed by element `id`.
///
/// Style lookups fall back to [`DocumentGeometry`] and then apply the table's
/// entries on top.
#[derive(Debug, Clone, Default)]
pub struct FixedGeometry {
    lengths: HashMap<String, f64>,
    bounds: HashMap<String, Bounds>,
    styles: HashMap<String, BTreeMap<String, String>>,
}

impl FixedGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_length(mut self, id: impl Into<String>, length: f64) -> Self {
        self.lengths.insert(id.into(), length);
        self
    }

    pub fn with_bounds(mut self, id: impl Into<String>, bounds: Bounds) -> Self {
        self.bounds.insert(id.into(), bounds);
        self
    }

    pub fn with_style(
        mut self,
        id: impl Into<String>,
        property: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.styles
            .entry(id.into())
            .or_default()
            .insert(property.into(), value.into());
        self
    }
}

impl GeometryHost for FixedGeometry {
    fn total_length(&self, document: &SvgDocument, node: NodeId) -> Option<f64> {
        self.lengths.get(document.element_id(node)?).copied()
    }

    fn bounding_box(&self, document: &SvgDocument, node: NodeId) -> Option<Bounds> {
        self.bounds.get(document.element_id(node)?).copied()
    }

    fn computed_style(&self, document: &SvgDocument, node: NodeId) -> StyleSnapshot {
        let mut snapshot = DocumentGeometry.computed_style(document, node);
        if let Some(overrides) = document.element_id(node).and_then(|id| self.styles.get(id)) {
            for (property, value) in overrides {
                snapshot.set(property.as_str(), value.as_str());
            }
        }
        snapshot
    }
}
