//! Structural analysis of a drawable tree.
//!
//! [`analyze`] walks the children of a root element depth-first in document
//! order and produces a forest of [`AnnotatedNode`]s:
//!
//! - groups (`<g>`) become nodes with a nested `children` list;
//! - other recognised shapes become leaves and are not descended into;
//! - unrecognised elements (including nested `<svg>` and anything outside the
//!   SVG namespace) are transparent: they are not emitted, but their
//!   descendants are visited in their place.
//!
//! Sequence indices count emitted nodes in pre-order, so position `i` of
//! [`flatten`]'s output carries index `i`.

use std::collections::{BTreeMap, HashSet};

use ego_tree::NodeId;
use serde::{Deserialize, Serialize};

use crate::document::SvgDocument;
use crate::host::{Bounds, GeometryHost};

/// Tolerance band (in local units) inside which two nodes share a visual row.
pub const ROW_TOLERANCE: f64 = 10.0;

/// Closed classification of a drawable node.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Path,
    Circle,
    Ellipse,
    Rect,
    Line,
    Polyline,
    Polygon,
    Text,
    Tspan,
    Group,
    Use,
    Image,
    Unknown,
}

impl ShapeKind {
    /// Classify an SVG tag name.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "path" => Self::Path,
            "circle" => Self::Circle,
            "ellipse" => Self::Ellipse,
            "rect" => Self::Rect,
            "line" => Self::Line,
            "polyline" => Self::Polyline,
            "polygon" => Self::Polygon,
            "text" => Self::Text,
            "tspan" => Self::Tspan,
            "g" => Self::Group,
            "use" => Self::Use,
            "image" => Self::Image,
            _ => Self::Unknown,
        }
    }

    /// Shapes with a well-defined outline length.
    pub fn has_outline(&self) -> bool {
        matches!(
            self,
            Self::Path
                | Self::Circle
                | Self::Ellipse
                | Self::Rect
                | Self::Line
                | Self::Polyline
                | Self::Polygon
        )
    }

    /// Open or closed strokes that can be traced by a draw animation.
    pub fn is_path_like(&self) -> bool {
        matches!(self, Self::Path | Self::Line | Self::Polyline | Self::Polygon)
    }
}

/// A drawable node with the geometry facts the strategies need.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedNode {
    /// The element in the analyzed document.
    pub node: NodeId,
    pub kind: ShapeKind,
    /// Identifier unique within one analysis pass.
    pub id: String,
    /// Pre-order position among emitted nodes.
    pub index: usize,
    pub path_length: Option<f64>,
    pub bounds: Option<Bounds>,
    /// Nested nodes; only groups have any.
    pub children: Vec<AnnotatedNode>,
}

/// Analyze the drawable tree below `root`.
///
/// When `root` is itself a shape (anything but a group or an unrecognised
/// element) the forest is that single node.
pub fn analyze(
    document: &SvgDocument,
    root: NodeId,
    host: &dyn GeometryHost,
) -> Vec<AnnotatedNode> {
    let mut analyzer = Analyzer {
        document,
        host,
        next_index: 0,
        used_ids: HashSet::new(),
    };

    let mut forest = Vec::new();
    match classify(document, root) {
        ShapeKind::Group | ShapeKind::Unknown => analyzer.visit_children(root, &mut forest),
        _ => analyzer.visit(root, &mut forest),
    }

    tracing::debug!(
        roots = forest.len(),
        nodes = analyzer.next_index,
        "analyzed drawable tree"
    );
    forest
}

fn classify(document: &SvgDocument, node: NodeId) -> ShapeKind {
    if !document.is_svg_element(node) {
        return ShapeKind::Unknown;
    }
    document
        .tag_name(node)
        .map(ShapeKind::from_tag)
        .unwrap_or(ShapeKind::Unknown)
}

struct Analyzer<'a> {
    document: &'a SvgDocument,
    host: &'a dyn GeometryHost,
    next_index: usize,
    used_ids: HashSet<String>,
}

impl Analyzer<'_> {
    fn visit_children(&mut self, parent: NodeId, out: &mut Vec<AnnotatedNode>) {
        for child in self.document.children(parent) {
            self.visit(child, out);
        }
    }

    fn visit(&mut self, node: NodeId, out: &mut Vec<AnnotatedNode>) {
        let kind = classify(self.document, node);
        if kind == ShapeKind::Unknown {
            self.visit_children(node, out);
            return;
        }

        let index = self.next_index;
        self.next_index += 1;
        let id = self.stable_id(node, index);

        let path_length = if kind.has_outline() {
            let length = self.host.total_length(self.document, node);
            if length.is_none() {
                tracing::trace!(%id, ?kind, "no outline length");
            }
            length.filter(|length| length.is_finite() && *length >= 0.0)
        } else {
            None
        };
        let bounds = self.host.bounding_box(self.document, node);

        let mut children = Vec::new();
        if kind == ShapeKind::Group {
            self.visit_children(node, &mut children);
        }

        out.push(AnnotatedNode {
            node,
            kind,
            id,
            index,
            path_length,
            bounds,
            children,
        });
    }

    fn stable_id(&mut self, node: NodeId, index: usize) -> String {
        if let Some(existing) = self.document.element_id(node) {
            if self.used_ids.insert(existing.to_string()) {
                return existing.to_string();
            }
            tracing::debug!(id = existing, "duplicate element id, generating one");
        }

        let base = format!("anim-{index}");
        let mut candidate = base.clone();
        let mut suffix = 1;
        while !self.used_ids.insert(candidate.clone()) {
            candidate = format!("{base}-{suffix}");
            suffix += 1;
        }
        candidate
    }
}

/// All nodes of a forest in pre-order, with nesting removed.
pub fn flatten(forest: &[AnnotatedNode]) -> Vec<AnnotatedNode> {
    fn walk(nodes: &[AnnotatedNode], out: &mut Vec<AnnotatedNode>) {
        for node in nodes {
            out.push(AnnotatedNode {
                children: Vec::new(),
                ..node.clone()
            });
            walk(&node.children, out);
        }
    }

    let mut out = Vec::new();
    walk(forest, &mut out);
    out
}

/// Order nodes top-to-bottom, then left-to-right.
///
/// Nodes whose top edges lie within [`ROW_TOLERANCE`] of the first node of a
/// row share that row and are ordered by x. Missing bounds count as the
/// origin. The sort is stable.
pub fn sort_by_visual_position(nodes: &[AnnotatedNode]) -> Vec<AnnotatedNode> {
    fn origin(node: &AnnotatedNode) -> (f64, f64) {
        node.bounds.map(|b| (b.x, b.y)).unwrap_or((0.0, 0.0))
    }

    let mut by_y = nodes.to_vec();
    by_y.sort_by(|a, b| origin(a).1.total_cmp(&origin(b).1));

    let mut rows: Vec<Vec<AnnotatedNode>> = Vec::new();
    for node in by_y {
        let y = origin(&node).1;
        match rows.last_mut() {
            Some(row) if (y - origin(&row[0]).1).abs() <= ROW_TOLERANCE => row.push(node),
            _ => rows.push(vec![node]),
        }
    }

    rows.into_iter()
        .flat_map(|mut row| {
            row.sort_by(|a, b| origin(a).0.total_cmp(&origin(b).0));
            row
        })
        .collect()
}

/// Partition nodes by shape kind, keeping their relative order.
pub fn group_by_shape_kind(nodes: &[AnnotatedNode]) -> BTreeMap<ShapeKind, Vec<AnnotatedNode>> {
    let mut groups: BTreeMap<ShapeKind, Vec<AnnotatedNode>> = BTreeMap::new();
    for node in nodes {
        groups.entry(node.kind).or_default().push(node.clone());
    }
    groups
}

static_assertions::assert_impl_all!(AnnotatedNode: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{DocumentGeometry, FixedGeometry};

    const MARKUP: &str = r#"<svg viewBox="0 0 200 200">
        <path id="outline" d="M0 0 L100 0" stroke="black"/>
        <g id="cluster">
            <circle cx="10" cy="10" r="5"/>
            <rect id="box" x="0" y="0" width="10" height="10"/>
        </g>
        <defs>
            <ellipse cx="1" cy="1" rx="1" ry="1"/>
        </defs>
        <text x="0" y="50">Label<tspan>inner</tspan></text>
    </svg>"#;

    fn analyze_markup(markup: &str) -> (SvgDocument, Vec<AnnotatedNode>) {
        let document = SvgDocument::parse(markup).unwrap();
        let forest = analyze(&document, document.root(), &DocumentGeometry::new());
        (document, forest)
    }

    #[test]
    fn test_forest_structure() {
        let (_, forest) = analyze_markup(MARKUP);

        let kinds: Vec<ShapeKind> = forest.iter().map(|n| n.kind).collect();
        // <defs> is transparent, so its ellipse is lifted into the root list.
        assert_eq!(
            kinds,
            vec![ShapeKind::Path, ShapeKind::Group, ShapeKind::Ellipse, ShapeKind::Text]
        );

        let group = &forest[1];
        assert_eq!(group.id, "cluster");
        assert_eq!(group.children.len(), 2);
        assert_eq!(group.children[0].kind, ShapeKind::Circle);
        assert_eq!(group.children[1].id, "box");

        // Text is a leaf; its tspan is not emitted.
        assert!(forest[3].children.is_empty());
    }

    #[test]
    fn test_indices_follow_preorder() {
        let (_, forest) = analyze_markup(MARKUP);
        let flat = flatten(&forest);

        let indices: Vec<usize> = flat.iter().map(|n| n.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);

        let ids: Vec<&str> = flat.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["outline", "cluster", "anim-2", "box", "anim-4", "anim-5"]);
        assert!(flat.iter().all(|n| n.children.is_empty()));
    }

    #[test]
    fn test_stable_ids_unique() {
        let (_, forest) = analyze_markup(
            r#"<svg>
                <rect id="dup" width="1" height="1"/>
                <rect id="dup" width="1" height="1"/>
                <rect width="1" height="1"/>
                <rect id="anim-2" width="1" height="1"/>
            </svg>"#,
        );
        let ids: Vec<String> = flatten(&forest).into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec!["dup", "anim-1", "anim-2", "anim-3"]);

        let unique: HashSet<&String> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn test_generated_id_collision_gets_suffix() {
        let (_, forest) = analyze_markup(
            r#"<svg>
                <rect id="anim-1" width="1" height="1"/>
                <rect width="1" height="1"/>
            </svg>"#,
        );
        let ids: Vec<String> = flatten(&forest).into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec!["anim-1", "anim-1-1"]);
    }

    #[test]
    fn test_geometry_facts() {
        let (_, forest) = analyze_markup(MARKUP);
        let path = &forest[0];
        assert_eq!(path.path_length.map(f64::round), Some(100.0));
        assert_eq!(path.bounds, Some(Bounds::new(0.0, 0.0, 100.0, 0.0)));

        // Groups and text have no outline length.
        assert_eq!(forest[1].path_length, None);
        assert_eq!(forest[3].path_length, None);
        assert!(forest[1].bounds.is_some());
    }

    #[test]
    fn test_degenerate_path_has_no_length() {
        let (_, forest) = analyze_markup(r#"<svg><path d=""/><path/></svg>"#);
        assert_eq!(forest.len(), 2);
        assert!(forest.iter().all(|n| n.path_length.is_none()));
    }

    #[test]
    fn test_fixed_geometry_host() {
        let document = SvgDocument::parse(r#"<svg><path id="p" d="M0 0"/><rect/></svg>"#).unwrap();
        let host = FixedGeometry::new()
            .with_length("p", 500.0)
            .with_bounds("p", Bounds::new(1.0, 2.0, 3.0, 4.0));
        let forest = analyze(&document, document.root(), &host);
        assert_eq!(forest[0].path_length, Some(500.0));
        assert_eq!(forest[0].bounds, Some(Bounds::new(1.0, 2.0, 3.0, 4.0)));
        assert_eq!(forest[1].path_length, None);
        assert_eq!(forest[1].bounds, None);
    }

    #[test]
    fn test_foreign_elements_are_transparent() {
        let document = SvgDocument::parse(
            r#"<svg><foreignObject><div><span></span></div></foreignObject><circle r="1"/></svg>"#,
        )
        .unwrap();
        let forest = analyze(&document, document.root(), &DocumentGeometry::new());
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].kind, ShapeKind::Circle);
        assert_eq!(forest[0].index, 0);
    }

    #[test]
    fn test_shape_root_is_single_node() {
        let document = SvgDocument::parse(r#"<svg><rect id="only" width="2" height="2"/></svg>"#).unwrap();
        let rect = document.select("#only").unwrap().unwrap();
        let forest = analyze(&document, rect, &DocumentGeometry::new());
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].id, "only");
    }

    fn positioned(id: &str, x: f64, y: f64) -> AnnotatedNode {
        let document = SvgDocument::parse("<svg/>").unwrap();
        AnnotatedNode {
            node: document.root(),
            kind: ShapeKind::Rect,
            id: id.to_string(),
            index: 0,
            path_length: None,
            bounds: Some(Bounds::new(x, y, 1.0, 1.0)),
            children: Vec::new(),
        }
    }

    #[test]
    fn test_sort_by_visual_position() {
        let nodes = vec![
            positioned("bottom", 0.0, 100.0),
            positioned("top-right", 50.0, 4.0),
            positioned("top-left", 10.0, 0.0),
            positioned("top-mid", 30.0, 9.0),
            positioned("middle", 5.0, 40.0),
        ];
        let sorted: Vec<String> = sort_by_visual_position(&nodes)
            .into_iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(sorted, vec!["top-left", "top-mid", "top-right", "middle", "bottom"]);
    }

    #[test]
    fn test_sort_missing_bounds_at_origin() {
        let mut unbounded = positioned("unbounded", 0.0, 0.0);
        unbounded.bounds = None;
        let nodes = vec![positioned("far", 5.0, 50.0), unbounded];
        let sorted: Vec<String> = sort_by_visual_position(&nodes)
            .into_iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(sorted, vec!["unbounded", "far"]);
    }

    #[test]
    fn test_group_by_shape_kind() {
        let (_, forest) = analyze_markup(MARKUP);
        let groups = group_by_shape_kind(&flatten(&forest));
        assert_eq!(groups[&ShapeKind::Path].len(), 1);
        assert_eq!(groups[&ShapeKind::Group][0].id, "cluster");
        assert_eq!(groups[&ShapeKind::Rect][0].id, "box");
        assert!(!groups.contains_key(&ShapeKind::Unknown));
    }
}
