//! In-memory SVG document.
//!
//! Markup is parsed with `scraper` (html5ever in fragment mode). SVG elements
//! are foreign content to the HTML tree builder, so their tag and attribute
//! names keep SVG casing. Nodes are addressed by `ego_tree::NodeId`; the
//! document owns the nodes and everything else borrows them by id.
//!
//! The document carries an inline style layer on top of the parsed tree. Each
//! element's `style` attribute is parsed once at load time, and animation
//! strategies read and write that layer through [`SvgDocument::style`] and
//! [`SvgDocument::set_style`].

use std::collections::{BTreeMap, HashMap};

use ego_tree::NodeId;
use scraper::node::Element;
use scraper::{Html, Selector};

use crate::error::{MotionError, Result};

/// XML namespace of SVG elements.
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Parsed SVG markup plus its mutable inline style layer.
#[derive(Debug)]
pub struct SvgDocument {
    html: Html,
    root: NodeId,
    inline_styles: HashMap<NodeId, BTreeMap<String, String>>,
}

impl SvgDocument {
    /// Parse markup into a document.
    ///
    /// The first `<svg>` element becomes the document root. Markup without one
    /// is rejected.
    pub fn parse(markup: &str) -> Result<Self> {
        let html = Html::parse_fragment(markup);
        for error in &html.errors {
            tracing::debug!(%error, "svg markup diagnostic");
        }

        let svg = Selector::parse("svg")
            .map_err(|_| MotionError::InvalidSelector("svg".to_string()))?;
        let root = html
            .select(&svg)
            .next()
            .map(|element| (*element).id())
            .ok_or_else(|| MotionError::InvalidMarkup("no <svg> element found".to_string()))?;

        let mut inline_styles = HashMap::new();
        for node in html.tree.nodes() {
            let Some(element) = node.value().as_element() else {
                continue;
            };
            if let Some(style) = element.attr("style") {
                let parsed = parse_inline_style(style);
                if !parsed.is_empty() {
                    inline_styles.insert(node.id(), parsed);
                }
            }
        }

        tracing::debug!(styled = inline_styles.len(), "parsed svg document");
        Ok(Self {
            html,
            root,
            inline_styles,
        })
    }

    /// The outermost `<svg>` element.
    pub fn root(&self) -> NodeId {
        self.root
    }

    fn element(&self, node: NodeId) -> Option<&Element> {
        self.html.tree.get(node)?.value().as_element()
    }

    /// Local tag name of an element node.
    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|element| element.name())
    }

    /// Raw attribute value.
    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?.attr(name)
    }

    /// The element's `id` attribute, if present and non-empty.
    pub fn element_id(&self, node: NodeId) -> Option<&str> {
        self.attr(node, "id").map(str::trim).filter(|id| !id.is_empty())
    }

    /// Whether the node is an element in the SVG namespace.
    pub fn is_svg_element(&self, node: NodeId) -> bool {
        self.element(node)
            .is_some_and(|element| &*element.name.ns == SVG_NAMESPACE)
    }

    /// Element children in document order. Text and comment nodes are skipped.
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.html
            .tree
            .get(node)
            .map(|parent| {
                parent
                    .children()
                    .filter(|child| child.value().is_element())
                    .map(|child| child.id())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Element ancestors, nearest first.
    pub fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        self.html
            .tree
            .get(node)
            .map(|current| {
                current
                    .ancestors()
                    .filter(|ancestor| ancestor.value().is_element())
                    .map(|ancestor| ancestor.id())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Resolve a CSS selector to the first matching element.
    pub fn select(&self, selector: &str) -> Result<Option<NodeId>> {
        let parsed = Selector::parse(selector)
            .map_err(|_| MotionError::InvalidSelector(selector.to_string()))?;
        Ok(self.html.select(&parsed).next().map(|element| (*element).id()))
    }

    /// Current inline style value of a property.
    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.inline_styles
            .get(&node)?
            .get(property)
            .map(String::as_str)
    }

    /// Full inline style map of a node.
    pub fn inline_style(&self, node: NodeId) -> Option<&BTreeMap<String, String>> {
        self.inline_styles.get(&node)
    }

    /// Write (or with `None`, remove) an inline style property.
    ///
    /// Returns the previous value.
    pub fn set_style(
        &mut self,
        node: NodeId,
        property: &str,
        value: Option<String>,
    ) -> Option<String> {
        let styles = self.inline_styles.entry(node).or_default();
        let previous = match value {
            Some(value) => styles.insert(property.to_string(), value),
            None => styles.remove(property),
        };
        if styles.is_empty() {
            self.inline_styles.remove(&node);
        }
        previous
    }

    /// Serialize a node's inline style layer back into `style` attribute form.
    pub fn style_attribute(&self, node: NodeId) -> String {
        self.inline_styles
            .get(&node)
            .map(|styles| {
                styles
                    .iter()
                    .map(|(name, value)| format!("{name}: {value}"))
                    .collect::<Vec<_>>()
                    .join("; ")
            })
            .unwrap_or_default()
    }
}

fn parse_inline_style(text: &str) -> BTreeMap<String, String> {
    text.split(';')
        .filter_map(|declaration| {
            let (name, value) = declaration.split_once(':')?;
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim();
            (!name.is_empty() && !value.is_empty()).then(|| (name, value.to_string()))
        })
        .collect()
}

/// A set of inline style properties temporarily overridden on one node.
///
/// `apply` captures the prior value of every property it writes; `restore`
/// puts them back, removing properties that did not exist before.
#[must_use = "a style override must be restored to undo its mutation"]
#[derive(Debug, Clone, PartialEq)]
pub struct StyleOverride {
    node: NodeId,
    saved: Vec<(String, Option<String>)>,
}

impl StyleOverride {
    /// Write `properties` onto `node`, remembering what they replaced.
    pub fn apply(document: &mut SvgDocument, node: NodeId, properties: &[(&str, String)]) -> Self {
        let saved = properties
            .iter()
            .map(|(property, value)| {
                let previous = document.set_style(node, property, Some(value.clone()));
                (property.to_string(), previous)
            })
            .collect();
        Self { node, saved }
    }

    /// Node the override was applied to.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Names of the overridden properties, in application order.
    pub fn properties(&self) -> impl Iterator<Item = &str> {
        self.saved.iter().map(|(property, _)| property.as_str())
    }

    /// Undo the override.
    pub fn restore(self, document: &mut SvgDocument) {
        for (property, previous) in self.saved.into_iter().rev() {
            document.set_style(self.node, &property, previous);
        }
    }
}
