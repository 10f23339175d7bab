// ABOUTME: Page and Element: the mutable, query-able document the obtainer engine runs against.
// ABOUTME: Wraps dom_query::Document with a focus pointer, cached selectors, XPath queries and removal.

use std::cell::Cell;
use std::fmt;

use dom_query::{Document, NodeId, NodeRef, Selection};

use crate::dom::{compiled, xpath};
use crate::error::Result;
use crate::options::ObtainOptions;
use crate::text::encoding;

/// Stable handle of an element within its Page.
pub type ElementId = NodeId;

/// A parsed page shared by every job run against it.
///
/// Queries take `&self`; removal takes `&mut self`, so a rule (which only
/// ever sees `&Page`) cannot mutate the document while it is still
/// evaluating a candidate.
pub struct Page {
    doc: Document,
    focus: Cell<Option<NodeId>>,
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("focus", &self.focus.get())
            .finish_non_exhaustive()
    }
}

impl Page {
    /// Parses an HTML document.
    pub fn parse(html: &str) -> Self {
        Self {
            doc: Document::from(html),
            focus: Cell::new(None),
        }
    }

    /// Parses raw page bytes, repairing the encoding when they are not UTF-8.
    pub fn from_bytes(bytes: &[u8], opts: &ObtainOptions) -> Self {
        let text = encoding::to_utf8(bytes, &opts.encodings);
        Self::parse(&text)
    }

    /// Clears any focus so the next query starts from the document root.
    pub fn reset_to_root(&self) {
        self.focus.set(None);
    }

    /// Narrows subsequent queries to the subtree below `element`.
    pub fn focus(&self, element: &Element<'_>) {
        self.focus.set(Some(element.id()));
    }

    /// True when queries are currently narrowed to a subtree.
    pub fn is_focused(&self) -> bool {
        self.focus.get().is_some()
    }

    fn focus_node(&self) -> Option<NodeRef<'_>> {
        self.focus.get().and_then(|id| self.doc.tree.get(&id))
    }

    /// All elements matching `css`, in document order.
    pub fn query_all(&self, css: &str) -> Result<Vec<Element<'_>>> {
        let matcher = compiled::matcher(css)?;
        let selection = match self.focus_node() {
            Some(node) => Selection::from(node).select_matcher(&matcher),
            None => self.doc.select_matcher(&matcher),
        };
        Ok(selection.nodes().iter().cloned().map(Element::new).collect())
    }

    /// The first element matching `css`, if any.
    pub fn query_first(&self, css: &str) -> Result<Option<Element<'_>>> {
        Ok(self.query_all(css)?.into_iter().next())
    }

    /// All elements matching an XPath expression (supported subset only).
    pub fn query_xpath(&self, expr: &str) -> Result<Vec<Element<'_>>> {
        let css = xpath::to_css(expr)?;
        self.query_all(&css)
    }

    /// Resolves an element handle, if it is still attached.
    pub fn element(&self, id: ElementId) -> Option<Element<'_>> {
        self.doc.tree.get(&id).map(Element::new)
    }

    /// Detaches the given elements from the document.
    ///
    /// Handles whose ancestor was already removed are harmless no-ops.
    pub fn remove(&mut self, ids: &[ElementId]) {
        for id in ids {
            if let Some(node) = self.doc.tree.get(id) {
                node.remove_from_parent();
            }
        }
        self.focus.set(None);
    }

    /// Serializes the current state of the document.
    pub fn html(&self) -> String {
        self.doc.html().to_string()
    }
}

/// Opaque handle into a Page.
#[derive(Clone)]
pub struct Element<'a> {
    node: NodeRef<'a>,
}

impl fmt::Debug for Element<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("id", &self.node.id)
            .field("tag", &self.tag())
            .finish()
    }
}

impl<'a> Element<'a> {
    fn new(node: NodeRef<'a>) -> Self {
        Self { node }
    }

    pub fn id(&self) -> ElementId {
        self.node.id
    }

    /// Lower-cased tag name; empty for non-element nodes.
    pub fn tag(&self) -> String {
        self.node
            .node_name()
            .map(|n| n.to_lowercase())
            .unwrap_or_default()
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text(&self) -> String {
        self.node.text().to_string()
    }

    /// Outer markup.
    pub fn html(&self) -> String {
        self.node.html().to_string()
    }

    pub fn inner_html(&self) -> String {
        self.node.inner_html().to_string()
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        self.node.attr(name).map(|v| v.to_string())
    }

    /// Child elements (text and comment nodes skipped).
    pub fn children(&self) -> Vec<Element<'a>> {
        self.node
            .element_children()
            .into_iter()
            .map(Element::new)
            .collect()
    }

    pub fn parent(&self) -> Option<Element<'a>> {
        self.node
            .parent()
            .filter(|p| p.is_element())
            .map(Element::new)
    }

    /// Following sibling elements, nearest first.
    pub fn next_siblings(&self) -> Vec<Element<'a>> {
        let mut out = Vec::new();
        let mut cur = self.node.next_element_sibling();
        while let Some(node) = cur {
            cur = node.next_element_sibling();
            out.push(Element::new(node));
        }
        out
    }

    /// Descendants of this element matching `css`.
    pub fn query_all(&self, css: &str) -> Result<Vec<Element<'a>>> {
        let matcher = compiled::matcher(css)?;
        let selection = Selection::from(self.node.clone()).select_matcher(&matcher);
        Ok(selection.nodes().iter().cloned().map(Element::new).collect())
    }

    /// True if `other` is this element or one of its descendants.
    pub fn contains(&self, other: &Element<'_>) -> bool {
        let mut cur = Some(other.node.clone());
        while let Some(node) = cur {
            if node.id == self.node.id {
                return true;
            }
            cur = node.parent();
        }
        false
    }
}
