//! HTML5 Parser implementation
//!
//! Uses html5ever's RcDom and converts the result into our arena tree.

use bbn_dom::{Document, DomResult, DomTree, NodeId};
use html5ever::tendril::TendrilSink;
use html5ever::{LocalName, QualName, ns, parse_document, parse_fragment};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

/// HTML5 parser
#[derive(Debug, Clone, Copy)]
pub struct HtmlParser {
    /// Drop text nodes that only contain whitespace
    skip_whitespace_text: bool,
}

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self {
            skip_whitespace_text: false,
        }
    }

    /// Parser that drops whitespace-only text nodes (compact documents)
    pub fn compact() -> Self {
        Self {
            skip_whitespace_text: true,
        }
    }

    fn parse_rc(html: &str) -> RcDom {
        parse_document(RcDom::default(), Default::default()).one(html)
    }

    /// Parse `html` as the content of a `<context>` element
    fn parse_rc_fragment(html: &str, context: &str) -> RcDom {
        let context = QualName::new(None, ns!(html), LocalName::from(context));
        parse_fragment(RcDom::default(), Default::default(), context, Vec::new(), false).one(html)
    }

    /// Parse HTML string into a Document
    pub fn parse(&self, html: &str) -> Document {
        self.parse_with_url(html, "about:blank")
    }

    /// Parse HTML with a base URL
    pub fn parse_with_url(&self, html: &str, url: &str) -> Document {
        tracing::debug!("Parsing HTML document: {}", url);

        let dom = Self::parse_rc(html);
        let mut document = Document::empty(url);
        let tree = document.tree_mut();
        let root = tree.root();
        for child in dom.document.children.borrow().iter() {
            // A fresh document root accepts every converted node
            if let Err(err) = self.convert_node(child, tree, root) {
                tracing::warn!(%err, "dropping node during document conversion");
            }
        }
        document.finalize();

        tracing::debug!("Parsed {} nodes", document.tree().len());
        document
    }

    /// Parse `html` as the content of `parent` and append the resulting nodes
    ///
    /// Head-only elements (`<style>`, `<link>`, `<script>`, `<meta>`) stay
    /// where they appear in the snippet.
    pub fn parse_fragment_into(&self, tree: &mut DomTree, parent: NodeId, html: &str) -> DomResult<Vec<NodeId>> {
        let context = tree.tag_name(parent).unwrap_or("div").to_string();
        let dom = Self::parse_rc_fragment(html, &context);
        let Some(root) = child_element(&dom.document, "html") else {
            return Ok(Vec::new());
        };

        let mut added = Vec::new();
        for child in root.children.borrow().iter() {
            if let Some(id) = self.convert_node(child, tree, parent)? {
                added.push(id);
            }
        }
        tracing::trace!(nodes = added.len(), %context, "fragment parsed");
        Ok(added)
    }

    /// Parse a snippet and return its first element, detached
    ///
    /// The snippet is parsed under a throwaway `<div>` that is emptied again
    /// before returning, so only the returned element stays reachable.
    pub fn create_detached(&self, tree: &mut DomTree, html: &str) -> DomResult<Option<NodeId>> {
        let scratch = tree.create_element("div");
        let nodes = self.parse_fragment_into(tree, scratch, html)?;
        let first = nodes
            .into_iter()
            .find(|&id| tree.get(id).is_some_and(|n| n.is_element()));
        if let Some(element) = first {
            tree.detach(element);
        }
        tree.remove_children(scratch);
        Ok(first)
    }

    /// Convert an RcDom node (and its subtree) into our tree under `parent`
    fn convert_node(&self, handle: &Handle, tree: &mut DomTree, parent: NodeId) -> DomResult<Option<NodeId>> {
        let id = match &handle.data {
            RcNodeData::Document => {
                for child in handle.children.borrow().iter() {
                    self.convert_node(child, tree, parent)?;
                }
                return Ok(None);
            }
            RcNodeData::Doctype { name, .. } => tree.create_doctype(name),
            RcNodeData::Text { contents } => {
                let text = contents.borrow();
                if self.skip_whitespace_text && text.trim().is_empty() {
                    return Ok(None);
                }
                tree.create_text(&text)
            }
            RcNodeData::Comment { contents } => tree.create_comment(contents),
            RcNodeData::Element { name, attrs, .. } => {
                let id = tree.create_element(&*name.local);
                for attr in attrs.borrow().iter() {
                    tree.set_attribute(id, &attr.name.local, &attr.value)?;
                }
                id
            }
            RcNodeData::ProcessingInstruction { .. } => return Ok(None),
        };

        tree.append_child(parent, id)?;
        for child in handle.children.borrow().iter() {
            self.convert_node(child, tree, id)?;
        }
        Ok(Some(id))
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

fn child_element(parent: &Handle, tag: &str) -> Option<Handle> {
    parent
        .children
        .borrow()
        .iter()
        .find(|c| matches!(&c.data, RcNodeData::Element { name, .. } if &*name.local == tag))
        .cloned()
}
