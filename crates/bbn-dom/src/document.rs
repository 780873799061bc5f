//! Document
//!
//! The tree plus the URL it was loaded from and cached ids of the
//! `<html>`, `<head>` and `<body>` elements.

use crate::{DomTree, NodeId};

/// Ids of the structural elements; `NodeId::NONE` when absent
#[derive(Debug, Clone, Copy)]
struct Skeleton {
    html: NodeId,
    head: NodeId,
    body: NodeId,
}

impl Skeleton {
    const MISSING: Skeleton = Skeleton {
        html: NodeId::NONE,
        head: NodeId::NONE,
        body: NodeId::NONE,
    };

    fn locate(tree: &DomTree) -> Self {
        let child = |parent: NodeId, tag: &str| {
            tree.child_ids(parent)
                .find(|&c| tree.tag_name(c) == Some(tag))
                .unwrap_or(NodeId::NONE)
        };
        let html = child(tree.root(), "html");
        if !html.is_valid() {
            return Self::MISSING;
        }
        Self {
            html,
            head: child(html, "head"),
            body: child(html, "body"),
        }
    }
}

#[derive(Debug)]
pub struct Document {
    pub tree: DomTree,
    url: String,
    skeleton: Skeleton,
}

impl Document {
    /// `<html><head></head><body></body></html>` at `url`
    pub fn new(url: &str) -> Self {
        let mut document = Self::empty(url);
        let tree = &mut document.tree;
        let html = tree.create_element("html");
        for (parent, child) in [
            (tree.root(), html),
            (html, tree.create_element("head")),
            (html, tree.create_element("body")),
        ] {
            // Fresh nodes under fresh parents cannot violate hierarchy rules
            let _ = tree.append_child(parent, child);
        }
        document.finalize();
        document
    }

    /// A document holding only the document node
    pub fn empty(url: &str) -> Self {
        Self {
            tree: DomTree::new(),
            url: url.to_string(),
            skeleton: Skeleton::MISSING,
        }
    }

    /// Re-locate the structural elements after building the tree by hand
    pub fn finalize(&mut self) {
        self.skeleton = Skeleton::locate(&self.tree);
        tracing::trace!(
            html = self.skeleton.html.is_valid(),
            body = self.skeleton.body.is_valid(),
            "document finalized"
        );
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Text of the first `<title>` in `<head>`, empty when there is none
    pub fn title(&self) -> String {
        self.tree
            .child_ids(self.skeleton.head)
            .find(|&c| self.tree.tag_name(c) == Some("title"))
            .map(|t| self.tree.text_content(t))
            .unwrap_or_default()
    }

    /// The document node
    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    pub fn document_element(&self) -> NodeId {
        self.skeleton.html
    }

    pub fn head(&self) -> NodeId {
        self.skeleton.head
    }

    pub fn body(&self) -> NodeId {
        self.skeleton.body
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree.element_by_id(self.tree.root(), id)
    }

    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skeleton() {
        let doc = Document::default();
        assert_eq!(doc.tree().tag_name(doc.document_element()), Some("html"));
        assert_eq!(doc.tree().tag_name(doc.body()), Some("body"));
        assert_eq!(doc.tree().parent(doc.head()), Some(doc.document_element()));
        assert_eq!(doc.url(), "about:blank");
    }

    #[test]
    fn test_empty_document_has_no_skeleton() {
        let doc = Document::empty("about:blank");
        assert!(!doc.body().is_valid());
        assert_eq!(doc.title(), "");
    }

    #[test]
    fn test_get_element_by_id() {
        let mut doc = Document::default();
        let body = doc.body();
        let tree = doc.tree_mut();
        let div = tree.create_element("div");
        tree.set_attribute(div, "id", "main").unwrap();
        tree.append_child(body, div).unwrap();

        assert_eq!(doc.get_element_by_id("main"), Some(div));
        assert_eq!(doc.get_element_by_id("other"), None);
    }

    #[test]
    fn test_title() {
        let mut doc = Document::default();
        let head = doc.head();
        let tree = doc.tree_mut();
        let title = tree.create_element("title");
        tree.append_child(head, title).unwrap();
        tree.set_text_content(title, "Hello").unwrap();

        assert_eq!(doc.title(), "Hello");
    }
}
