//! Attribute/Content Adapter
//!
//! Setters apply to every node of the collection and skip the window.
//! Replacing content or removing an element first purges the registrations
//! of every node that leaves the document, so no handler outlives its node.

use crate::{Collection, Native, NativeResult};
use bbn_dom::{EventTarget, NodeId};

impl Native {
    /// Purge registrations of `node`'s descendants, and of `node` itself when asked
    pub(crate) fn purge_subtree(&self, node: NodeId, include_self: bool) {
        let mut nodes = Vec::new();
        if include_self {
            nodes.push(node);
        }
        nodes.extend(self.window().document().tree().descendants(node));
        for id in nodes {
            self.purge(EventTarget::Node(id));
        }
    }

    fn set_inner_html(&self, node: NodeId, html: &str) -> NativeResult<()> {
        self.purge_subtree(node, false);
        let mut document = self.window().document_mut();
        let tree = document.tree_mut();
        tree.remove_children(node);
        bbn_html::parse_fragment_into(tree, node, html)?;
        Ok(())
    }

    fn set_text(&self, node: NodeId, text: &str) -> NativeResult<()> {
        self.purge_subtree(node, false);
        self.window()
            .document_mut()
            .tree_mut()
            .set_text_content(node, text)?;
        Ok(())
    }
}

impl Collection {
    /// Set attributes on every element.
    ///
    /// `html` replaces the inner HTML, `text` the text content (taken
    /// literally) and `class` the whole class list. Other keys are plain
    /// attributes.
    pub fn attr<I, K, V>(&self, attrs: I) -> NativeResult<&Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let attrs: Vec<(K, V)> = attrs.into_iter().collect();
        for node in self.nodes() {
            for (key, value) in &attrs {
                let (key, value) = (key.as_ref(), value.as_ref());
                match key {
                    "html" => self.native().set_inner_html(node, value)?,
                    "text" => self.native().set_text(node, value)?,
                    _ => self
                        .native()
                        .window()
                        .document_mut()
                        .tree_mut()
                        .set_attribute(node, key, value)?,
                }
            }
        }
        Ok(self)
    }

    /// Attribute of the first element
    pub fn attr_value(&self, name: &str) -> Option<String> {
        let node = self.nodes().next()?;
        self.native()
            .window()
            .document()
            .tree()
            .get_attribute(node, name)
            .map(str::to_string)
    }

    /// Replace the inner HTML of every element
    pub fn html(&self, html: &str) -> NativeResult<&Self> {
        self.attr([("html", html)])
    }

    /// Inner HTML of the first element
    pub fn html_content(&self) -> Option<String> {
        let node = self.nodes().next()?;
        Some(self.native().window().document().tree().inner_html(node))
    }

    /// Replace the text content of every element
    pub fn text(&self, text: &str) -> NativeResult<&Self> {
        self.attr([("text", text)])
    }

    /// Text content of the first element
    pub fn text_content(&self) -> Option<String> {
        let node = self.nodes().next()?;
        Some(self.native().window().document().tree().text_content(node))
    }

    /// Detach every element after purging the registrations of the element
    /// and all of its descendants
    pub fn remove(&self) -> &Self {
        for node in self.nodes() {
            self.native().purge_subtree(node, true);
            self.native().window().document_mut().tree_mut().detach(node);
            tracing::debug!(?node, "element removed");
        }
        self
    }
}
