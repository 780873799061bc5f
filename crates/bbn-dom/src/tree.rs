//! DOM Tree (arena-based allocation)
//!
//! Nodes are never freed: a detached subtree keeps its ids and can be
//! re-attached later, which is what `remove()` followed by `appendChild`
//! relies on. The arena therefore only grows: content replaced through
//! `html()`, removed elements and the scratch parents used for snippet
//! parsing all stay allocated until the whole tree is dropped.

use crate::{DomError, DomResult, Links, Node, NodeData, NodeId};

/// Arena-based DOM tree
#[derive(Debug)]
pub struct DomTree {
    pub(crate) nodes: Vec<Node>,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeData::Document)],
        }
    }

    /// The document node
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Number of nodes in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(Node::element(tag))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(Node::text(text))
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(Node::new(NodeData::Comment(text.to_string())))
    }

    /// Create a detached doctype node
    pub fn create_doctype(&mut self, name: &str) -> NodeId {
        self.push(Node::new(NodeData::Doctype { name: name.to_string() }))
    }

    /// Append `child` as the last child of `parent`, moving it if attached
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        if self.get(parent).is_none() || self.get(child).is_none() {
            return Err(DomError::NotFound);
        }
        if child == parent || self.is_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest);
        }
        if matches!(self.nodes[child.index()].data, NodeData::Document) {
            return Err(DomError::InvalidNodeType);
        }
        self.detach(child);

        let last = self.nodes[parent.index()].links.last_child;
        {
            let node = &mut self.nodes[child.index()];
            node.links.parent = parent;
            node.links.prev_sibling = last;
            node.links.next_sibling = NodeId::NONE;
        }
        if last.is_valid() {
            self.nodes[last.index()].links.next_sibling = child;
        } else {
            self.nodes[parent.index()].links.first_child = child;
        }
        self.nodes[parent.index()].links.last_child = child;
        Ok(child)
    }

    /// Remove `child` from `parent`
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        if self.parent(child) != Some(parent) {
            return Err(DomError::NotAChild);
        }
        self.detach(child);
        Ok(child)
    }

    /// Unlink a node from its parent; no-op when already detached
    pub fn detach(&mut self, id: NodeId) {
        let Some(node) = self.get(id) else { return };
        let Links { parent, prev_sibling: prev, next_sibling: next, .. } = node.links;
        if !parent.is_valid() {
            return;
        }

        if prev.is_valid() {
            self.nodes[prev.index()].links.next_sibling = next;
        } else {
            self.nodes[parent.index()].links.first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].links.prev_sibling = prev;
        } else {
            self.nodes[parent.index()].links.last_child = prev;
        }

        let node = &mut self.nodes[id.index()];
        node.links.parent = NodeId::NONE;
        node.links.prev_sibling = NodeId::NONE;
        node.links.next_sibling = NodeId::NONE;
    }

    /// Detach every child of `id`, returning them in order
    pub fn remove_children(&mut self, id: NodeId) -> Vec<NodeId> {
        let children: Vec<NodeId> = self.child_ids(id).collect();
        for &child in &children {
            self.detach(child);
        }
        children
    }

    /// Parent of a node, if attached
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.links.parent.to_option())
    }

    /// Iterate over the children of a node
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = (NodeId, &Node)> {
        self.child_ids(id).map(move |child| (child, &self.nodes[child.index()]))
    }

    /// Iterate over the child ids of a node
    pub fn child_ids(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let first = self.get(id).map_or(NodeId::NONE, |n| n.links.first_child);
        std::iter::successors(first.to_option(), move |cur| {
            self.nodes[cur.index()].links.next_sibling.to_option()
        })
    }

    /// Ancestors of a node, nearest first (the node itself excluded)
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&cur| self.parent(cur))
    }

    /// Descendants of a node in document (pre-)order, the node itself excluded
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.child_ids(id).collect();
        stack.reverse();
        while let Some(cur) = stack.pop() {
            out.push(cur);
            let mark = stack.len();
            stack.extend(self.child_ids(cur));
            stack[mark..].reverse();
        }
        out
    }

    /// Whether `ancestor` is a strict ancestor of `node`
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).any(|a| a == ancestor)
    }

    /// Whether the node is attached to the document
    pub fn is_connected(&self, id: NodeId) -> bool {
        id == NodeId::ROOT || self.ancestors(id).any(|a| a == NodeId::ROOT)
    }

    /// Element tag name, lower-case
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.get(id)?.as_element().map(|e| e.tag.as_str())
    }

    /// Get an attribute value
    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.get(id)?.as_element()?.get_attr(name)
    }

    /// Set an attribute on an element
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> DomResult<()> {
        let elem = self.element_mut(id)?;
        elem.set_attr(name, value);
        Ok(())
    }

    /// Remove an attribute; returns whether it existed
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> DomResult<bool> {
        let elem = self.element_mut(id)?;
        Ok(elem.attrs.remove(name).is_some())
    }

    /// Class membership test
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.get(id)
            .and_then(Node::as_element)
            .is_some_and(|e| e.has_class(class))
    }

    fn element_mut(&mut self, id: NodeId) -> DomResult<&mut crate::ElementData> {
        self.get_mut(id)
            .ok_or(DomError::NotFound)?
            .as_element_mut()
            .ok_or(DomError::InvalidNodeType)
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        match self.get(id).map(|n| &n.data) {
            Some(NodeData::Text(t)) | Some(NodeData::Comment(t)) => t.clone(),
            Some(_) => self
                .descendants(id)
                .into_iter()
                .filter_map(|d| self.nodes[d.index()].as_text())
                .collect(),
            None => String::new(),
        }
    }

    /// Replace all children with a single text node holding `text` verbatim.
    ///
    /// Returns the detached former children.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> DomResult<Vec<NodeId>> {
        let node = self.get_mut(id).ok_or(DomError::NotFound)?;
        if let NodeData::Text(t) | NodeData::Comment(t) = &mut node.data {
            *t = text.to_string();
            return Ok(Vec::new());
        }

        let removed = self.remove_children(id);
        if !text.is_empty() {
            let node = self.create_text(text);
            self.append_child(id, node)?;
        }
        Ok(removed)
    }

    /// First element with the given `id` attribute under `scope`
    pub fn element_by_id(&self, scope: NodeId, id: &str) -> Option<NodeId> {
        self.descendants(scope).into_iter().find(|&d| {
            self.nodes[d.index()]
                .as_element()
                .is_some_and(|e| e.id() == Some(id))
        })
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (DomTree, NodeId, NodeId, NodeId) {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let a = tree.create_element("a");
        let b = tree.create_element("b");
        tree.append_child(tree.root(), div).unwrap();
        tree.append_child(div, a).unwrap();
        tree.append_child(div, b).unwrap();
        (tree, div, a, b)
    }

    #[test]
    fn test_append_and_children() {
        let (tree, div, a, b) = sample();
        let children: Vec<_> = tree.child_ids(div).collect();
        assert_eq!(children, vec![a, b]);
        assert_eq!(tree.parent(a), Some(div));
        assert!(tree.is_connected(b));
    }

    #[test]
    fn test_detach_and_reattach() {
        let (mut tree, div, a, b) = sample();
        tree.detach(a);

        assert_eq!(tree.parent(a), None);
        assert!(!tree.is_connected(a));
        assert_eq!(tree.child_ids(div).collect::<Vec<_>>(), vec![b]);

        tree.append_child(div, a).unwrap();
        assert_eq!(tree.child_ids(div).collect::<Vec<_>>(), vec![b, a]);
    }

    #[test]
    fn test_append_ancestor_is_rejected() {
        let (mut tree, div, a, _) = sample();
        assert_eq!(tree.append_child(a, div), Err(DomError::HierarchyRequest));
        assert_eq!(tree.append_child(a, a), Err(DomError::HierarchyRequest));
    }

    #[test]
    fn test_remove_child_requires_parent() {
        let (mut tree, div, a, _) = sample();
        let other = tree.create_element("p");
        assert_eq!(tree.remove_child(other, a), Err(DomError::NotAChild));
        assert_eq!(tree.remove_child(div, a), Ok(a));
    }

    #[test]
    fn test_descendants_document_order() {
        let (mut tree, div, a, b) = sample();
        let inner = tree.create_element("i");
        tree.append_child(a, inner).unwrap();

        assert_eq!(tree.descendants(div), vec![a, inner, b]);
        assert_eq!(tree.ancestors(inner).collect::<Vec<_>>(), vec![a, div, NodeId::ROOT]);
    }

    #[test]
    fn test_text_content_is_literal() {
        let (mut tree, div, _, _) = sample();
        let removed = tree.set_text_content(div, "<b>x</b>").unwrap();

        assert_eq!(removed.len(), 2);
        assert_eq!(tree.text_content(div), "<b>x</b>");
        assert_eq!(tree.child_ids(div).count(), 1);
    }

    #[test]
    fn test_element_by_id() {
        let (mut tree, _, _, b) = sample();
        tree.set_attribute(b, "id", "target").unwrap();
        assert_eq!(tree.element_by_id(tree.root(), "target"), Some(b));
        assert_eq!(tree.element_by_id(tree.root(), "missing"), None);
    }
}
