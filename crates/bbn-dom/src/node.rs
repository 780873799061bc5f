//! Arena nodes
//!
//! Nodes point at each other through `NodeId`s, so a whole document lives in
//! one `Vec` and a detached subtree stays addressable until re-attached.

use crate::{AttributeList, NodeId};

/// Tree links of a node; `NodeId::NONE` marks a missing link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Links {
    pub parent: NodeId,
    pub first_child: NodeId,
    pub last_child: NodeId,
    pub prev_sibling: NodeId,
    pub next_sibling: NodeId,
}

impl Links {
    const UNLINKED: Links = Links {
        parent: NodeId::NONE,
        first_child: NodeId::NONE,
        last_child: NodeId::NONE,
        prev_sibling: NodeId::NONE,
        next_sibling: NodeId::NONE,
    };
}

#[derive(Debug)]
pub struct Node {
    pub links: Links,
    pub data: NodeData,
}

impl Node {
    /// An unlinked node
    pub fn new(data: NodeData) -> Self {
        Self {
            links: Links::UNLINKED,
            data,
        }
    }

    pub fn element(tag: &str) -> Self {
        Self::new(NodeData::Element(ElementData::new(tag)))
    }

    pub fn text(content: &str) -> Self {
        Self::new(NodeData::Text(content.to_string()))
    }

    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }

    pub fn as_element(&self) -> Option<&ElementData> {
        if let NodeData::Element(e) = &self.data { Some(e) } else { None }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        if let NodeData::Element(e) = &mut self.data { Some(e) } else { None }
    }

    pub fn as_text(&self) -> Option<&str> {
        if let NodeData::Text(t) = &self.data { Some(t) } else { None }
    }
}

/// What kind of node this is, with its payload
#[derive(Debug)]
pub enum NodeData {
    Document,
    Doctype { name: String },
    Element(ElementData),
    Text(String),
    Comment(String),
}

/// Tag name and attributes of an element
#[derive(Debug)]
pub struct ElementData {
    /// ASCII-lowercased
    pub tag: String,
    pub attrs: AttributeList,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: AttributeList::new(),
        }
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name)
    }

    /// Replaces any previous value
    pub fn set_attr(&mut self, name: &str, value: &str) {
        self.attrs.set(name, value);
    }

    pub fn id(&self) -> Option<&str> {
        self.get_attr("id")
    }

    /// Whitespace-separated entries of the `class` attribute
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.get_attr("class").unwrap_or("").split_ascii_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }
}
