//! Backbone.Native DOM - the host document
//!
//! Arena-backed DOM tree, attribute storage, a small selector engine and
//! bubbling event dispatch. This is the "native" layer the façade wraps.

mod attributes;
mod document;
mod dom_events;
mod element;
mod node;
mod operations;
mod serialize;
mod tree;
mod window;

pub use attributes::{Attr, AttributeList};
pub use document::Document;
pub use dom_events::{Event, EventTarget};
pub use element::{Selector, ElementQuery};
pub use node::{ElementData, Links, Node, NodeData};
pub use operations::{DomError, DomResult};
pub use tree::DomTree;
pub use window::{Listener, ListenerId, Window};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID (the document node)
    pub const ROOT: NodeId = NodeId(0);
    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Whether this id refers to a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Raw arena index
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn to_option(self) -> Option<NodeId> {
        self.is_valid().then_some(self)
    }
}
