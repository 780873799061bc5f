//! Collection - the result of every selection

use crate::Native;
use bbn_dom::{EventTarget, NodeId};

/// Ordered set of elements (the window included) bound to a [`Native`]
#[derive(Clone)]
pub struct Collection {
    native: Native,
    items: Vec<EventTarget>,
}

impl std::fmt::Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(&self.items).finish()
    }
}

impl Collection {
    pub(crate) fn new(native: Native, items: Vec<EventTarget>) -> Self {
        Self { native, items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Element at `index`, `None` past the end
    pub fn get(&self, index: usize) -> Option<EventTarget> {
        self.items.get(index).copied()
    }

    /// The `index`-th element when it is a node
    pub fn node(&self, index: usize) -> Option<NodeId> {
        self.get(index).and_then(EventTarget::node)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EventTarget> {
        self.items.iter()
    }

    /// Node members, skipping the window
    pub(crate) fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.items.iter().filter_map(|t| t.node())
    }

    pub fn native(&self) -> &Native {
        &self.native
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a EventTarget;
    type IntoIter = std::slice::Iter<'a, EventTarget>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
