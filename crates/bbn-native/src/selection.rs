//! What a collection can be built from
//!
//! The kind of input is decided once, when the `Selection` is created.

use crate::Collection;
use bbn_dom::{EventTarget, NodeId};

/// Input to [`Native::select`](crate::Native::select)
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Selection {
    /// Nothing: an empty collection
    #[default]
    Empty,
    /// CSS selector, optionally scoped to the descendants of `context`
    Selector {
        selector: String,
        context: Option<NodeId>,
    },
    /// HTML snippet; yields a new, detached element
    Html(String),
    /// One existing element (or the window)
    Element(EventTarget),
    /// Existing elements, kept as given
    Elements(Vec<EventTarget>),
    /// The window object
    Window,
}

impl Selection {
    /// Selector scoped to `context`
    pub fn within(selector: &str, context: NodeId) -> Self {
        Selection::Selector {
            selector: selector.to_string(),
            context: Some(context),
        }
    }
}

impl From<&str> for Selection {
    fn from(input: &str) -> Self {
        let trimmed = input.trim_start();
        if trimmed.starts_with('<') {
            Selection::Html(input.to_string())
        } else if trimmed.is_empty() {
            Selection::Empty
        } else {
            Selection::Selector {
                selector: input.to_string(),
                context: None,
            }
        }
    }
}

impl From<String> for Selection {
    fn from(input: String) -> Self {
        Selection::from(input.as_str())
    }
}

impl From<&String> for Selection {
    fn from(input: &String) -> Self {
        Selection::from(input.as_str())
    }
}

impl From<NodeId> for Selection {
    fn from(node: NodeId) -> Self {
        Selection::Element(EventTarget::Node(node))
    }
}

impl From<EventTarget> for Selection {
    fn from(target: EventTarget) -> Self {
        match target {
            EventTarget::Window => Selection::Window,
            node => Selection::Element(node),
        }
    }
}

impl From<Vec<NodeId>> for Selection {
    fn from(nodes: Vec<NodeId>) -> Self {
        Selection::Elements(nodes.into_iter().map(EventTarget::Node).collect())
    }
}

impl From<&[NodeId]> for Selection {
    fn from(nodes: &[NodeId]) -> Self {
        Selection::Elements(nodes.iter().copied().map(EventTarget::Node).collect())
    }
}

impl From<Vec<EventTarget>> for Selection {
    fn from(targets: Vec<EventTarget>) -> Self {
        Selection::Elements(targets)
    }
}

impl From<&Collection> for Selection {
    fn from(collection: &Collection) -> Self {
        Selection::Elements(collection.iter().copied().collect())
    }
}

impl<T: Into<Selection>> From<Option<T>> for Selection {
    fn from(input: Option<T>) -> Self {
        input.map_or(Selection::Empty, Into::into)
    }
}
