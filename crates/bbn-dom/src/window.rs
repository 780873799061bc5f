//! Window - browsing context
//!
//! Owns the document and the native listener table. Dispatch walks the
//! bubble path target → ancestors → window and never holds an internal
//! borrow while a listener runs, so listeners are free to mutate the DOM,
//! (un)register listeners or dispatch nested events.

use crate::{Document, Event, EventTarget, NodeId};
use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::rc::Rc;

/// Native listener callback
pub type Listener = Rc<dyn Fn(&Window, &mut Event)>;

/// Handle returned by `add_event_listener`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
struct ListenerTable {
    next_id: u64,
    by_target: HashMap<(EventTarget, String), Vec<(ListenerId, Listener)>>,
}

struct WindowInner {
    document: RefCell<Document>,
    listeners: RefCell<ListenerTable>,
}

/// Shared handle to the browsing context
#[derive(Clone)]
pub struct Window {
    inner: Rc<WindowInner>,
}

impl std::fmt::Debug for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window")
            .field("url", &self.inner.document.borrow().url())
            .finish_non_exhaustive()
    }
}

impl Window {
    /// Create a window around a fresh document
    pub fn new(url: &str) -> Self {
        Self::with_document(Document::new(url))
    }

    /// Create a window around an existing document
    pub fn with_document(document: Document) -> Self {
        Self {
            inner: Rc::new(WindowInner {
                document: RefCell::new(document),
                listeners: RefCell::new(ListenerTable::default()),
            }),
        }
    }

    /// Borrow the document
    pub fn document(&self) -> Ref<'_, Document> {
        self.inner.document.borrow()
    }

    /// Borrow the document mutably
    pub fn document_mut(&self) -> RefMut<'_, Document> {
        self.inner.document.borrow_mut()
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &Window) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Register a bubble-phase listener
    pub fn add_event_listener(&self, target: EventTarget, event_type: &str, listener: Listener) -> ListenerId {
        let mut table = self.inner.listeners.borrow_mut();
        table.next_id += 1;
        let id = ListenerId(table.next_id);
        table
            .by_target
            .entry((target, event_type.to_string()))
            .or_default()
            .push((id, listener));
        tracing::trace!(?target, event_type, ?id, "native listener added");
        id
    }

    /// Unregister a listener; returns whether it was present
    pub fn remove_event_listener(&self, target: EventTarget, event_type: &str, id: ListenerId) -> bool {
        let mut table = self.inner.listeners.borrow_mut();
        let key = (target, event_type.to_string());
        let Some(list) = table.by_target.get_mut(&key) else {
            return false;
        };
        let before = list.len();
        list.retain(|(l, _)| *l != id);
        let removed = list.len() != before;
        if list.is_empty() {
            table.by_target.remove(&key);
        }
        if removed {
            tracing::trace!(?target, event_type, ?id, "native listener removed");
        }
        removed
    }

    /// Number of native listeners for (target, type)
    pub fn listener_count(&self, target: EventTarget, event_type: &str) -> usize {
        self.inner
            .listeners
            .borrow()
            .by_target
            .get(&(target, event_type.to_string()))
            .map_or(0, Vec::len)
    }

    /// Total number of native listeners on a target, across all types
    pub fn listeners_on(&self, target: EventTarget) -> usize {
        self.inner
            .listeners
            .borrow()
            .by_target
            .iter()
            .filter(|((t, _), _)| *t == target)
            .map(|(_, list)| list.len())
            .sum()
    }

    /// Propagation path: the target, then its ancestors, then the window
    /// when the node is attached to the document
    fn propagation_path(&self, target: EventTarget) -> Vec<EventTarget> {
        let EventTarget::Node(node) = target else {
            return vec![EventTarget::Window];
        };
        let doc = self.document();
        let tree = doc.tree();
        let mut path = vec![EventTarget::Node(node)];
        path.extend(tree.ancestors(node).map(EventTarget::Node));
        if tree.is_connected(node) {
            path.push(EventTarget::Window);
        }
        path
    }

    fn snapshot(&self, target: EventTarget, event_type: &str) -> Vec<Listener> {
        self.inner
            .listeners
            .borrow()
            .by_target
            .get(&(target, event_type.to_string()))
            .map(|list| list.iter().map(|(_, l)| Rc::clone(l)).collect())
            .unwrap_or_default()
    }

    /// Dispatch `event` at `target`.
    ///
    /// Returns `false` when a listener prevented the default action.
    pub fn dispatch_event(&self, target: EventTarget, event: &mut Event) -> bool {
        event.target = target;
        let path = self.propagation_path(target);
        tracing::debug!(event_type = %event.event_type, ?target, depth = path.len(), "dispatching");

        for (depth, &current) in path.iter().enumerate() {
            if depth > 0 && !event.bubbles {
                break;
            }
            event.current_target = Some(current);
            for listener in self.snapshot(current, &event.event_type) {
                listener(self, event);
                if event.is_immediate_propagation_stopped() {
                    break;
                }
            }
            if event.is_propagation_stopped() {
                tracing::trace!(?current, "propagation stopped");
                break;
            }
        }

        event.current_target = None;
        !event.is_default_prevented()
    }

    /// Convenience: dispatch a bubbling, cancelable event of `event_type`
    pub fn fire(&self, target: EventTarget, event_type: &str) -> Event {
        let mut event = Event::mouse(event_type);
        self.dispatch_event(target, &mut event);
        event
    }

    /// Convenience for the common node case
    pub fn fire_on(&self, node: NodeId, event_type: &str) -> Event {
        self.fire(EventTarget::Node(node), event_type)
    }
}
