//! DOM Events
//!
//! Native event objects and the targets they are dispatched to.

use crate::NodeId;
use std::time::{SystemTime, UNIX_EPOCH};

/// Something a native listener can be attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    /// A node of the document tree
    Node(NodeId),
    /// The global window object
    Window,
}

impl EventTarget {
    /// The node, if this target is one
    pub fn node(self) -> Option<NodeId> {
        match self {
            Self::Node(id) => Some(id),
            Self::Window => None,
        }
    }
}

impl From<NodeId> for EventTarget {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}

/// Native DOM event
#[derive(Debug, Clone)]
pub struct Event {
    pub event_type: String,
    pub target: EventTarget,
    pub current_target: Option<EventTarget>,
    pub bubbles: bool,
    pub cancelable: bool,
    /// Milliseconds since the Unix epoch at creation
    pub timestamp: f64,
    default_prevented: bool,
    propagation_stopped: bool,
    immediate_propagation_stopped: bool,
}

impl Event {
    /// Create an event; the target is filled in by dispatch
    pub fn new(event_type: &str, bubbles: bool, cancelable: bool) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64() * 1000.0)
            .unwrap_or(0.0);
        Self {
            event_type: event_type.to_string(),
            target: EventTarget::Window,
            current_target: None,
            bubbles,
            cancelable,
            timestamp,
            default_prevented: false,
            propagation_stopped: false,
            immediate_propagation_stopped: false,
        }
    }

    /// Bubbling, cancelable event (what a mouse click produces)
    pub fn mouse(event_type: &str) -> Self {
        Self::new(event_type, true, true)
    }

    /// Non-bubbling, non-cancelable event (`popstate`, `hashchange`)
    pub fn html(event_type: &str) -> Self {
        Self::new(event_type, false, false)
    }

    /// Prevent default action
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    /// Stop propagation to further targets
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Stop propagation and skip the remaining listeners on this target
    pub fn stop_immediate_propagation(&mut self) {
        self.propagation_stopped = true;
        self.immediate_propagation_stopped = true;
    }

    /// Check if default was prevented
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Check if propagation was stopped
    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    /// Check if immediate propagation was stopped
    pub fn is_immediate_propagation_stopped(&self) -> bool {
        self.immediate_propagation_stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prevent_default_requires_cancelable() {
        let mut event = Event::html("popstate");
        event.prevent_default();
        assert!(!event.is_default_prevented());

        let mut event = Event::mouse("click");
        event.prevent_default();
        assert!(event.is_default_prevented());
    }

    #[test]
    fn test_immediate_stop_implies_stop() {
        let mut event = Event::mouse("click");
        event.stop_immediate_propagation();
        assert!(event.is_propagation_stopped());
        assert!(event.is_immediate_propagation_stopped());
    }
}
