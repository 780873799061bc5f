//! Dispatch Engine
//!
//! Runs when the native listener of an (element, type) pair fires. The
//! handler queue is computed up front from a snapshot of the registry:
//! every delegated registration is matched against the nearest node on the
//! path from the event target up to the listener element, and the queue is
//! ordered innermost level first, delegated before direct at the listener's
//! own level, then registration order. A stop at one level skips every
//! queued handler at an outer level.

use super::handler::{EventContext, Outcome};
use super::registry::{HandlerFailure, Registration};
use crate::Native;
use bbn_dom::{DomTree, Event, EventTarget};

/// What the handlers asked for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchResult {
    pub default_prevented: bool,
    pub propagation_stopped: bool,
}

struct Invocation {
    /// Index into the path; 0 is the event target
    depth: usize,
    delegated: bool,
    element: EventTarget,
    registration: Registration,
}

/// Event target up to and including `listener`
fn propagation_path(tree: &DomTree, target: EventTarget, listener: EventTarget) -> Vec<EventTarget> {
    let EventTarget::Node(start) = target else {
        return vec![listener];
    };
    let mut path = Vec::new();
    for node in std::iter::once(start).chain(tree.ancestors(start)) {
        path.push(EventTarget::Node(node));
        if EventTarget::Node(node) == listener {
            return path;
        }
    }
    if listener == EventTarget::Window {
        path.push(EventTarget::Window);
        return path;
    }
    // Target outside the listener's subtree: only direct handlers apply
    vec![listener]
}

fn build_queue(native: &Native, listener: EventTarget, target: EventTarget, registrations: Vec<Registration>) -> Vec<Invocation> {
    let document = native.window().document();
    let tree = document.tree();
    let path = propagation_path(tree, target, listener);
    let own_level = path.len() - 1;

    let mut queue: Vec<Invocation> = registrations
        .into_iter()
        .filter_map(|registration| match &registration.selector {
            None => Some(Invocation {
                depth: own_level,
                delegated: false,
                element: listener,
                registration,
            }),
            Some(selector) => path
                .iter()
                .enumerate()
                .find(|(_, t)| t.node().is_some_and(|n| selector.matches(tree, n)))
                .map(|(depth, &element)| Invocation {
                    depth,
                    delegated: true,
                    element,
                    registration,
                }),
        })
        .collect();

    queue.sort_by_key(|inv| (inv.depth, !inv.delegated));
    queue
}

/// Entry point for a native listener firing on `event.current_target`
pub(crate) fn dispatch(native: &Native, event: &mut Event) {
    let Some(listener) = event.current_target else {
        return;
    };
    let registrations = native.registry().snapshot(listener, &event.event_type);
    if registrations.is_empty() {
        return;
    }

    let queue = build_queue(native, listener, event.target, registrations);
    let result = run_queue(native, listener, event, queue);

    if result.default_prevented {
        event.prevent_default();
    }
    if result.propagation_stopped {
        event.stop_propagation();
    }
}

fn run_queue(native: &Native, listener: EventTarget, event: &Event, queue: Vec<Invocation>) -> DispatchResult {
    let mut ctx = EventContext::new(
        &event.event_type,
        event.target,
        listener,
        event.timestamp,
        native.window().clone(),
    );
    let mut stopped_at: Option<usize> = None;

    for inv in queue {
        if stopped_at.is_some_and(|depth| inv.depth > depth) {
            tracing::trace!(id = inv.registration.id, "skipped after stopPropagation");
            continue;
        }
        ctx.at(inv.element);
        tracing::trace!(
            id = inv.registration.id,
            event_type = %event.event_type,
            delegated = inv.delegated,
            depth = inv.depth,
            "invoking handler"
        );

        match inv.registration.handler.call(&mut ctx, inv.element) {
            Outcome::Continue => {}
            Outcome::Halt => {
                ctx.prevent_default();
                ctx.stop_propagation();
            }
            Outcome::Failed(message) => {
                tracing::warn!(event_type = %event.event_type, element = ?inv.element, %message, "event handler failed");
                native.registry_mut().record_failure(HandlerFailure {
                    event_type: event.event_type.clone(),
                    element: inv.element,
                    message,
                });
            }
        }

        if ctx.is_immediate_propagation_stopped() {
            break;
        }
        if ctx.is_propagation_stopped() && stopped_at.is_none() {
            stopped_at = Some(inv.depth);
        }
    }

    DispatchResult {
        default_prevented: ctx.is_default_prevented(),
        propagation_stopped: ctx.is_propagation_stopped(),
    }
}
