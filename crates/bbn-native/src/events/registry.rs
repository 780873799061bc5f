//! Event Registry
//!
//! Per (element, type) handler lists plus the single native listener that
//! serves each list. A list exists exactly as long as it holds at least one
//! registration, and so does its native listener.

use super::handler::Handler;
use super::key::EventSpec;
use bbn_dom::{EventTarget, ListenerId, Selector};
use std::collections::{HashMap, VecDeque};

/// One logical handler registration
#[derive(Debug, Clone)]
pub(crate) struct Registration {
    pub id: u64,
    pub namespaces: Vec<String>,
    pub selector: Option<Selector>,
    pub handler: Handler,
}

impl Registration {
    fn selector_str(&self) -> Option<&str> {
        self.selector.as_ref().map(Selector::as_str)
    }
}

/// Removal filter; `None` fields match anything
#[derive(Debug, Default)]
pub(crate) struct Filter<'a> {
    pub spec: Option<&'a EventSpec>,
    pub selector: Option<&'a str>,
    pub handler: Option<&'a Handler>,
}

impl Filter<'_> {
    fn matches_type(&self, event_type: &str) -> bool {
        self.spec
            .and_then(|s| s.event_type.as_deref())
            .is_none_or(|t| t == event_type)
    }

    fn matches(&self, registration: &Registration) -> bool {
        self.spec.is_none_or(|s| s.namespaces_match(&registration.namespaces))
            && self
                .selector
                .is_none_or(|sel| registration.selector_str() == Some(sel.trim()))
            && self.handler.is_none_or(|h| h.ptr_eq(&registration.handler))
    }
}

struct Slot {
    listener: ListenerId,
    registrations: Vec<Registration>,
}

/// A handler failure recorded during dispatch
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerFailure {
    pub event_type: String,
    /// Element the failing handler ran for
    pub element: EventTarget,
    pub message: String,
}

/// Failures kept until drained; older ones are dropped first
pub(crate) const MAX_FAILURES: usize = 64;

#[derive(Default)]
pub(crate) struct Registry {
    next_id: u64,
    slots: HashMap<(EventTarget, String), Slot>,
    failures: VecDeque<HandlerFailure>,
}

impl Registry {
    /// Whether the (type, selector, handler) triple is already registered on `target`
    pub fn contains(&self, target: EventTarget, event_type: &str, selector: Option<&str>, handler: &Handler) -> bool {
        self.slots
            .get(&(target, event_type.to_string()))
            .is_some_and(|slot| {
                slot.registrations
                    .iter()
                    .any(|r| r.selector_str() == selector && r.handler.ptr_eq(handler))
            })
    }

    /// Add a registration; `attach` is called when the pair has no native listener yet
    pub fn insert(
        &mut self,
        target: EventTarget,
        event_type: &str,
        namespaces: Vec<String>,
        selector: Option<Selector>,
        handler: Handler,
        attach: impl FnOnce() -> ListenerId,
    ) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        let slot = self
            .slots
            .entry((target, event_type.to_string()))
            .or_insert_with(|| Slot {
                listener: attach(),
                registrations: Vec::new(),
            });
        slot.registrations.push(Registration {
            id,
            namespaces,
            selector,
            handler,
        });
        id
    }

    /// Remove matching registrations from `target`.
    ///
    /// `detach` receives the type and listener of every list that became empty.
    pub fn remove(
        &mut self,
        target: EventTarget,
        filter: &Filter<'_>,
        mut detach: impl FnMut(&str, ListenerId),
    ) -> usize {
        let mut removed = 0;
        self.slots.retain(|(t, event_type), slot| {
            if *t != target || !filter.matches_type(event_type) {
                return true;
            }
            let before = slot.registrations.len();
            slot.registrations.retain(|r| !filter.matches(r));
            removed += before - slot.registrations.len();
            if slot.registrations.is_empty() {
                detach(event_type, slot.listener);
                false
            } else {
                true
            }
        });
        removed
    }

    /// Drop everything registered on `target`
    pub fn purge(&mut self, target: EventTarget, detach: impl FnMut(&str, ListenerId)) -> usize {
        self.remove(target, &Filter::default(), detach)
    }

    /// Copy of the registrations for (target, type), in registration order
    pub fn snapshot(&self, target: EventTarget, event_type: &str) -> Vec<Registration> {
        self.slots
            .get(&(target, event_type.to_string()))
            .map(|slot| slot.registrations.clone())
            .unwrap_or_default()
    }

    /// Number of registrations on `target`, across all types
    pub fn count(&self, target: EventTarget) -> usize {
        self.slots
            .iter()
            .filter(|((t, _), _)| *t == target)
            .map(|(_, slot)| slot.registrations.len())
            .sum()
    }

    pub fn record_failure(&mut self, failure: HandlerFailure) {
        if self.failures.len() == MAX_FAILURES {
            self.failures.pop_front();
            tracing::debug!(max = MAX_FAILURES, "handler failure log full, dropping oldest");
        }
        self.failures.push_back(failure);
    }

    pub fn take_failures(&mut self) -> Vec<HandlerFailure> {
        std::mem::take(&mut self.failures).into()
    }
}
