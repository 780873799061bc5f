//! Event binding on collections
//!
//! `on`/`off` and their `bind`/`delegate` aliases. Registration lazily
//! attaches one native listener per (element, type); removal detaches it
//! again when the last registration for the pair goes away.

mod dispatch;
mod handler;
mod key;
mod registry;

pub use dispatch::DispatchResult;
pub use handler::{EventContext, Handler, IntoOutcome, Outcome};
pub use registry::HandlerFailure;

pub(crate) use registry::Registry;

use crate::{Collection, Native, NativeResult};
use bbn_dom::{Event, EventTarget, Listener, ListenerId, Selector, Window};
use key::parse_events;
use registry::Filter;
use std::rc::Rc;

impl Native {
    /// The native listener shared by every (element, type) pair
    fn native_listener(&self) -> Listener {
        let native = self.downgrade();
        Rc::new(move |_: &Window, event: &mut Event| {
            if let Some(native) = native.upgrade() {
                dispatch::dispatch(&native, event);
            }
        })
    }

    pub(crate) fn register(
        &self,
        target: EventTarget,
        events: &str,
        selector: Option<&Selector>,
        handler: &Handler,
    ) {
        let selector_str = selector.map(Selector::as_str);
        for spec in parse_events(events) {
            let Some(event_type) = spec.event_type else {
                tracing::debug!(events, "namespace-only event spec ignored by on()");
                continue;
            };
            if self
                .registry()
                .contains(target, &event_type, selector_str, handler)
            {
                tracing::debug!(?target, %event_type, selector = selector_str, "handler already registered");
                continue;
            }

            let window = self.window().clone();
            let listener = self.native_listener();
            let id = self.registry_mut().insert(
                target,
                &event_type,
                spec.namespaces,
                selector.cloned(),
                handler.clone(),
                || {
                    tracing::debug!(?target, %event_type, "attaching native listener");
                    window.add_event_listener(target, &event_type, listener)
                },
            );
            tracing::debug!(?target, %event_type, selector = selector_str, id, "handler registered");
        }
    }

    fn detacher(&self, target: EventTarget) -> impl FnMut(&str, ListenerId) + '_ {
        move |event_type: &str, listener: ListenerId| {
            tracing::debug!(?target, event_type, "detaching native listener");
            self.window().remove_event_listener(target, event_type, listener);
        }
    }

    pub(crate) fn unregister(
        &self,
        target: EventTarget,
        events: Option<&str>,
        selector: Option<&str>,
        handler: Option<&Handler>,
    ) {
        let specs = events.map(parse_events).unwrap_or_default();
        let mut removed = 0;
        if specs.is_empty() {
            let filter = Filter {
                spec: None,
                selector,
                handler,
            };
            removed += self.registry_mut().remove(target, &filter, self.detacher(target));
        }
        for spec in &specs {
            let filter = Filter {
                spec: Some(spec),
                selector,
                handler,
            };
            removed += self.registry_mut().remove(target, &filter, self.detacher(target));
        }
        tracing::debug!(?target, events, selector, removed, "handlers removed");
    }

    /// Drop every registration on `target` along with its native listeners
    pub(crate) fn purge(&self, target: EventTarget) {
        let removed = self.registry_mut().purge(target, self.detacher(target));
        if removed > 0 {
            tracing::debug!(?target, removed, "registrations purged");
        }
    }
}

impl Collection {
    /// Register `handler` for `events` on every element; with a selector the
    /// registration is delegated to matching descendants
    pub fn on(&self, events: &str, selector: Option<&str>, handler: &Handler) -> NativeResult<&Self> {
        let selector = selector
            .filter(|s| !s.trim().is_empty())
            .map(Selector::parse)
            .transpose()?;
        for &target in self.iter() {
            self.native().register(target, events, selector.as_ref(), handler);
        }
        Ok(self)
    }

    /// Remove matching registrations; omitted filters match anything
    pub fn off(&self, events: Option<&str>, selector: Option<&str>, handler: Option<&Handler>) -> &Self {
        for &target in self.iter() {
            self.native().unregister(target, events, selector, handler);
        }
        self
    }

    /// `on` without delegation
    pub fn bind(&self, events: &str, handler: &Handler) -> NativeResult<&Self> {
        self.on(events, None, handler)
    }

    /// `off` without a selector filter
    pub fn unbind(&self, events: Option<&str>, handler: Option<&Handler>) -> &Self {
        self.off(events, None, handler)
    }

    pub fn delegate(&self, selector: &str, events: &str, handler: &Handler) -> NativeResult<&Self> {
        self.on(events, Some(selector), handler)
    }

    pub fn undelegate(&self, selector: &str, events: Option<&str>, handler: Option<&Handler>) -> &Self {
        self.off(events, Some(selector), handler)
    }
}
