//! Event handlers and the event view they receive

use bbn_dom::{EventTarget, Window};
use std::fmt;
use std::rc::Rc;

/// How a handler invocation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Keep going
    Continue,
    /// Prevent the default action and stop propagation
    Halt,
    /// The handler failed; dispatch carries on and the failure is recorded
    Failed(String),
}

/// Conversion from a handler's return value
pub trait IntoOutcome {
    fn into_outcome(self) -> Outcome;
}

impl IntoOutcome for Outcome {
    fn into_outcome(self) -> Outcome {
        self
    }
}

impl IntoOutcome for () {
    fn into_outcome(self) -> Outcome {
        Outcome::Continue
    }
}

/// `false` halts, `true` continues
impl IntoOutcome for bool {
    fn into_outcome(self) -> Outcome {
        if self { Outcome::Continue } else { Outcome::Halt }
    }
}

impl<T: IntoOutcome, E: fmt::Display> IntoOutcome for Result<T, E> {
    fn into_outcome(self) -> Outcome {
        match self {
            Ok(value) => value.into_outcome(),
            Err(err) => Outcome::Failed(err.to_string()),
        }
    }
}

/// The event as seen by one handler invocation
#[derive(Debug, Clone)]
pub struct EventContext {
    event_type: String,
    target: EventTarget,
    current_target: EventTarget,
    delegate_target: EventTarget,
    timestamp: f64,
    window: Window,
    default_prevented: bool,
    propagation_stopped: bool,
    immediate_stopped: bool,
}

impl EventContext {
    pub(crate) fn new(
        event_type: &str,
        target: EventTarget,
        delegate_target: EventTarget,
        timestamp: f64,
        window: Window,
    ) -> Self {
        Self {
            event_type: event_type.to_string(),
            target,
            current_target: delegate_target,
            delegate_target,
            timestamp,
            window,
            default_prevented: false,
            propagation_stopped: false,
            immediate_stopped: false,
        }
    }

    pub(crate) fn at(&mut self, current: EventTarget) {
        self.current_target = current;
    }

    /// Raw event type, without namespaces
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Where the event was dispatched
    pub fn target(&self) -> EventTarget {
        self.target
    }

    /// The element the handler runs for: the delegation match, or the bound element
    pub fn current_target(&self) -> EventTarget {
        self.current_target
    }

    /// The element the handler was registered on
    pub fn delegate_target(&self) -> EventTarget {
        self.delegate_target
    }

    /// Milliseconds since the Unix epoch when the native event was created
    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Skip handlers at ancestor levels and stop native bubbling
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Like `stop_propagation`, and skip every remaining handler too
    pub fn stop_immediate_propagation(&mut self) {
        self.propagation_stopped = true;
        self.immediate_stopped = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    pub fn is_immediate_propagation_stopped(&self) -> bool {
        self.immediate_stopped
    }
}

type HandlerFn = dyn Fn(&mut EventContext, EventTarget) -> Outcome;

/// A registered callback. Clones share identity; registrations are matched
/// by identity, never by behaviour.
#[derive(Clone)]
pub struct Handler(Rc<HandlerFn>);

impl Handler {
    /// Wrap a closure receiving the event and the element it runs for
    pub fn new<F, R>(f: F) -> Self
    where
        F: Fn(&mut EventContext, EventTarget) -> R + 'static,
        R: IntoOutcome,
    {
        Handler(Rc::new(move |ctx: &mut EventContext, element: EventTarget| {
            f(ctx, element).into_outcome()
        }))
    }

    /// A new handler with its own identity that forwards to this one
    pub fn rebind(&self) -> Self {
        let inner = Rc::clone(&self.0);
        Handler(Rc::new(move |ctx: &mut EventContext, element: EventTarget| {
            inner(ctx, element)
        }))
    }

    pub fn ptr_eq(&self, other: &Handler) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn call(&self, ctx: &mut EventContext, element: EventTarget) -> Outcome {
        (self.0)(ctx, element)
    }
}

impl PartialEq for Handler {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler({:p})", Rc::as_ptr(&self.0))
    }
}
