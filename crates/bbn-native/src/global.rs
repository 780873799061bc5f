//! Global installation
//!
//! A `GlobalScope` is an explicit table of named slots standing in for the
//! host's global object. `install` binds a [`Native`] to its two slots and
//! remembers what was there before; `no_conflict` gives the slots back.

use crate::Native;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

/// What a global slot holds
#[derive(Debug, Clone)]
pub enum Binding {
    Native(Native),
    /// Anything else, identified by name
    Foreign(Rc<str>),
}

impl Binding {
    pub fn foreign(name: &str) -> Self {
        Binding::Foreign(Rc::from(name))
    }

    /// Whether the slot holds exactly `native`
    pub fn is(&self, native: &Native) -> bool {
        matches!(self, Binding::Native(n) if n.ptr_eq(native))
    }

    pub fn as_native(&self) -> Option<&Native> {
        match self {
            Binding::Native(native) => Some(native),
            Binding::Foreign(_) => None,
        }
    }
}

impl PartialEq for Binding {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Binding::Native(a), Binding::Native(b)) => a.ptr_eq(b),
            (Binding::Foreign(a), Binding::Foreign(b)) => a == b,
            _ => false,
        }
    }
}

/// Named global slots
#[derive(Debug, Default)]
pub struct GlobalScope {
    slots: RefCell<HashMap<String, Binding>>,
}

impl GlobalScope {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn get(&self, name: &str) -> Option<Binding> {
        self.slots.borrow().get(name).cloned()
    }

    /// Store `binding`, returning the previous occupant
    pub fn set(&self, name: &str, binding: Binding) -> Option<Binding> {
        self.slots.borrow_mut().insert(name.to_string(), binding)
    }

    pub fn remove(&self, name: &str) -> Option<Binding> {
        self.slots.borrow_mut().remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.borrow().contains_key(name)
    }

    /// Put `previous` back into `name`, or clear the slot when there was none
    fn restore(&self, name: &str, previous: Option<Binding>) {
        match previous {
            Some(binding) => {
                self.set(name, binding);
            }
            None => {
                self.remove(name);
            }
        }
    }
}

/// Slot occupants displaced by `install`
pub(crate) struct InstallState {
    scope: Weak<GlobalScope>,
    previous_global: Option<Binding>,
    previous_framework: Option<Binding>,
}

impl Native {
    /// Bind this native to the global and framework slots of `scope`
    pub fn install(&self, scope: &Rc<GlobalScope>) {
        let config = self.config();
        let this = Binding::Native(self.clone());
        let previous_global = scope.set(&config.global_name, this.clone());
        let previous_framework = scope.set(&config.framework_name, this);

        tracing::debug!(global = %config.global_name, framework = %config.framework_name, "installed");
        *self.install_state() = Some(InstallState {
            scope: Rc::downgrade(scope),
            // Reinstalling must not remember ourselves as the previous occupant
            previous_global: previous_global.filter(|b| !b.is(self)),
            previous_framework: previous_framework.filter(|b| !b.is(self)),
        });
    }

    /// Give the global slot back to its previous occupant; with `deep`, the
    /// framework slot too. Slots no longer holding this native are left
    /// alone, so repeated calls are harmless. Returns this native.
    pub fn no_conflict(&self, deep: bool) -> Native {
        let state = self.install_state();
        let Some(state) = state.as_ref() else {
            return self.clone();
        };
        let Some(scope) = state.scope.upgrade() else {
            return self.clone();
        };

        let config = self.config();
        if scope.get(&config.global_name).is_some_and(|b| b.is(self)) {
            scope.restore(&config.global_name, state.previous_global.clone());
            tracing::debug!(slot = %config.global_name, "global slot restored");
        }
        if deep && scope.get(&config.framework_name).is_some_and(|b| b.is(self)) {
            scope.restore(&config.framework_name, state.previous_framework.clone());
            tracing::debug!(slot = %config.framework_name, "framework slot restored");
        }
        self.clone()
    }
}
