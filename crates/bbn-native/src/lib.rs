//! Backbone.Native
//!
//! A jQuery-compatible DOM façade for Backbone-style views: element
//! selection, namespaced and delegated event binding, attribute and content
//! helpers, and ajax over a pluggable XMLHttpRequest backend.
//!
//! ```ignore
//! let native = Native::from_config(NativeConfig::default())?;
//! let links = native.select("#nav")?;
//! links.on("click.menu", Some("a"), &Handler::new(|ctx, _| {
//!     ctx.prevent_default();
//! }))?;
//! ```

mod collection;
mod config;
mod content;
mod error;
mod events;
mod global;
mod selection;
mod view;

pub use collection::Collection;
pub use config::NativeConfig;
pub use error::{NativeError, NativeResult};
pub use events::{DispatchResult, EventContext, Handler, HandlerFailure, IntoOutcome, Outcome};
pub use global::{Binding, GlobalScope};
pub use selection::Selection;
pub use view::{ElementSpec, ViewEvents};

pub use bbn_dom::{Event, EventTarget, NodeId, Window};
pub use bbn_net::{AjaxOptions, Backend, SyncMethod, SyncOptions, XmlHttpRequest};

use bbn_dom::ElementQuery;
use bbn_net::HttpBackend;
use events::Registry;
use global::InstallState;
use serde::Serialize;
use std::cell::{Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};

struct NativeInner {
    window: Window,
    registry: RefCell<Registry>,
    backend: Rc<dyn Backend>,
    config: NativeConfig,
    install: RefCell<Option<InstallState>>,
}

/// The façade: a window, the event registry and the ajax backend
#[derive(Clone)]
pub struct Native(Rc<NativeInner>);

impl std::fmt::Debug for Native {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Native")
            .field("window", &self.0.window)
            .field("global_name", &self.0.config.global_name)
            .finish_non_exhaustive()
    }
}

/// Non-owning handle held by native listeners
#[derive(Clone)]
pub(crate) struct WeakNative(Weak<NativeInner>);

impl WeakNative {
    pub(crate) fn upgrade(&self) -> Option<Native> {
        self.0.upgrade().map(Native)
    }
}

impl Native {
    pub fn new(window: Window, backend: Rc<dyn Backend>) -> Self {
        Self::with_config(window, backend, NativeConfig::default())
    }

    pub fn with_config(window: Window, backend: Rc<dyn Backend>, config: NativeConfig) -> Self {
        Native(Rc::new(NativeInner {
            window,
            registry: RefCell::new(Registry::default()),
            backend,
            config,
            install: RefCell::new(None),
        }))
    }

    /// Fresh window at `config.url`, real HTTP backend
    pub fn from_config(config: NativeConfig) -> NativeResult<Self> {
        let window = Window::new(&config.url);
        let backend = HttpBackend::with_config(config.client.clone())?;
        tracing::info!(url = %config.url, "native created");
        Ok(Self::with_config(window, Rc::new(backend), config))
    }

    pub fn window(&self) -> &Window {
        &self.0.window
    }

    pub fn config(&self) -> &NativeConfig {
        &self.0.config
    }

    pub fn backend(&self) -> &Rc<dyn Backend> {
        &self.0.backend
    }

    pub fn ptr_eq(&self, other: &Native) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn registry(&self) -> Ref<'_, Registry> {
        self.0.registry.borrow()
    }

    pub(crate) fn registry_mut(&self) -> RefMut<'_, Registry> {
        self.0.registry.borrow_mut()
    }

    pub(crate) fn install_state(&self) -> RefMut<'_, Option<InstallState>> {
        self.0.install.borrow_mut()
    }

    pub(crate) fn downgrade(&self) -> WeakNative {
        WeakNative(Rc::downgrade(&self.0))
    }

    /// Build a collection.
    ///
    /// Selectors search the whole document, or the descendants of the
    /// context node; a selector matching nothing gives an empty collection.
    /// An HTML snippet produces one new element that is not attached to the
    /// document.
    pub fn select(&self, input: impl Into<Selection>) -> NativeResult<Collection> {
        let items = match input.into() {
            Selection::Empty => Vec::new(),
            Selection::Selector { selector, context } => {
                let document = self.window().document();
                let root = context.unwrap_or_else(|| document.root());
                document
                    .tree()
                    .query_selector_all(root, &selector)?
                    .into_iter()
                    .map(EventTarget::Node)
                    .collect()
            }
            Selection::Html(html) => {
                let mut document = self.window().document_mut();
                bbn_html::create_detached(document.tree_mut(), &html)?
                    .map(EventTarget::Node)
                    .into_iter()
                    .collect()
            }
            Selection::Element(target) => vec![target],
            Selection::Elements(targets) => targets,
            Selection::Window => vec![EventTarget::Window],
        };
        tracing::trace!(count = items.len(), "selected");
        Ok(Collection::new(self.clone(), items))
    }

    /// Issue a request through this native's backend
    pub fn ajax(&self, options: AjaxOptions) -> NativeResult<XmlHttpRequest> {
        Ok(bbn_net::ajax(options, Rc::clone(self.backend()))?)
    }

    /// Persist `model` at `url` the way Backbone.sync does
    pub fn sync<M: Serialize + ?Sized>(
        &self,
        method: SyncMethod,
        url: &str,
        model: &M,
        options: SyncOptions,
    ) -> NativeResult<XmlHttpRequest> {
        Ok(bbn_net::sync(method, url, model, Rc::clone(self.backend()), options)?)
    }

    /// Dispatch a native event of `event_type` at `target` and return it.
    ///
    /// `popstate` and `hashchange` neither bubble nor cancel; everything
    /// else behaves like a click.
    pub fn trigger(&self, target: impl Into<EventTarget>, event_type: &str) -> Event {
        let mut event = match event_type {
            "popstate" | "hashchange" => Event::html(event_type),
            _ => Event::mouse(event_type),
        };
        self.window().dispatch_event(target.into(), &mut event);
        event
    }

    /// Handler failures recorded since the last call, the most recent 64 at most
    pub fn take_handler_failures(&self) -> Vec<HandlerFailure> {
        self.registry_mut().take_failures()
    }

    /// Registrations held for `target`, across all event types
    pub fn registration_count(&self, target: impl Into<EventTarget>) -> usize {
        self.registry().count(target.into())
    }
}

impl Collection {
    /// Dispatch `event_type` at every element, returning the events
    pub fn trigger(&self, event_type: &str) -> Vec<Event> {
        self.iter()
            .map(|&target| self.native().trigger(target, event_type))
            .collect()
    }
}
