//! Shared fixture: a `.test-element` in the body holding `.one > .two > .three`

#![allow(dead_code)]

use bbn_native::{Collection, EventContext, EventTarget, Handler, Native, NodeId, Window};
use bbn_net::testing::RecordingBackend;
use std::cell::RefCell;
use std::rc::Rc;

pub const INNER: &str = r#"<div class="one"><div class="two"><span class="three"></span></div></div>"#;

pub struct Fixture {
    pub native: Native,
    pub backend: Rc<RecordingBackend>,
    pub el: NodeId,
    pub one: NodeId,
    pub two: NodeId,
    pub three: NodeId,
}

impl Fixture {
    pub fn new() -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let backend = Rc::new(RecordingBackend::new());
        let native = Native::new(Window::new("about:blank"), backend.clone());

        let test_element = native.select(r#"<div class="test-element"></div>"#).unwrap();
        let el = test_element.node(0).unwrap();
        {
            let mut document = native.window().document_mut();
            let body = document.body();
            document.tree_mut().append_child(body, el).unwrap();
        }
        test_element.html(INNER).unwrap();

        let one = native.select(".one").unwrap().node(0).unwrap();
        let two = native.select(".two").unwrap().node(0).unwrap();
        let three = native.select(".three").unwrap().node(0).unwrap();
        Self { native, backend, el, one, two, three }
    }

    pub fn wrap(&self, node: NodeId) -> Collection {
        self.native.select(node).unwrap()
    }

    pub fn click(&self, node: NodeId) -> bbn_native::Event {
        self.native.trigger(node, "click")
    }
}

/// Records `(element, target)` for every call
#[derive(Clone, Default)]
pub struct Spy(Rc<RefCell<Vec<(EventTarget, EventTarget)>>>);

impl Spy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handler(&self) -> Handler {
        let calls = Rc::clone(&self.0);
        Handler::new(move |ctx: &mut EventContext, element: EventTarget| {
            calls.borrow_mut().push((element, ctx.target()));
        })
    }

    pub fn calls(&self) -> Vec<(EventTarget, EventTarget)> {
        self.0.borrow().clone()
    }

    pub fn count(&self) -> usize {
        self.0.borrow().len()
    }
}

/// Handler appending `name` to a shared log
pub fn logger(log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str) -> Handler {
    let log = Rc::clone(log);
    Handler::new(move |_: &mut EventContext, _: EventTarget| log.borrow_mut().push(name))
}

pub fn node(id: NodeId) -> EventTarget {
    EventTarget::Node(id)
}
