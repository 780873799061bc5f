//! Event binding, delegation and dispatch

mod common;

use bbn_native::{EventContext, EventTarget, Handler, Outcome, Selection};
use common::{logger, node, Fixture, Spy};
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn test_direct_handler_gets_bound_element() -> anyhow::Result<()> {
    let f = Fixture::new();
    let spy = Spy::new();
    f.wrap(f.one).on("click", None, &spy.handler())?;

    f.click(f.three);
    assert_eq!(spy.calls(), vec![(node(f.one), node(f.three))]);

    f.click(f.el);
    assert_eq!(spy.count(), 1);
    Ok(())
}

#[test]
fn test_delegated_handler_gets_matched_element() -> anyhow::Result<()> {
    let f = Fixture::new();
    let spy = Spy::new();
    f.wrap(f.one).on("click", Some(".two"), &spy.handler())?;

    f.click(f.three);
    assert_eq!(spy.calls(), vec![(node(f.two), node(f.three))]);

    // The listener element itself does not match `.two`
    f.click(f.one);
    assert_eq!(spy.count(), 1);
    Ok(())
}

#[test]
fn test_delegation_includes_listener_element() -> anyhow::Result<()> {
    let f = Fixture::new();
    let spy = Spy::new();
    f.wrap(f.two).on("click", Some(".two"), &spy.handler())?;

    f.click(f.three);
    assert_eq!(spy.calls(), vec![(node(f.two), node(f.three))]);
    Ok(())
}

#[test]
fn test_delegation_contexts() -> anyhow::Result<()> {
    let f = Fixture::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let record = Rc::clone(&seen);
    let handler = Handler::new(move |ctx: &mut EventContext, _: EventTarget| {
        record
            .borrow_mut()
            .push((ctx.current_target(), ctx.delegate_target(), ctx.event_type().to_string()));
    });
    f.wrap(f.one).on("click.ns", Some(".three"), &handler)?;

    f.click(f.three);
    assert_eq!(*seen.borrow(), vec![(node(f.three), node(f.one), "click".to_string())]);
    Ok(())
}

#[test]
fn test_handler_order() -> anyhow::Result<()> {
    let f = Fixture::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let one = f.wrap(f.one);
    one.on("click", None, &logger(&log, "direct"))?;
    one.on("click", Some(".two"), &logger(&log, "two"))?;
    one.on("click", Some(".three"), &logger(&log, "three"))?;
    one.on("click", Some(".one"), &logger(&log, "self"))?;
    f.wrap(f.el).on("click", None, &logger(&log, "outer"))?;

    f.click(f.three);
    assert_eq!(*log.borrow(), vec!["three", "two", "self", "direct", "outer"]);
    Ok(())
}

#[test]
fn test_multiple_event_types() -> anyhow::Result<()> {
    let f = Fixture::new();
    let spy = Spy::new();
    f.wrap(f.one).on("click mouseup", None, &spy.handler())?;

    f.native.trigger(f.three, "click");
    f.native.trigger(f.three, "mouseup");
    f.native.trigger(f.three, "mousedown");
    assert_eq!(spy.count(), 2);
    Ok(())
}

#[test]
fn test_stop_propagation_direct() -> anyhow::Result<()> {
    let f = Fixture::new();
    let outer = Spy::new();
    let sibling = Spy::new();
    f.wrap(f.el).on("click", None, &outer.handler())?;
    f.wrap(f.one).on("click", None, &outer.handler())?;

    let two = f.wrap(f.two);
    two.on("click", None, &Handler::new(|ctx: &mut EventContext, _: EventTarget| ctx.stop_propagation()))?;
    two.on("click", None, &sibling.handler())?;

    let event = f.click(f.three);
    assert!(event.is_propagation_stopped());
    assert!(!event.is_default_prevented());
    assert_eq!(sibling.count(), 1);
    assert_eq!(outer.count(), 0);
    Ok(())
}

#[test]
fn test_stop_propagation_delegated() -> anyhow::Result<()> {
    let f = Fixture::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let one = f.wrap(f.one);
    let stopper = Rc::clone(&log);
    one.on(
        "click",
        Some(".three"),
        &Handler::new(move |ctx: &mut EventContext, _: EventTarget| {
            stopper.borrow_mut().push("three");
            ctx.stop_propagation();
        }),
    )?;
    one.on("click", Some(".three"), &logger(&log, "three-sibling"))?;
    one.on("click", Some(".two"), &logger(&log, "two"))?;
    one.on("click", None, &logger(&log, "direct"))?;
    f.wrap(f.el).on("click", None, &logger(&log, "outer"))?;

    f.click(f.three);
    assert_eq!(*log.borrow(), vec!["three", "three-sibling"]);
    Ok(())
}

#[test]
fn test_stop_immediate_propagation() -> anyhow::Result<()> {
    let f = Fixture::new();
    let later = Spy::new();
    let one = f.wrap(f.one);
    one.on(
        "click",
        None,
        &Handler::new(|ctx: &mut EventContext, _: EventTarget| ctx.stop_immediate_propagation()),
    )?;
    one.on("click", None, &later.handler())?;

    let event = f.click(f.three);
    assert!(event.is_propagation_stopped());
    assert_eq!(later.count(), 0);
    Ok(())
}

#[test]
fn test_prevent_default() -> anyhow::Result<()> {
    let f = Fixture::new();
    let outer = Spy::new();
    f.wrap(f.el).on("click", None, &outer.handler())?;
    f.wrap(f.one).on(
        "click",
        Some(".two"),
        &Handler::new(|ctx: &mut EventContext, _: EventTarget| ctx.prevent_default()),
    )?;

    let event = f.click(f.three);
    assert!(event.is_default_prevented());
    assert!(!event.is_propagation_stopped());
    assert_eq!(outer.count(), 1);
    Ok(())
}

#[test]
fn test_return_false_direct() -> anyhow::Result<()> {
    let f = Fixture::new();
    let outer = Spy::new();
    f.wrap(f.el).on("click", None, &outer.handler())?;
    f.wrap(f.one).on("click", None, &Handler::new(|_: &mut EventContext, _: EventTarget| false))?;

    let event = f.click(f.three);
    assert!(event.is_default_prevented());
    assert!(event.is_propagation_stopped());
    assert_eq!(outer.count(), 0);
    Ok(())
}

#[test]
fn test_return_false_delegated() -> anyhow::Result<()> {
    let f = Fixture::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let one = f.wrap(f.one);
    one.on("click", Some(".two"), &Handler::new(|_: &mut EventContext, _: EventTarget| Outcome::Halt))?;
    one.on("click", None, &logger(&log, "direct"))?;
    f.wrap(f.el).on("click", None, &logger(&log, "outer"))?;

    let event = f.click(f.three);
    assert!(event.is_default_prevented());
    assert!(log.borrow().is_empty());
    Ok(())
}

#[test]
fn test_return_true_continues() -> anyhow::Result<()> {
    let f = Fixture::new();
    let outer = Spy::new();
    f.wrap(f.el).on("click", None, &outer.handler())?;
    f.wrap(f.one).on("click", None, &Handler::new(|_: &mut EventContext, _: EventTarget| true))?;

    let event = f.click(f.three);
    assert!(!event.is_default_prevented());
    assert_eq!(outer.count(), 1);
    Ok(())
}

#[test]
fn test_namespace_unbinding() -> anyhow::Result<()> {
    let f = Fixture::new();
    let (a, b, c) = (Spy::new(), Spy::new(), Spy::new());
    let one = f.wrap(f.one);
    one.on("click.ns", None, &a.handler())?;
    one.on("click.ns", Some(".two"), &b.handler())?;
    one.on("click.ns2", None, &c.handler())?;

    one.off(Some(".ns"), None, None);
    f.click(f.three);
    assert_eq!((a.count(), b.count(), c.count()), (0, 0, 1));
    Ok(())
}

#[test]
fn test_multiple_namespaces() -> anyhow::Result<()> {
    let f = Fixture::new();
    let spy = Spy::new();
    let one = f.wrap(f.one);
    one.on("click.a.b", None, &spy.handler())?;

    one.off(Some(".a.c"), None, None);
    f.click(f.one);
    assert_eq!(spy.count(), 1);

    one.off(Some("click.b"), None, None);
    f.click(f.one);
    assert_eq!(spy.count(), 1);
    Ok(())
}

#[test]
fn test_type_unbinding_ignores_namespace() -> anyhow::Result<()> {
    let f = Fixture::new();
    let (clicks, ups) = (Spy::new(), Spy::new());
    let one = f.wrap(f.one);
    one.on("click", None, &clicks.handler())?;
    one.on("click.ns", Some(".two"), &clicks.handler())?;
    one.on("mouseup", None, &ups.handler())?;

    one.off(Some("click"), None, None);
    f.native.trigger(f.three, "click");
    f.native.trigger(f.three, "mouseup");
    assert_eq!((clicks.count(), ups.count()), (0, 1));
    Ok(())
}

#[test]
fn test_callback_unbinding() -> anyhow::Result<()> {
    let f = Fixture::new();
    let (spy, other) = (Spy::new(), Spy::new());
    let handler = spy.handler();
    let one = f.wrap(f.one);
    one.on("click.ns mouseup", None, &handler)?;
    one.on("click", Some(".two"), &handler)?;
    one.on("click", None, &other.handler())?;

    one.off(None, None, Some(&handler));
    f.native.trigger(f.three, "click");
    f.native.trigger(f.three, "mouseup");
    assert_eq!((spy.count(), other.count()), (0, 1));
    Ok(())
}

#[test]
fn test_selector_unbinding() -> anyhow::Result<()> {
    let f = Fixture::new();
    let (two, three) = (Spy::new(), Spy::new());
    let one = f.wrap(f.one);
    one.on("click", Some(".two"), &two.handler())?;
    one.on("click", Some(".three"), &three.handler())?;

    one.off(Some("click"), Some(".three"), None);
    f.click(f.three);
    assert_eq!((two.count(), three.count()), (1, 0));
    Ok(())
}

#[test]
fn test_padded_selector_unbinding() -> anyhow::Result<()> {
    let f = Fixture::new();
    let spy = Spy::new();
    let handler = spy.handler();
    let one = f.wrap(f.one);
    one.delegate(" .two", "click", &handler)?;
    one.delegate(".three ", "click", &handler)?;

    one.undelegate(" .two", Some("click"), Some(&handler));
    one.undelegate(".three", Some("click"), Some(&handler));
    f.click(f.three);
    assert_eq!(spy.count(), 0);
    assert_eq!(f.native.registration_count(f.one), 0);
    Ok(())
}

#[test]
fn test_one_native_listener_per_type() -> anyhow::Result<()> {
    let f = Fixture::new();
    let window = f.native.window();
    let one = f.wrap(f.one);
    let (a, b) = (Spy::new().handler(), Spy::new().handler());
    one.on("click.x", None, &a)?;
    one.on("click", Some(".two"), &b)?;
    one.on("click.y", None, &b)?;
    assert_eq!(window.listener_count(node(f.one), "click"), 1);
    assert_eq!(f.native.registration_count(f.one), 3);

    one.off(Some(".x"), None, None);
    assert_eq!(window.listener_count(node(f.one), "click"), 1);

    one.off(Some("click"), None, None);
    assert_eq!(window.listener_count(node(f.one), "click"), 0);
    assert_eq!(f.native.registration_count(f.one), 0);
    Ok(())
}

#[test]
fn test_duplicate_registration_is_ignored() -> anyhow::Result<()> {
    let f = Fixture::new();
    let spy = Spy::new();
    let handler = spy.handler();
    let one = f.wrap(f.one);
    one.on("click", None, &handler)?;
    one.on("click.ns", None, &handler)?;

    f.click(f.one);
    assert_eq!(spy.count(), 1);
    assert_eq!(f.native.registration_count(f.one), 1);
    Ok(())
}

#[test]
fn test_unbinding_unknown_handler_is_noop() {
    let f = Fixture::new();
    let one = f.wrap(f.one);
    one.off(Some("click.nothing"), Some(".missing"), Some(&Spy::new().handler()));
    f.native.select(Selection::Empty).unwrap().off(None, None, None);
    assert_eq!(f.native.registration_count(f.one), 0);
}

#[test]
fn test_namespace_only_on_is_ignored() -> anyhow::Result<()> {
    let f = Fixture::new();
    f.wrap(f.one).on(".ns", None, &Spy::new().handler())?;
    assert_eq!(f.native.registration_count(f.one), 0);
    Ok(())
}

#[test]
fn test_invalid_selector_is_an_error() {
    let f = Fixture::new();
    let wrapped = f.wrap(f.one);
    let result = wrapped.on("click", Some("div,,p"), &Spy::new().handler());
    assert!(result.is_err());
    assert_eq!(f.native.registration_count(f.one), 0);
}

#[test]
fn test_unbinding_during_dispatch_uses_snapshot() -> anyhow::Result<()> {
    let f = Fixture::new();
    let later = Spy::new();
    let later_handler = later.handler();
    let one = f.wrap(f.one);

    let (target, victim) = (one.clone(), later_handler.clone());
    one.on(
        "click",
        None,
        &Handler::new(move |_: &mut EventContext, _: EventTarget| {
            target.off(Some("click"), None, Some(&victim));
        }),
    )?;
    one.on("click", None, &later_handler)?;

    f.click(f.one);
    assert_eq!(later.count(), 1);
    f.click(f.one);
    assert_eq!(later.count(), 1);
    Ok(())
}

#[test]
fn test_nested_dispatch() -> anyhow::Result<()> {
    let f = Fixture::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let native = f.native.clone();
    let (three, outer_log) = (f.three, Rc::clone(&log));
    f.wrap(f.one).on(
        "click",
        None,
        &Handler::new(move |_: &mut EventContext, _: EventTarget| {
            outer_log.borrow_mut().push("click:start");
            native.trigger(three, "focus");
            outer_log.borrow_mut().push("click:end");
        }),
    )?;
    f.wrap(f.two).on("focus", None, &logger(&log, "focus"))?;

    f.click(f.one);
    assert_eq!(*log.borrow(), vec!["click:start", "focus", "click:end"]);
    Ok(())
}

#[test]
fn test_failing_handler_does_not_stop_dispatch() -> anyhow::Result<()> {
    let f = Fixture::new();
    let after = Spy::new();
    let one = f.wrap(f.one);
    one.on(
        "click",
        None,
        &Handler::new(|_: &mut EventContext, _: EventTarget| Err::<(), _>("boom".to_string())),
    )?;
    one.on("click", None, &after.handler())?;

    f.click(f.three);
    assert_eq!(after.count(), 1);

    let failures = f.native.take_handler_failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].event_type, "click");
    assert_eq!(failures[0].element, node(f.one));
    assert_eq!(failures[0].message, "boom");
    assert!(f.native.take_handler_failures().is_empty());
    Ok(())
}

#[test]
fn test_bind_and_unbind() -> anyhow::Result<()> {
    let f = Fixture::new();
    let spy = Spy::new();
    let handler = spy.handler();
    let one = f.wrap(f.one);
    one.bind("click", &handler)?;
    f.click(f.three);
    assert_eq!(spy.calls(), vec![(node(f.one), node(f.three))]);

    one.unbind(Some("click"), Some(&handler));
    f.click(f.three);
    assert_eq!(spy.count(), 1);
    Ok(())
}

#[test]
fn test_delegate_and_undelegate() -> anyhow::Result<()> {
    let f = Fixture::new();
    let spy = Spy::new();
    let handler = spy.handler();
    let one = f.wrap(f.one);
    one.delegate(".two", "click", &handler)?;
    f.click(f.three);
    assert_eq!(spy.calls(), vec![(node(f.two), node(f.three))]);

    one.undelegate(".two", Some("click"), Some(&handler));
    f.click(f.three);
    assert_eq!(spy.count(), 1);
    Ok(())
}

#[test]
fn test_collection_binds_every_element() -> anyhow::Result<()> {
    let f = Fixture::new();
    let spy = Spy::new();
    let both = f.native.select(vec![f.one, f.two])?;
    both.on("click", None, &spy.handler())?;

    f.click(f.three);
    assert_eq!(
        spy.calls(),
        vec![(node(f.two), node(f.three)), (node(f.one), node(f.three))]
    );
    Ok(())
}

#[test]
fn test_window_events() -> anyhow::Result<()> {
    let f = Fixture::new();
    let spy = Spy::new();
    let window = f.native.select(Selection::Window)?;
    window.on("popstate", None, &spy.handler())?;

    let event = f.native.trigger(EventTarget::Window, "popstate");
    assert!(!event.bubbles);
    assert_eq!(spy.calls(), vec![(EventTarget::Window, EventTarget::Window)]);

    window.off(Some("popstate"), None, None);
    f.native.trigger(EventTarget::Window, "popstate");
    assert_eq!(spy.count(), 1);
    assert_eq!(f.native.window().listeners_on(EventTarget::Window), 0);
    Ok(())
}

#[test]
fn test_clicks_bubble_to_window() -> anyhow::Result<()> {
    let f = Fixture::new();
    let spy = Spy::new();
    f.native.select(EventTarget::Window)?.on("click", Some(".two"), &spy.handler())?;

    f.click(f.three);
    assert_eq!(spy.calls(), vec![(node(f.two), node(f.three))]);
    Ok(())
}

#[test]
fn test_collection_trigger() -> anyhow::Result<()> {
    let f = Fixture::new();
    let spy = Spy::new();
    let both = f.native.select(vec![f.one, f.three])?;
    f.wrap(f.el).on("click", None, &spy.handler())?;

    let events = both.trigger("click");
    assert_eq!(events.len(), 2);
    assert_eq!(
        spy.calls(),
        vec![(node(f.el), node(f.one)), (node(f.el), node(f.three))]
    );
    Ok(())
}
