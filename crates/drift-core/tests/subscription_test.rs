use drift_core::{GraphView, MemoryView, NodeId, Point, Size, Subscription, ViewEvent};
use std::collections::BTreeSet;

fn view() -> MemoryView {
    MemoryView::new(Size::new(100.0, 100.0))
        .with_node("a", 0.0, 0.0)
        .with_node("b", 10.0, 0.0)
}

#[test]
fn scoped_subscription_only_sees_its_nodes() {
    let mut view = view();
    let scope: BTreeSet<NodeId> = [NodeId::from("a")].into_iter().collect();
    let sub = Subscription::subscribe(&mut view, Some(scope));

    view.grab("a");
    view.grab("b");
    view.drag("a", Point::new(3.0, 4.0));
    view.free("a");

    assert_eq!(
        sub.drain(),
        vec![
            ViewEvent::Grab(NodeId::from("a")),
            ViewEvent::Drag(NodeId::from("a")),
            ViewEvent::Free(NodeId::from("a")),
        ]
    );
    assert!(sub.drain().is_empty());
}

#[test]
fn destroy_reaches_every_listener() {
    let mut view = view();
    let scope: BTreeSet<NodeId> = [NodeId::from("a")].into_iter().collect();
    let scoped = Subscription::subscribe(&mut view, Some(scope));
    let global = Subscription::subscribe(&mut view, None);

    view.destroy();

    assert_eq!(scoped.drain(), vec![ViewEvent::Destroy]);
    assert_eq!(global.drain(), vec![ViewEvent::Destroy]);
}

#[test]
fn cancel_unregisters_exactly_once() {
    let mut view = view();
    let mut sub = Subscription::subscribe(&mut view, None);
    assert_eq!(view.listener_count(), 1);

    assert!(sub.cancel(&mut view));
    assert!(!sub.cancel(&mut view));
    assert!(!sub.is_active());
    assert_eq!(view.listener_count(), 0);

    view.grab("a");
    assert!(sub.drain().is_empty());
}

#[test]
fn ungrabbable_nodes_cannot_be_grabbed() {
    let mut view = view();
    let sub = Subscription::subscribe(&mut view, None);
    view.set_grabbable(&NodeId::from("a"), false);

    assert!(!view.grab("a"));
    assert!(sub.drain().is_empty());
}
