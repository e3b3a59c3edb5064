//! Headless in-memory [`GraphView`].
//!
//! Used by the CLI and by tests. Besides holding the graph it keeps a log of what drivers did to
//! it (position writes, lifecycle events, fits) and can simulate user manipulation.

use crate::geom::{Point, Size};
use crate::graph::{EdgeSnapshot, NodeId, NodeSnapshot};
use crate::view::{GraphView, LayoutEvent, LayoutEventKind, Listener, ListenerId, ViewEvent};
use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Default)]
pub struct MemoryView {
    nodes: IndexMap<NodeId, NodeSnapshot>,
    edges: Vec<EdgeSnapshot>,
    viewport: Size,
    listeners: BTreeMap<ListenerId, Listener>,
    next_listener: u64,
    events: Vec<LayoutEvent>,
    writes: Vec<(NodeId, Point)>,
    animations: Vec<Duration>,
    fits: Vec<f64>,
    destroyed: bool,
}

impl MemoryView {
    pub fn new(viewport: Size) -> Self {
        Self {
            viewport,
            ..Default::default()
        }
    }

    pub fn add_node(&mut self, node: NodeSnapshot) {
        self.nodes.insert(node.id.clone(), node);
    }

    pub fn with_node(mut self, id: &str, x: f64, y: f64) -> Self {
        self.add_node(NodeSnapshot::new(id, Point::new(x, y)));
        self
    }

    pub fn add_edge(&mut self, edge: EdgeSnapshot) {
        self.edges.push(edge);
    }

    pub fn with_edge(mut self, source: &str, target: &str) -> Self {
        let id = format!("{source}->{target}");
        self.add_edge(EdgeSnapshot::new(id.as_str(), source, target));
        self
    }

    pub fn remove_node(&mut self, id: &NodeId) -> Option<NodeSnapshot> {
        self.edges.retain(|e| &e.source != id && &e.target != id);
        self.nodes.shift_remove(id)
    }

    pub fn position(&self, id: &str) -> Option<Point> {
        self.nodes.get(id).map(|n| n.position)
    }

    pub fn positions(&self) -> BTreeMap<NodeId, Point> {
        self.nodes
            .iter()
            .map(|(id, n)| (id.clone(), n.position))
            .collect()
    }

    pub fn is_grabbable(&self, id: &str) -> Option<bool> {
        self.nodes.get(id).map(|n| n.grabbable)
    }

    pub fn set_locked(&mut self, id: &str, locked: bool) {
        if let Some(n) = self.nodes.get_mut(id) {
            n.locked = locked;
        }
    }

    /// Lifecycle events emitted so far, oldest first.
    pub fn events(&self) -> &[LayoutEvent] {
        &self.events
    }

    pub fn count_events(&self, kind: LayoutEventKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    /// Position writes issued through [`GraphView::set_position`], oldest first.
    pub fn writes(&self) -> &[(NodeId, Point)] {
        &self.writes
    }

    pub fn animations(&self) -> &[Duration] {
        &self.animations
    }

    pub fn fits(&self) -> &[f64] {
        &self.fits
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn clear_log(&mut self) {
        self.events.clear();
        self.writes.clear();
        self.animations.clear();
        self.fits.clear();
    }

    /// Simulates a pointer grab. Returns `false` (and dispatches nothing) for ungrabbable nodes.
    pub fn grab(&mut self, id: &str) -> bool {
        let Some(n) = self.nodes.get_mut(id) else {
            return false;
        };
        if !n.grabbable {
            return false;
        }
        n.grabbed = true;
        let id = n.id.clone();
        self.dispatch(ViewEvent::Grab(id));
        true
    }

    /// Simulates the user dragging a grabbed node to `to`.
    pub fn drag(&mut self, id: &str, to: Point) {
        let Some(n) = self.nodes.get_mut(id) else {
            return;
        };
        if !n.grabbed {
            return;
        }
        n.position = to;
        let id = n.id.clone();
        self.dispatch(ViewEvent::Drag(id));
    }

    pub fn free(&mut self, id: &str) {
        let Some(n) = self.nodes.get_mut(id) else {
            return;
        };
        if !n.grabbed {
            return;
        }
        n.grabbed = false;
        let id = n.id.clone();
        self.dispatch(ViewEvent::Free(id));
    }

    pub fn lock(&mut self, id: &str) {
        if let Some(n) = self.nodes.get_mut(id) {
            n.locked = true;
            let id = n.id.clone();
            self.dispatch(ViewEvent::Lock(id));
        }
    }

    pub fn unlock(&mut self, id: &str) {
        if let Some(n) = self.nodes.get_mut(id) {
            n.locked = false;
            let id = n.id.clone();
            self.dispatch(ViewEvent::Unlock(id));
        }
    }

    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.dispatch(ViewEvent::Destroy);
    }

    fn dispatch(&mut self, event: ViewEvent) {
        self.listeners.retain(|_, l| l.deliver(&event));
    }
}

impl GraphView for MemoryView {
    fn nodes(&self) -> Vec<NodeSnapshot> {
        self.nodes.values().cloned().collect()
    }

    fn edges(&self) -> Vec<EdgeSnapshot> {
        self.edges.clone()
    }

    fn node(&self, id: &NodeId) -> Option<NodeSnapshot> {
        self.nodes.get(id).cloned()
    }

    fn set_position(&mut self, id: &NodeId, position: Point) {
        if let Some(n) = self.nodes.get_mut(id) {
            n.position = position;
            self.writes.push((id.clone(), position));
        }
    }

    fn animate_positions(&mut self, positions: &BTreeMap<NodeId, Point>, duration: Duration) {
        self.animations.push(duration);
        for (id, p) in positions {
            self.set_position(id, *p);
        }
    }

    fn set_grabbable(&mut self, id: &NodeId, grabbable: bool) {
        if let Some(n) = self.nodes.get_mut(id) {
            n.grabbable = grabbable;
        }
    }

    fn viewport(&self) -> Size {
        self.viewport
    }

    fn fit(&mut self, padding: f64) {
        self.fits.push(padding);
    }

    fn emit(&mut self, event: LayoutEvent) {
        self.events.push(event);
    }

    fn listen(&mut self, listener: Listener) -> ListenerId {
        self.next_listener += 1;
        let id = ListenerId(self.next_listener);
        self.listeners.insert(id, listener);
        id
    }

    fn unlisten(&mut self, id: ListenerId) {
        self.listeners.remove(&id);
    }
}
