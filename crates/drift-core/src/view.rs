//! The view collaborator: the only surface through which drivers observe and move nodes.
//!
//! Interaction events are delivered through an explicit listener list. A driver subscribes once
//! per session, receives events over a channel, and tears the registration down through the
//! [`Subscription`] it got back; nothing is attached to the nodes themselves.

use crate::geom::{Point, Size};
use crate::graph::{EdgeSnapshot, GraphSnapshot, NodeId, NodeSnapshot};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::mpsc;
use std::time::Duration;

/// User manipulation and lifecycle events raised by the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    /// A pointer grabbed the node.
    Grab(NodeId),
    /// The node was released after a grab.
    Free(NodeId),
    /// The node moved while grabbed.
    Drag(NodeId),
    Lock(NodeId),
    Unlock(NodeId),
    /// The view is being torn down.
    Destroy,
}

impl ViewEvent {
    pub fn target(&self) -> Option<&NodeId> {
        match self {
            Self::Grab(id)
            | Self::Free(id)
            | Self::Drag(id)
            | Self::Lock(id)
            | Self::Unlock(id) => Some(id),
            Self::Destroy => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutEventKind {
    Start,
    Ready,
    Stop,
}

impl LayoutEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "layoutstart",
            Self::Ready => "layoutready",
            Self::Stop => "layoutstop",
        }
    }
}

/// A lifecycle notification emitted by a driver onto the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutEvent {
    pub kind: LayoutEventKind,
    pub layout: String,
}

impl LayoutEvent {
    pub fn new(kind: LayoutEventKind, layout: impl Into<String>) -> Self {
        Self {
            kind,
            layout: layout.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub u64);

/// One registration in a view's listener list.
///
/// `nodes` scopes node-targeted events; view-level events (`Destroy`) reach every listener.
#[derive(Debug, Clone)]
pub struct Listener {
    nodes: Option<BTreeSet<NodeId>>,
    sender: mpsc::Sender<ViewEvent>,
}

impl Listener {
    pub fn new(nodes: Option<BTreeSet<NodeId>>, sender: mpsc::Sender<ViewEvent>) -> Self {
        Self { nodes, sender }
    }

    pub fn accepts(&self, event: &ViewEvent) -> bool {
        match (event.target(), &self.nodes) {
            (Some(id), Some(nodes)) => nodes.contains(id),
            _ => true,
        }
    }

    /// Delivers the event if the listener accepts it. Returns `false` once the receiving side is
    /// gone, so views may prune dead registrations.
    pub fn deliver(&self, event: &ViewEvent) -> bool {
        if !self.accepts(event) {
            return true;
        }
        self.sender.send(event.clone()).is_ok()
    }
}

/// The host view a layout reads from and writes to.
pub trait GraphView {
    fn nodes(&self) -> Vec<NodeSnapshot>;

    fn edges(&self) -> Vec<EdgeSnapshot>;

    fn node(&self, id: &NodeId) -> Option<NodeSnapshot> {
        self.nodes().into_iter().find(|n| &n.id == id)
    }

    fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes(),
            edges: self.edges(),
        }
    }

    fn set_position(&mut self, id: &NodeId, position: Point);

    /// Moves several nodes, optionally tweened over `duration`. Views without animation support
    /// may keep the default, which writes the final positions immediately.
    fn animate_positions(&mut self, positions: &BTreeMap<NodeId, Point>, duration: Duration) {
        let _ = duration;
        for (id, p) in positions {
            self.set_position(id, *p);
        }
    }

    fn set_grabbable(&mut self, id: &NodeId, grabbable: bool);

    fn viewport(&self) -> Size;

    /// Fits the viewport to the current content extents.
    fn fit(&mut self, padding: f64);

    fn emit(&mut self, event: LayoutEvent);

    fn listen(&mut self, listener: Listener) -> ListenerId;

    fn unlisten(&mut self, id: ListenerId);
}

/// A session's handle on its listener registration.
///
/// The registration is captured at subscribe time and released by [`Subscription::cancel`],
/// which is safe to call any number of times.
#[derive(Debug)]
pub struct Subscription {
    id: Option<ListenerId>,
    receiver: mpsc::Receiver<ViewEvent>,
}

impl Subscription {
    pub fn subscribe(view: &mut dyn GraphView, nodes: Option<BTreeSet<NodeId>>) -> Self {
        let (sender, receiver) = mpsc::channel();
        let id = view.listen(Listener::new(nodes, sender));
        tracing::trace!(listener = id.0, "subscribed to view events");
        Self {
            id: Some(id),
            receiver,
        }
    }

    pub fn is_active(&self) -> bool {
        self.id.is_some()
    }

    /// Takes every event queued since the last drain. Empty once cancelled.
    pub fn drain(&self) -> Vec<ViewEvent> {
        if self.id.is_none() {
            return Vec::new();
        }
        self.receiver.try_iter().collect()
    }

    /// Unregisters from the view. Returns `true` only for the call that actually unregistered.
    pub fn cancel(&mut self, view: &mut dyn GraphView) -> bool {
        let Some(id) = self.id.take() else {
            return false;
        };
        view.unlisten(id);
        tracing::trace!(listener = id.0, "unsubscribed from view events");
        true
    }
}
