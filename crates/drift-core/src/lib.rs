#![forbid(unsafe_code)]

//! Shared layout-session machinery for drift layout drivers.
//!
//! Drivers (`drift-force`, `drift-remote`, `drift-layered`) read and write node positions only
//! through a [`GraphView`] and all follow the same [`LayoutSession`] lifecycle:
//! `Idle -> Starting -> Running -> Terminated`.

pub mod error;
pub mod geom;
pub mod graph;
pub mod memory;
pub mod options;
pub mod rng;
pub mod scratch;
pub mod session;
pub mod view;

pub use error::{Error, ErrorKind, Result};
pub use geom::{BoundingBox, BoundingBoxSpec, Point, Size};
pub use graph::{EdgeId, EdgeSnapshot, GraphSnapshot, NodeId, NodeSnapshot};
pub use memory::MemoryView;
pub use options::{Callbacks, CommonOptions};
pub use rng::XorShift64Star;
pub use scratch::{PositionRecord, ScratchTable};
pub use session::{
    Clock, LayoutSession, Lifecycle, ManualClock, SessionClock, SessionState, SystemClock,
};
pub use view::{
    GraphView, LayoutEvent, LayoutEventKind, Listener, ListenerId, Subscription, ViewEvent,
};
