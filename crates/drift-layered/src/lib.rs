#![forbid(unsafe_code)]

//! Layered layout for drift.
//!
//! A [`HierarchicalSolver`] turns a node/edge graph into coordinates in one call; the
//! [`LayeredLayout`] driver wraps it in the usual session lifecycle.

pub mod acyclic;
pub mod driver;
pub mod graph;
pub mod options;
pub mod order;
pub mod rank;
pub mod solver;

pub use driver::{LAYOUT_NAME, LayeredLayout};
pub use graph::{LayeredGraph, LayeredNode};
pub use options::{Direction, LayeredLayoutOptions, Spacing};
pub use solver::{HierarchicalSolver, LongestPathSolver};
