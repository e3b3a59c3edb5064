#![forbid(unsafe_code)]

//! Force-directed layout for drift: a stepped simulation kernel and the interactive local
//! driver that runs it to convergence against a [`drift_core::GraphView`].

pub mod driver;
pub mod forces;
pub mod options;
pub mod simulation;

pub use driver::{ForceLayout, LAYOUT_NAME, TickOutcome};
pub use forces::{Axis, Center, Collide, LinkForce, ManyBody, Position, Radial};
pub use options::{
    AxisOptions, CenterOptions, CollideOptions, ForceLayoutOptions, ForceOptions, LinkOptions,
    ManyBodyOptions, RadialOptions,
};
pub use simulation::{Body, Force, Link, Simulation, SimulationParams};
