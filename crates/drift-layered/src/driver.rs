use crate::graph::LayeredGraph;
use crate::options::LayeredLayoutOptions;
use crate::solver::{HierarchicalSolver, LongestPathSolver};
use drift_core::{
    BoundingBox, Callbacks, GraphView, LayoutEvent, LayoutEventKind, LayoutSession, Lifecycle,
    NodeId, Point, Result, SessionState,
};
use std::collections::{BTreeMap, BTreeSet};

pub const LAYOUT_NAME: &str = "layered";

/// Runs a [`HierarchicalSolver`] once per `run()` and applies the result.
///
/// The whole session happens inside `run()`: the solver has no stepped mode, so `stop()` only
/// matters as a no-op from the host's point of view.
pub struct LayeredLayout<S = LongestPathSolver> {
    options: LayeredLayoutOptions,
    callbacks: Callbacks,
    solver: S,
    lifecycle: Lifecycle,
    positions: BTreeMap<NodeId, Point>,
}

impl LayeredLayout<LongestPathSolver> {
    pub fn new(options: LayeredLayoutOptions) -> Self {
        Self::with_solver(options, LongestPathSolver)
    }
}

impl<S: HierarchicalSolver> LayeredLayout<S> {
    pub fn with_solver(options: LayeredLayoutOptions, solver: S) -> Self {
        Self {
            options,
            callbacks: Callbacks::default(),
            solver,
            lifecycle: Lifecycle::new(),
            positions: BTreeMap::new(),
        }
    }

    pub fn with_callbacks(mut self, callbacks: Callbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    pub fn options(&self) -> &LayeredLayoutOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut LayeredLayoutOptions {
        &mut self.options
    }

    /// Positions computed by the last successful run, in view coordinates.
    pub fn positions(&self) -> &BTreeMap<NodeId, Point> {
        &self.positions
    }

    pub fn run(&mut self, view: &mut dyn GraphView) -> Result<()> {
        if self.lifecycle.is_active() {
            self.finalize(view);
        }
        self.positions.clear();
        let generation = self.lifecycle.begin()?;
        view.emit(LayoutEvent::new(LayoutEventKind::Start, LAYOUT_NAME));
        tracing::debug!(generation, "layered layout started");

        let result = self.execute(view);
        if let Err(err) = &result {
            tracing::warn!(error = %err, "layered layout failed");
            self.callbacks.error(err);
        }
        self.finalize(view);
        result
    }

    fn execute(&mut self, view: &mut dyn GraphView) -> Result<()> {
        let options = self.options.clone();
        options.validate()?;
        let bbox = BoundingBox::resolve(options.common.bounding_box.as_ref(), view.viewport())?;
        let snapshot = view.snapshot();
        let graph = LayeredGraph::from_snapshot(&snapshot)?;
        self.lifecycle.mark_running()?;

        let solved = self.solver.solve(&graph, &options.spacing)?;
        let locked: BTreeSet<&NodeId> = snapshot
            .nodes
            .iter()
            .filter(|n| n.locked)
            .map(|n| &n.id)
            .collect();
        let positions: BTreeMap<NodeId, Point> = solved
            .into_iter()
            .filter(|(id, p)| p.is_finite() && !locked.contains(id))
            .map(|(id, p)| (id, Point::new(bbox.x1 + p.x, bbox.y1 + p.y)))
            .collect();

        if options.common.animate {
            view.animate_positions(&positions, options.animation());
        } else {
            for (id, p) in &positions {
                view.set_position(id, *p);
            }
        }
        if options.common.fit {
            view.fit(options.common.padding);
        }
        self.positions = positions;

        view.emit(LayoutEvent::new(LayoutEventKind::Ready, LAYOUT_NAME));
        self.callbacks.ready();
        Ok(())
    }

    fn finalize(&mut self, view: &mut dyn GraphView) {
        if !self.lifecycle.terminate() {
            return;
        }
        view.emit(LayoutEvent::new(LayoutEventKind::Stop, LAYOUT_NAME));
        self.callbacks.stop();
        tracing::debug!(generation = self.lifecycle.generation(), "layered layout stopped");
    }
}

impl<S: HierarchicalSolver> LayoutSession for LayeredLayout<S> {
    fn name(&self) -> &str {
        LAYOUT_NAME
    }

    fn state(&self) -> SessionState {
        self.lifecycle.state()
    }

    fn stop(&mut self, view: &mut dyn GraphView) {
        self.finalize(view);
    }
}
