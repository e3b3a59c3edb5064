//! The local iterative layout driver.
//!
//! The host calls [`ForceLayout::tick`] from its animation scheduler. Each tick drains pending
//! manipulation events, steps the simulation once and measures progress as the maximum of three
//! budget estimators (decay schedule, iteration budget, wall-clock budget): whichever budget runs
//! out first ends the run.

use crate::options::ForceLayoutOptions;
use crate::simulation::{Body, Force, Link, Simulation};
use drift_core::{
    BoundingBox, Callbacks, Clock, Error, GraphView, LayoutEvent, LayoutEventKind, LayoutSession,
    Lifecycle, NodeId, Point, Result, ScratchTable, SessionClock, SessionState, Subscription,
    SystemClock, ViewEvent, XorShift64Star,
};
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;

pub const LAYOUT_NAME: &str = "force";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// The run continues; carries the progress after this tick.
    Continue(f64),
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    Exhausted,
    Stopped,
    ViewDestroyed,
}

type ForceFactory = Box<dyn Fn() -> Box<dyn Force>>;

struct Session {
    options: ForceLayoutOptions,
    sim: Simulation,
    ids: Vec<NodeId>,
    index: FxHashMap<NodeId, usize>,
    members: BTreeSet<NodeId>,
    scratch: ScratchTable,
    budget: SessionClock,
    steps_to_converge: Option<u64>,
    subscription: Subscription,
    ready_emitted: bool,
}

impl Session {
    fn progress(&self, now: std::time::Duration) -> f64 {
        let steps = self.budget.iterations as f64;
        let by_schedule = self
            .steps_to_converge
            .map(|n| steps / n as f64)
            .unwrap_or(0.0);
        let by_iterations = match self.options.max_iterations {
            0 => 0.0,
            max => steps / max as f64,
        };
        let by_time = match self.options.max_simulation_time {
            0 => 0.0,
            max => self.budget.elapsed(now).as_secs_f64() * 1000.0 / max as f64,
        };
        by_schedule.max(by_iterations).max(by_time).clamp(0.0, 1.0)
    }

    fn write_positions(&mut self, view: &mut dyn GraphView) {
        for (i, id) in self.ids.iter().enumerate() {
            let p = self.sim.bodies()[i].position();
            self.scratch.record_position(id, p);
            view.set_position(id, p);
        }
    }

    /// Adds `reheatFraction` of the configured alpha span to the current alpha, capped at the
    /// starting alpha.
    fn reheat(&mut self) {
        let o = &self.options;
        let nudge = (o.alpha - o.alpha_target) * o.reheat_fraction;
        let alpha = (self.sim.alpha() + nudge).min(o.alpha.max(self.sim.alpha()));
        self.sim.set_alpha(alpha);
    }

    fn sync_pin(&mut self, id: &NodeId) {
        if let Some(&i) = self.index.get(id) {
            self.sim.pin(i, self.scratch.pinned(id));
        }
    }
}

/// In-process force-directed layout with live interactive override.
pub struct ForceLayout {
    options: ForceLayoutOptions,
    callbacks: Callbacks,
    clock: Box<dyn Clock>,
    extra_forces: Vec<(String, ForceFactory)>,
    lifecycle: Lifecycle,
    session: Option<Session>,
}

impl ForceLayout {
    pub fn new(options: ForceLayoutOptions) -> Self {
        Self {
            options,
            callbacks: Callbacks::default(),
            clock: Box::new(SystemClock::new()),
            extra_forces: Vec::new(),
            lifecycle: Lifecycle::new(),
            session: None,
        }
    }

    pub fn with_callbacks(mut self, callbacks: Callbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Adds a custom force, built fresh for every run and installed after the stock forces.
    pub fn with_force(
        mut self,
        name: impl Into<String>,
        factory: impl Fn() -> Box<dyn Force> + 'static,
    ) -> Self {
        self.extra_forces.push((name.into(), Box::new(factory)));
        self
    }

    pub fn options(&self) -> &ForceLayoutOptions {
        &self.options
    }

    /// Options for the next run. A running session keeps the snapshot it started with.
    pub fn options_mut(&mut self) -> &mut ForceLayoutOptions {
        &mut self.options
    }

    pub fn callbacks_mut(&mut self) -> &mut Callbacks {
        &mut self.callbacks
    }

    pub fn progress(&self) -> f64 {
        self.session.as_ref().map_or(0.0, |s| s.budget.progress)
    }

    pub fn iterations(&self) -> u64 {
        self.session.as_ref().map_or(0, |s| s.budget.iterations)
    }

    pub fn alpha(&self) -> Option<f64> {
        self.session.as_ref().map(|s| s.sim.alpha())
    }

    /// Current simulated position of a session node.
    pub fn position_of(&self, id: &NodeId) -> Option<Point> {
        let s = self.session.as_ref()?;
        let &i = s.index.get(id)?;
        Some(s.sim.bodies()[i].position())
    }

    pub fn pinned(&self, id: &NodeId) -> Option<Point> {
        self.session.as_ref()?.scratch.pinned(id)
    }

    /// Starts a run over every node of the view, stopping any run already in progress.
    ///
    /// Configuration problems are reported here, before the first step; `layoutstart` and
    /// `layoutstop` are still both emitted.
    pub fn run(&mut self, view: &mut dyn GraphView) -> Result<()> {
        if self.lifecycle.is_active() {
            tracing::debug!(layout = LAYOUT_NAME, "run() while active; stopping prior session");
            self.stop(view);
        }
        let generation = self.lifecycle.begin()?;
        view.emit(LayoutEvent::new(LayoutEventKind::Start, LAYOUT_NAME));

        match self.start_session(view) {
            Ok(session) => {
                tracing::debug!(
                    layout = LAYOUT_NAME,
                    generation,
                    nodes = session.ids.len(),
                    steps_to_converge = ?session.steps_to_converge,
                    "layout session started"
                );
                self.session = Some(session);
                self.lifecycle.mark_running()
            }
            Err(err) => {
                tracing::warn!(layout = LAYOUT_NAME, error = %err, "layout rejected");
                self.callbacks.error(&err);
                self.lifecycle.terminate();
                view.emit(LayoutEvent::new(LayoutEventKind::Stop, LAYOUT_NAME));
                self.callbacks.stop();
                Err(err)
            }
        }
    }

    /// Runs a bounded layout to the end without yielding to the host.
    pub fn run_to_completion(&mut self, view: &mut dyn GraphView) -> Result<()> {
        if !self.options.is_bounded() {
            return Err(Error::config(
                "layout has no budget that ends it (infinite, or a schedule that never cools); \
                 drive it with tick() and stop() instead",
            ));
        }
        self.run(view)?;
        while let TickOutcome::Continue(_) = self.tick(view) {}
        Ok(())
    }

    fn start_session(&mut self, view: &mut dyn GraphView) -> Result<Session> {
        let options = self.options.clone();
        options.validate()?;
        let bbox = BoundingBox::resolve(options.common.bounding_box.as_ref(), view.viewport())?;
        let snapshot = view.snapshot();
        snapshot.validate()?;

        let mut rng = XorShift64Star::new(options.common.random_seed);
        let mut scratch = ScratchTable::new();
        let mut ids = Vec::with_capacity(snapshot.nodes.len());
        let mut index = FxHashMap::default();
        let mut bodies = Vec::with_capacity(snapshot.nodes.len());
        for (i, n) in snapshot.nodes.iter().enumerate() {
            let start = if options.common.randomize && !n.locked {
                bbox.random_point(&mut rng)
            } else {
                n.position
            };
            let mut body = Body::at(start);
            body.radius = n.width.max(n.height) / 2.0;
            scratch.record_position(&n.id, start);
            if n.locked {
                body.pin(Some(start));
                scratch.pin(&n.id, start);
            }
            bodies.push(body);
            ids.push(n.id.clone());
            index.insert(n.id.clone(), i);
        }
        let links: Vec<Link> = snapshot
            .edges
            .iter()
            .filter_map(|e| {
                Some(Link {
                    source: *index.get(&e.source)?,
                    target: *index.get(&e.target)?,
                })
            })
            .collect();

        let params = options.simulation_params();
        let mut sim = Simulation::new(params, rng.next_u64());
        options.forces.install(&mut sim, &bbox);
        for (name, factory) in &self.extra_forces {
            sim.set_force(name.clone(), factory());
        }
        sim.initialize(bodies, links);

        if options.ungrabify_while_simulating {
            for n in &snapshot.nodes {
                scratch.remember_grabbable(&n.id, n.grabbable);
                view.set_grabbable(&n.id, false);
            }
        }

        let members: BTreeSet<NodeId> = ids.iter().cloned().collect();
        let subscription = Subscription::subscribe(view, Some(members.clone()));

        Ok(Session {
            steps_to_converge: params.steps_to_converge(),
            options,
            sim,
            ids,
            index,
            members,
            scratch,
            budget: SessionClock::starting_at(self.clock.now()),
            subscription,
            ready_emitted: false,
        })
    }

    /// Advances the run by one simulation step. Call once per host frame.
    pub fn tick(&mut self, view: &mut dyn GraphView) -> TickOutcome {
        if self.lifecycle.state() != SessionState::Running {
            return TickOutcome::Finished;
        }
        self.pump(view);
        if self.lifecycle.state() != SessionState::Running {
            return TickOutcome::Finished;
        }
        let now = self.clock.now();
        let Some(session) = self.session.as_mut() else {
            return TickOutcome::Finished;
        };

        session.sim.step();
        session.budget.iterations += 1;
        let progress = session.progress(now);
        session.budget.progress = progress;
        tracing::trace!(
            layout = LAYOUT_NAME,
            iteration = session.budget.iterations,
            progress,
            alpha = session.sim.alpha(),
            "tick"
        );

        if progress >= 1.0 && !session.options.infinite {
            self.finalize(view, Exit::Exhausted);
            return TickOutcome::Finished;
        }

        self.callbacks.tick(progress);
        if session.options.common.animate {
            session.write_positions(view);
            if !session.ready_emitted {
                session.ready_emitted = true;
                view.emit(LayoutEvent::new(LayoutEventKind::Ready, LAYOUT_NAME));
                self.callbacks.ready();
            }
        }
        TickOutcome::Continue(progress)
    }

    /// Handles manipulation events queued since the last call. [`ForceLayout::tick`] does this
    /// on its own; hosts call it directly to react between frames (e.g. to view teardown).
    pub fn pump(&mut self, view: &mut dyn GraphView) {
        let now = self.clock.now();
        let events = match self.session.as_ref() {
            Some(s) => s.subscription.drain(),
            None => return,
        };
        for event in events {
            if event == ViewEvent::Destroy {
                tracing::debug!(layout = LAYOUT_NAME, "view destroyed mid-run");
                self.finalize(view, Exit::ViewDestroyed);
                return;
            }
            let Some(session) = self.session.as_mut() else {
                return;
            };
            if !session.options.common.animate {
                continue;
            }
            let Some(id) = event.target().cloned() else {
                continue;
            };
            if !session.members.contains(&id) {
                continue;
            }
            let live = view.node(&id);
            let live_position = live
                .as_ref()
                .map(|n| n.position)
                .or_else(|| session.scratch.get(&id).map(|r| r.position))
                .unwrap_or_default();
            match event {
                ViewEvent::Grab(_) => {
                    session.budget.restart(now);
                    session.scratch.pin(&id, live_position);
                    session.reheat();
                }
                ViewEvent::Free(_) | ViewEvent::Unlock(_) => {
                    let still_locked = live.as_ref().is_some_and(|n| n.locked);
                    if session.options.fixed_after_dragging || still_locked {
                        session.scratch.pin(&id, live_position);
                    } else {
                        session.scratch.record_position(&id, live_position);
                        session.scratch.unpin(&id);
                    }
                    session.budget.restart(now);
                    session.reheat();
                }
                ViewEvent::Drag(_) | ViewEvent::Lock(_) => {
                    session.scratch.pin(&id, live_position);
                }
                ViewEvent::Destroy => {}
            }
            session.sync_pin(&id);
            tracing::trace!(layout = LAYOUT_NAME, ?event, "handled view event");
        }
    }

    fn finalize(&mut self, view: &mut dyn GraphView, exit: Exit) {
        if !self.lifecycle.terminate() {
            return;
        }
        let Some(mut session) = self.session.take() else {
            return;
        };
        let view_alive = exit != Exit::ViewDestroyed;
        if view_alive {
            session.write_positions(view);
        }
        for (id, grabbable) in session.scratch.take_grabbable_restores() {
            view.set_grabbable(&id, grabbable);
        }
        session.subscription.cancel(view);
        if view_alive {
            if session.options.common.fit {
                view.fit(session.options.common.padding);
            }
            if !session.ready_emitted {
                view.emit(LayoutEvent::new(LayoutEventKind::Ready, LAYOUT_NAME));
                self.callbacks.ready();
            }
        }
        view.emit(LayoutEvent::new(LayoutEventKind::Stop, LAYOUT_NAME));
        self.callbacks.stop();
        tracing::debug!(
            layout = LAYOUT_NAME,
            ?exit,
            iterations = session.budget.iterations,
            progress = session.budget.progress,
            "layout session finished"
        );
        // Keep the final state readable until the next run.
        self.session = Some(session);
    }
}

impl LayoutSession for ForceLayout {
    fn name(&self) -> &str {
        LAYOUT_NAME
    }

    fn state(&self) -> SessionState {
        self.lifecycle.state()
    }

    fn stop(&mut self, view: &mut dyn GraphView) {
        if self.lifecycle.is_active() {
            self.finalize(view, Exit::Stopped);
        }
    }
}
