//! Alpha-scheduled velocity simulation with pluggable named forces.
//!
//! Each [`Simulation::step`] cools `alpha` toward `alpha_target`, lets every force nudge body
//! velocities, then damps and integrates. Pinned bodies (`fx`/`fy`) are held in place.

use drift_core::{Point, XorShift64Star};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Body {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub fx: Option<f64>,
    pub fy: Option<f64>,
    /// Collision radius.
    pub radius: f64,
}

impl Body {
    pub fn at(p: Point) -> Self {
        Self {
            x: p.x,
            y: p.y,
            ..Default::default()
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn pin(&mut self, at: Option<Point>) {
        self.fx = at.map(|p| p.x);
        self.fy = at.map(|p| p.y);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub source: usize,
    pub target: usize,
}

/// One independently configurable contribution to body velocities.
pub trait Force {
    /// Called with the full body and link sets before the first step, and again whenever the
    /// force is installed into an already initialized simulation.
    fn initialize(&mut self, bodies: &[Body], links: &[Link]) {
        let _ = (bodies, links);
    }

    fn apply(&mut self, alpha: f64, bodies: &mut [Body], rng: &mut XorShift64Star);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParams {
    pub alpha: f64,
    pub alpha_min: f64,
    pub alpha_decay: f64,
    pub alpha_target: f64,
    pub velocity_decay: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            alpha_min: 0.001,
            alpha_decay: 1.0 - 0.001_f64.powf(1.0 / 300.0),
            alpha_target: 0.0,
            velocity_decay: 0.4,
        }
    }
}

impl SimulationParams {
    /// Number of steps the decay schedule needs to cool from `alpha` below `alpha_min`.
    ///
    /// `None` when the schedule never gets there (no decay, or a target at or above the floor).
    pub fn steps_to_converge(&self) -> Option<u64> {
        if self.alpha_decay <= 0.0 || self.alpha_target >= self.alpha_min {
            return None;
        }
        if self.alpha < self.alpha_min || self.alpha_decay >= 1.0 {
            return Some(1);
        }
        let ratio = (self.alpha_min - self.alpha_target) / (self.alpha - self.alpha_target);
        let steps = (ratio.ln() / (1.0 - self.alpha_decay).ln()).ceil();
        if !steps.is_finite() {
            return None;
        }
        Some((steps as u64).max(1))
    }
}

pub struct Simulation {
    params: SimulationParams,
    alpha: f64,
    bodies: Vec<Body>,
    links: Vec<Link>,
    forces: Vec<(String, Box<dyn Force>)>,
    rng: XorShift64Star,
    initialized: bool,
}

impl Simulation {
    pub fn new(params: SimulationParams, seed: u64) -> Self {
        Self {
            params,
            alpha: params.alpha,
            bodies: Vec::new(),
            links: Vec::new(),
            forces: Vec::new(),
            rng: XorShift64Star::new(seed),
            initialized: false,
        }
    }

    pub fn with_force(mut self, name: impl Into<String>, force: Box<dyn Force>) -> Self {
        self.set_force(name, force);
        self
    }

    /// Installs `force` under `name`, replacing any force of the same name.
    pub fn set_force(&mut self, name: impl Into<String>, mut force: Box<dyn Force>) {
        let name = name.into();
        if self.initialized {
            force.initialize(&self.bodies, &self.links);
        }
        match self.forces.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = force,
            None => self.forces.push((name, force)),
        }
    }

    pub fn remove_force(&mut self, name: &str) -> bool {
        let before = self.forces.len();
        self.forces.retain(|(n, _)| n != name);
        self.forces.len() != before
    }

    pub fn force_names(&self) -> impl Iterator<Item = &str> {
        self.forces.iter().map(|(n, _)| n.as_str())
    }

    pub fn initialize(&mut self, bodies: Vec<Body>, links: Vec<Link>) {
        self.bodies = bodies;
        self.links = links
            .into_iter()
            .filter(|l| l.source < self.bodies.len() && l.target < self.bodies.len())
            .collect();
        for (_, force) in &mut self.forces {
            force.initialize(&self.bodies, &self.links);
        }
        for b in &mut self.bodies {
            if let Some(fx) = b.fx {
                b.x = fx;
            }
            if let Some(fy) = b.fy {
                b.y = fy;
            }
        }
        self.initialized = true;
    }

    pub fn step(&mut self) {
        self.alpha += (self.params.alpha_target - self.alpha) * self.params.alpha_decay;
        for (_, force) in &mut self.forces {
            force.apply(self.alpha, &mut self.bodies, &mut self.rng);
        }
        let keep = 1.0 - self.params.velocity_decay;
        for b in &mut self.bodies {
            match b.fx {
                Some(fx) => {
                    b.x = fx;
                    b.vx = 0.0;
                }
                None => {
                    b.vx *= keep;
                    b.x += b.vx;
                }
            }
            match b.fy {
                Some(fy) => {
                    b.y = fy;
                    b.vy = 0.0;
                }
                None => {
                    b.vy *= keep;
                    b.y += b.vy;
                }
            }
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha;
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn is_cool(&self) -> bool {
        self.alpha < self.params.alpha_min
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn pin(&mut self, index: usize, at: Option<Point>) {
        if let Some(b) = self.bodies.get_mut(index) {
            b.pin(at);
            if let Some(p) = at {
                b.x = p.x;
                b.y = p.y;
            }
        }
    }
}
