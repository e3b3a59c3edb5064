use crate::forces::{Axis, Center, Collide, LinkForce, ManyBody, Position, Radial};
use crate::simulation::{Simulation, SimulationParams};
use drift_core::{BoundingBox, CommonOptions, Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ManyBodyOptions {
    pub strength: f64,
    pub distance_min: f64,
    pub distance_max: Option<f64>,
}

impl Default for ManyBodyOptions {
    fn default() -> Self {
        Self {
            strength: -30.0,
            distance_min: 1.0,
            distance_max: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LinkOptions {
    pub distance: f64,
    pub strength: Option<f64>,
    pub iterations: usize,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            distance: 30.0,
            strength: None,
            iterations: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CollideOptions {
    pub radius: Option<f64>,
    pub strength: f64,
    pub iterations: usize,
}

impl Default for CollideOptions {
    fn default() -> Self {
        Self {
            radius: None,
            strength: 1.0,
            iterations: 1,
        }
    }
}

/// Centering and axis targets default to the bounding box center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CenterOptions {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub strength: f64,
}

impl Default for CenterOptions {
    fn default() -> Self {
        Self {
            x: None,
            y: None,
            strength: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AxisOptions {
    pub target: Option<f64>,
    pub strength: f64,
}

impl Default for AxisOptions {
    fn default() -> Self {
        Self {
            target: None,
            strength: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RadialOptions {
    pub radius: f64,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub strength: f64,
}

impl Default for RadialOptions {
    fn default() -> Self {
        Self {
            radius: 100.0,
            x: None,
            y: None,
            strength: 0.1,
        }
    }
}

/// Which stock forces a run installs. `null` disables a force.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForceOptions {
    pub many_body: Option<ManyBodyOptions>,
    pub link: Option<LinkOptions>,
    pub center: Option<CenterOptions>,
    pub collide: Option<CollideOptions>,
    pub x: Option<AxisOptions>,
    pub y: Option<AxisOptions>,
    pub radial: Option<RadialOptions>,
}

impl Default for ForceOptions {
    fn default() -> Self {
        Self {
            many_body: Some(ManyBodyOptions::default()),
            link: Some(LinkOptions::default()),
            center: Some(CenterOptions::default()),
            collide: None,
            x: None,
            y: None,
            radial: None,
        }
    }
}

impl ForceOptions {
    fn validate(&self) -> Result<()> {
        let mut numbers: Vec<(&str, f64)> = Vec::new();
        if let Some(o) = &self.many_body {
            numbers.extend([
                ("manyBody.strength", o.strength),
                ("manyBody.distanceMin", o.distance_min),
            ]);
            if let Some(max) = o.distance_max {
                if !(max > 0.0) {
                    return Err(Error::config(format!(
                        "manyBody.distanceMax must be positive, got {max}"
                    )));
                }
            }
        }
        if let Some(o) = &self.link {
            numbers.push(("link.distance", o.distance));
            if let Some(s) = o.strength {
                numbers.push(("link.strength", s));
            }
        }
        if let Some(o) = &self.center {
            numbers.push(("center.strength", o.strength));
        }
        if let Some(o) = &self.collide {
            numbers.push(("collide.strength", o.strength));
            if let Some(r) = o.radius {
                numbers.push(("collide.radius", r));
            }
        }
        for (name, o) in [("x", &self.x), ("y", &self.y)] {
            if let Some(o) = o {
                if !o.strength.is_finite() {
                    return Err(Error::config(format!("{name}.strength must be finite")));
                }
            }
        }
        if let Some(o) = &self.radial {
            numbers.extend([("radial.radius", o.radius), ("radial.strength", o.strength)]);
        }
        for (name, v) in numbers {
            if !v.is_finite() {
                return Err(Error::config(format!("{name} must be finite, got {v}")));
            }
        }
        Ok(())
    }

    /// Installs the enabled stock forces, resolving default targets against `bbox`.
    pub fn install(&self, sim: &mut Simulation, bbox: &BoundingBox) {
        let c = bbox.center();
        if let Some(o) = &self.many_body {
            sim.set_force(
                "manyBody",
                Box::new(ManyBody {
                    strength: o.strength,
                    distance_min: o.distance_min,
                    distance_max: o.distance_max.unwrap_or(f64::INFINITY),
                }),
            );
        }
        if let Some(o) = &self.link {
            sim.set_force(
                "link",
                Box::new(LinkForce::new(o.distance, o.strength, o.iterations)),
            );
        }
        if let Some(o) = &self.collide {
            sim.set_force(
                "collide",
                Box::new(Collide {
                    radius: o.radius,
                    strength: o.strength,
                    iterations: o.iterations,
                }),
            );
        }
        if let Some(o) = &self.center {
            sim.set_force(
                "center",
                Box::new(Center {
                    x: o.x.unwrap_or(c.x),
                    y: o.y.unwrap_or(c.y),
                    strength: o.strength,
                }),
            );
        }
        if let Some(o) = &self.x {
            sim.set_force(
                "x",
                Box::new(Position {
                    axis: Axis::X,
                    target: o.target.unwrap_or(c.x),
                    strength: o.strength,
                }),
            );
        }
        if let Some(o) = &self.y {
            sim.set_force(
                "y",
                Box::new(Position {
                    axis: Axis::Y,
                    target: o.target.unwrap_or(c.y),
                    strength: o.strength,
                }),
            );
        }
        if let Some(o) = &self.radial {
            sim.set_force(
                "radial",
                Box::new(Radial {
                    radius: o.radius,
                    x: o.x.unwrap_or(c.x),
                    y: o.y.unwrap_or(c.y),
                    strength: o.strength,
                }),
            );
        }
    }
}

/// Options for [`crate::ForceLayout`]. Snapshotted at `run()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForceLayoutOptions {
    #[serde(flatten)]
    pub common: CommonOptions,
    #[serde(flatten)]
    pub forces: ForceOptions,
    pub alpha: f64,
    pub alpha_min: f64,
    pub alpha_decay: f64,
    pub alpha_target: f64,
    pub velocity_decay: f64,
    /// Tick budget; `0` leaves it unset.
    pub max_iterations: u64,
    /// Wall-clock budget in milliseconds; `0` leaves it unset.
    pub max_simulation_time: u64,
    /// Ignore every budget and run until stopped.
    pub infinite: bool,
    pub ungrabify_while_simulating: bool,
    /// Pin dragged nodes where they were released instead of letting them float again.
    pub fixed_after_dragging: bool,
    /// Share of the `alpha - alphaTarget` gap restored when the user grabs or releases a node.
    pub reheat_fraction: f64,
}

impl Default for ForceLayoutOptions {
    fn default() -> Self {
        let params = SimulationParams::default();
        Self {
            common: CommonOptions::default(),
            forces: ForceOptions::default(),
            alpha: params.alpha,
            alpha_min: params.alpha_min,
            alpha_decay: params.alpha_decay,
            alpha_target: params.alpha_target,
            velocity_decay: params.velocity_decay,
            max_iterations: 0,
            max_simulation_time: 0,
            infinite: false,
            ungrabify_while_simulating: false,
            fixed_after_dragging: false,
            reheat_fraction: 1.0 / 3.0,
        }
    }
}

impl ForceLayoutOptions {
    pub fn simulation_params(&self) -> SimulationParams {
        SimulationParams {
            alpha: self.alpha,
            alpha_min: self.alpha_min,
            alpha_decay: self.alpha_decay,
            alpha_target: self.alpha_target,
            velocity_decay: self.velocity_decay,
        }
    }

    /// Whether some budget is guaranteed to end the run without an explicit stop.
    pub fn is_bounded(&self) -> bool {
        !self.infinite
            && (self.max_iterations > 0
                || self.max_simulation_time > 0
                || self.simulation_params().steps_to_converge().is_some())
    }

    pub fn validate(&self) -> Result<()> {
        self.common.validate()?;
        self.forces.validate()?;
        let unit = [
            ("alpha", self.alpha),
            ("alphaMin", self.alpha_min),
            ("alphaDecay", self.alpha_decay),
            ("alphaTarget", self.alpha_target),
            ("velocityDecay", self.velocity_decay),
            ("reheatFraction", self.reheat_fraction),
        ];
        for (name, v) in unit {
            if !(0.0..=1.0).contains(&v) {
                return Err(Error::config(format!(
                    "{name} must be within [0, 1], got {v}"
                )));
            }
        }
        if self.alpha_min <= 0.0 {
            return Err(Error::config("alphaMin must be positive"));
        }
        Ok(())
    }
}
