//! Stock forces: repulsion, springs, collision, centering, axis alignment and radial.
//!
//! Pairwise forces are brute force (`O(n^2)` per step).

use crate::simulation::{Body, Force, Link};
use drift_core::XorShift64Star;

/// Pairwise charge between all bodies. Negative strength repels.
#[derive(Debug, Clone)]
pub struct ManyBody {
    pub strength: f64,
    pub distance_min: f64,
    pub distance_max: f64,
}

impl Default for ManyBody {
    fn default() -> Self {
        Self {
            strength: -30.0,
            distance_min: 1.0,
            distance_max: f64::INFINITY,
        }
    }
}

impl Force for ManyBody {
    fn apply(&mut self, alpha: f64, bodies: &mut [Body], rng: &mut XorShift64Star) {
        let min2 = self.distance_min * self.distance_min;
        let max2 = self.distance_max * self.distance_max;
        let n = bodies.len();
        let mut dv = vec![(0.0, 0.0); n];
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let mut dx = bodies[j].x - bodies[i].x;
                let mut dy = bodies[j].y - bodies[i].y;
                if dx == 0.0 {
                    dx = rng.jiggle();
                }
                if dy == 0.0 {
                    dy = rng.jiggle();
                }
                let mut l = dx * dx + dy * dy;
                if l >= max2 {
                    continue;
                }
                if l < min2 {
                    l = (min2 * l).sqrt();
                }
                let w = self.strength * alpha / l;
                dv[i].0 += dx * w;
                dv[i].1 += dy * w;
            }
        }
        for (b, (dvx, dvy)) in bodies.iter_mut().zip(dv) {
            b.vx += dvx;
            b.vy += dvy;
        }
    }
}

/// Springs along links, pulling endpoints toward `distance`.
#[derive(Debug, Clone)]
pub struct LinkForce {
    pub distance: f64,
    /// Fixed spring strength; `None` weakens links between high-degree nodes (`1 / min(deg)`).
    pub strength: Option<f64>,
    pub iterations: usize,
    links: Vec<Link>,
    strengths: Vec<f64>,
    bias: Vec<f64>,
}

impl LinkForce {
    pub fn new(distance: f64, strength: Option<f64>, iterations: usize) -> Self {
        Self {
            distance,
            strength,
            iterations: iterations.max(1),
            links: Vec::new(),
            strengths: Vec::new(),
            bias: Vec::new(),
        }
    }
}

impl Default for LinkForce {
    fn default() -> Self {
        Self::new(30.0, None, 1)
    }
}

impl Force for LinkForce {
    fn initialize(&mut self, bodies: &[Body], links: &[Link]) {
        let mut degree = vec![0usize; bodies.len()];
        self.links = links
            .iter()
            .copied()
            .filter(|l| l.source != l.target)
            .collect();
        for l in &self.links {
            degree[l.source] += 1;
            degree[l.target] += 1;
        }
        self.bias = self
            .links
            .iter()
            .map(|l| degree[l.source] as f64 / (degree[l.source] + degree[l.target]) as f64)
            .collect();
        self.strengths = self
            .links
            .iter()
            .map(|l| {
                self.strength
                    .unwrap_or_else(|| 1.0 / degree[l.source].min(degree[l.target]) as f64)
            })
            .collect();
    }

    fn apply(&mut self, alpha: f64, bodies: &mut [Body], rng: &mut XorShift64Star) {
        for _ in 0..self.iterations {
            for (i, link) in self.links.iter().enumerate() {
                let (s, t) = (bodies[link.source], bodies[link.target]);
                let mut x = t.x + t.vx - s.x - s.vx;
                let mut y = t.y + t.vy - s.y - s.vy;
                if x == 0.0 {
                    x = rng.jiggle();
                }
                if y == 0.0 {
                    y = rng.jiggle();
                }
                let len = (x * x + y * y).sqrt();
                let k = (len - self.distance) / len * alpha * self.strengths[i];
                x *= k;
                y *= k;
                let b = self.bias[i];
                bodies[link.target].vx -= x * b;
                bodies[link.target].vy -= y * b;
                bodies[link.source].vx += x * (1.0 - b);
                bodies[link.source].vy += y * (1.0 - b);
            }
        }
    }
}

/// Keeps bodies from overlapping, treating each as a circle.
#[derive(Debug, Clone)]
pub struct Collide {
    /// Uniform radius; `None` uses each body's own radius.
    pub radius: Option<f64>,
    pub strength: f64,
    pub iterations: usize,
}

impl Default for Collide {
    fn default() -> Self {
        Self {
            radius: None,
            strength: 1.0,
            iterations: 1,
        }
    }
}

impl Collide {
    fn radius_of(&self, b: &Body) -> f64 {
        self.radius.unwrap_or(b.radius)
    }
}

impl Force for Collide {
    fn apply(&mut self, _alpha: f64, bodies: &mut [Body], rng: &mut XorShift64Star) {
        let n = bodies.len();
        for _ in 0..self.iterations.max(1) {
            for i in 0..n {
                let ri = self.radius_of(&bodies[i]);
                let ri2 = ri * ri;
                for j in (i + 1)..n {
                    let rj = self.radius_of(&bodies[j]);
                    let r = ri + rj;
                    let mut dx = (bodies[i].x + bodies[i].vx) - (bodies[j].x + bodies[j].vx);
                    let mut dy = (bodies[i].y + bodies[i].vy) - (bodies[j].y + bodies[j].vy);
                    let mut l2 = dx * dx + dy * dy;
                    if l2 >= r * r {
                        continue;
                    }
                    if dx == 0.0 {
                        dx = rng.jiggle();
                        l2 += dx * dx;
                    }
                    if dy == 0.0 {
                        dy = rng.jiggle();
                        l2 += dy * dy;
                    }
                    let l = l2.sqrt();
                    let k = (r - l) / l * self.strength;
                    dx *= k;
                    dy *= k;
                    let rj2 = rj * rj;
                    let share = if ri2 + rj2 > 0.0 { rj2 / (ri2 + rj2) } else { 0.5 };
                    bodies[i].vx += dx * share;
                    bodies[i].vy += dy * share;
                    bodies[j].vx -= dx * (1.0 - share);
                    bodies[j].vy -= dy * (1.0 - share);
                }
            }
        }
    }
}

/// Translates all bodies so their mean sits at (`x`, `y`). Acts on positions, not velocities.
#[derive(Debug, Clone)]
pub struct Center {
    pub x: f64,
    pub y: f64,
    pub strength: f64,
}

impl Force for Center {
    fn apply(&mut self, _alpha: f64, bodies: &mut [Body], _rng: &mut XorShift64Star) {
        if bodies.is_empty() {
            return;
        }
        let n = bodies.len() as f64;
        let (sx, sy) = bodies
            .iter()
            .fold((0.0, 0.0), |(sx, sy), b| (sx + b.x, sy + b.y));
        let dx = (sx / n - self.x) * self.strength;
        let dy = (sy / n - self.y) * self.strength;
        for b in bodies {
            b.x -= dx;
            b.y -= dy;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Pulls bodies toward a coordinate on one axis.
#[derive(Debug, Clone)]
pub struct Position {
    pub axis: Axis,
    pub target: f64,
    pub strength: f64,
}

impl Force for Position {
    fn apply(&mut self, alpha: f64, bodies: &mut [Body], _rng: &mut XorShift64Star) {
        let k = self.strength * alpha;
        for b in bodies {
            match self.axis {
                Axis::X => b.vx += (self.target - b.x) * k,
                Axis::Y => b.vy += (self.target - b.y) * k,
            }
        }
    }
}

/// Pulls bodies toward a circle of `radius` around (`x`, `y`).
#[derive(Debug, Clone)]
pub struct Radial {
    pub radius: f64,
    pub x: f64,
    pub y: f64,
    pub strength: f64,
}

impl Force for Radial {
    fn apply(&mut self, alpha: f64, bodies: &mut [Body], _rng: &mut XorShift64Star) {
        for b in bodies {
            let mut dx = b.x - self.x;
            if dx == 0.0 {
                dx = 1e-6;
            }
            let dy = b.y - self.y;
            let r = (dx * dx + dy * dy).sqrt();
            let k = (self.radius - r) * self.strength * alpha / r;
            b.vx += dx * k;
            b.vy += dy * k;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drift_core::Point;

    fn rng() -> XorShift64Star {
        XorShift64Star::new(3)
    }

    #[test]
    fn many_body_with_negative_strength_pushes_apart() {
        let mut bodies = vec![Body::at(Point::new(0.0, 0.0)), Body::at(Point::new(10.0, 0.0))];
        ManyBody::default().apply(1.0, &mut bodies, &mut rng());
        assert!(bodies[0].vx < 0.0);
        assert!(bodies[1].vx > 0.0);
    }

    #[test]
    fn stretched_link_pulls_endpoints_together() {
        let mut bodies = vec![Body::at(Point::new(0.0, 0.0)), Body::at(Point::new(100.0, 0.0))];
        let links = [Link {
            source: 0,
            target: 1,
        }];
        let mut force = LinkForce::default();
        force.initialize(&bodies, &links);
        force.apply(1.0, &mut bodies, &mut rng());
        assert!(bodies[0].vx > 0.0);
        assert!(bodies[1].vx < 0.0);
    }

    #[test]
    fn self_links_are_ignored() {
        let mut bodies = vec![Body::at(Point::new(0.0, 0.0))];
        let links = [Link {
            source: 0,
            target: 0,
        }];
        let mut force = LinkForce::default();
        force.initialize(&bodies, &links);
        force.apply(1.0, &mut bodies, &mut rng());
        assert_eq!(bodies[0].vx, 0.0);
    }

    #[test]
    fn overlapping_bodies_collide() {
        let mut bodies = vec![Body::at(Point::new(0.0, 0.0)), Body::at(Point::new(5.0, 0.0))];
        let mut force = Collide {
            radius: Some(10.0),
            ..Default::default()
        };
        force.apply(1.0, &mut bodies, &mut rng());
        assert!(bodies[0].vx < 0.0);
        assert!(bodies[1].vx > 0.0);
    }

    #[test]
    fn center_moves_the_mean() {
        let mut bodies = vec![Body::at(Point::new(0.0, 0.0)), Body::at(Point::new(10.0, 10.0))];
        let mut force = Center {
            x: 100.0,
            y: 100.0,
            strength: 1.0,
        };
        force.apply(1.0, &mut bodies, &mut rng());
        assert_eq!(bodies[0].position(), Point::new(95.0, 95.0));
        assert_eq!(bodies[1].position(), Point::new(105.0, 105.0));
    }

    #[test]
    fn radial_pulls_outside_bodies_inward() {
        let mut bodies = vec![Body::at(Point::new(100.0, 0.0))];
        let mut force = Radial {
            radius: 50.0,
            x: 0.0,
            y: 0.0,
            strength: 0.1,
        };
        force.apply(1.0, &mut bodies, &mut rng());
        assert!(bodies[0].vx < 0.0);
    }
}
