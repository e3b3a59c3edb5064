use drift_core::{BoundingBox, Point, XorShift64Star};
use drift_force::{Body, Force, ForceOptions, Link, Simulation, SimulationParams};

struct Constant {
    push: f64,
}

impl Force for Constant {
    fn apply(&mut self, _alpha: f64, bodies: &mut [Body], _rng: &mut XorShift64Star) {
        for b in bodies {
            b.vx += self.push;
        }
    }
}

#[test]
fn forces_are_composable_by_name() {
    let bbox = BoundingBox::from_origin(0.0, 0.0, 100.0, 100.0);
    let mut sim = Simulation::new(SimulationParams::default(), 1);
    ForceOptions::default().install(&mut sim, &bbox);
    assert_eq!(
        sim.force_names().collect::<Vec<_>>(),
        vec!["manyBody", "link", "center"]
    );

    sim.set_force("link", Box::new(Constant { push: 1.0 }));
    assert!(sim.remove_force("center"));
    assert!(!sim.remove_force("center"));
    assert_eq!(sim.force_names().collect::<Vec<_>>(), vec!["manyBody", "link"]);
}

#[test]
fn custom_force_drives_bodies() {
    let mut sim = Simulation::new(SimulationParams::default(), 1)
        .with_force("wind", Box::new(Constant { push: 2.0 }));
    sim.initialize(vec![Body::at(Point::new(0.0, 0.0))], Vec::new());
    sim.step();
    // velocity 2.0 damped by (1 - 0.4)
    assert!((sim.bodies()[0].x - 1.2).abs() < 1e-12);
}

#[test]
fn connected_pair_settles_near_link_distance() {
    let bbox = BoundingBox::from_origin(-100.0, -100.0, 200.0, 200.0);
    let mut sim = Simulation::new(SimulationParams::default(), 5);
    ForceOptions {
        many_body: None,
        ..Default::default()
    }
    .install(&mut sim, &bbox);
    sim.initialize(
        vec![Body::at(Point::new(-80.0, 0.0)), Body::at(Point::new(80.0, 0.0))],
        vec![Link {
            source: 0,
            target: 1,
        }],
    );
    for _ in 0..300 {
        sim.step();
    }
    let a = sim.bodies()[0].position();
    let b = sim.bodies()[1].position();
    let d = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
    assert!((d - 30.0).abs() < 3.0, "distance={d}");
    let mid = Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
    assert!(mid.x.abs() < 1e-6 && mid.y.abs() < 1e-6, "{mid:?}");
}

#[test]
fn links_to_unknown_bodies_are_dropped() {
    let mut sim = Simulation::new(SimulationParams::default(), 1);
    sim.initialize(
        vec![Body::default()],
        vec![Link {
            source: 0,
            target: 3,
        }],
    );
    assert!(sim.links().is_empty());
}
