//! Velocity-Verlet force simulation, ported from d3-force v1.
//!
//! The upstream library integrates forces with a decaying `alpha` schedule:
//! every tick interpolates `alpha` toward `alpha_target`, applies each force
//! in insertion order, then damps velocities and advances positions. Bodies
//! without an initial position are seeded on a phyllotaxis spiral around the
//! origin, exactly as the original does.
//!
//! Differences from upstream are deliberate and small: the n-body pass is
//! exact pairwise instead of Barnes-Hut (the populations here are tiny), and
//! the jiggle used to break ties between coincident bodies draws from a
//! seeded [`XorShift64Star`] so runs are reproducible.

use crate::error::{Error, Result};
use crate::rng::XorShift64Star;
use std::f64::consts::PI;

const INITIAL_RADIUS: f64 = 10.0;

/// A point mass tracked by the simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
}

impl Body {
    /// Body at rest at the given position.
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
        }
    }

    /// Body with no position yet; the simulation seeds it on the
    /// phyllotaxis spiral when constructed.
    pub fn unplaced() -> Self {
        Self {
            x: f64::NAN,
            y: f64::NAN,
            vx: 0.0,
            vy: 0.0,
        }
    }
}

/// Recenters the whole population so its mean lands on `(x, y)`.
///
/// This is a positional shift applied uniformly to every body; it ignores
/// `alpha` and velocities.
#[derive(Clone, Copy, Debug)]
pub struct CenterForce {
    pub x: f64,
    pub y: f64,
}

/// Mutual attraction (positive strength) or repulsion (negative strength)
/// between all body pairs, inverse-linear in squared distance.
#[derive(Clone, Copy, Debug)]
pub struct ManyBodyForce {
    pub strength: f64,
    /// Pairs closer than this have their force softened to avoid blow-ups.
    pub distance_min: f64,
    /// Pairs at or beyond this distance are ignored entirely.
    pub distance_max: f64,
}

impl Default for ManyBodyForce {
    fn default() -> Self {
        Self {
            strength: -30.0,
            distance_min: 1.0,
            distance_max: f64::INFINITY,
        }
    }
}

/// Pushes overlapping bodies apart. Every body shares one radius, so two
/// bodies collide when their centers come within `2 * radius`.
#[derive(Clone, Copy, Debug)]
pub struct CollideForce {
    pub radius: f64,
    pub strength: f64,
    pub iterations: usize,
}

impl CollideForce {
    /// Collision over the given radius with the upstream defaults: strength
    /// 0.7 and a single relaxation pass.
    pub fn new(radius: f64) -> Self {
        Self {
            radius,
            strength: 0.7,
            iterations: 1,
        }
    }
}

/// Pulls each body toward its own target coordinate along one axis.
///
/// Targets are captured when the force is installed and hold one entry per
/// body, in body order.
#[derive(Clone, Debug)]
pub struct PositionForce {
    pub targets: Vec<f64>,
    pub strength: f64,
}

#[derive(Clone, Debug)]
pub enum Force {
    Center(CenterForce),
    ManyBody(ManyBodyForce),
    Collide(CollideForce),
    PositionX(PositionForce),
    PositionY(PositionForce),
}

/// The simulation itself: a set of bodies, the forces acting on them, and
/// the cooling schedule that winds the system down.
#[derive(Clone, Debug)]
pub struct Simulation {
    bodies: Vec<Body>,
    forces: Vec<Force>,
    alpha: f64,
    alpha_min: f64,
    alpha_decay: f64,
    alpha_target: f64,
    velocity_decay: f64,
    rng: XorShift64Star,
}

impl Simulation {
    /// Builds a simulation over `bodies` with the upstream default schedule:
    /// `alpha` starts at 1 and decays so that roughly 300 ticks bring it to
    /// the 0.001 floor. Unplaced bodies are seeded on the phyllotaxis spiral.
    pub fn new(bodies: Vec<Body>, seed: u64) -> Self {
        let mut sim = Self {
            bodies,
            forces: Vec::new(),
            alpha: 1.0,
            alpha_min: 0.001,
            alpha_decay: 1.0 - 0.001_f64.powf(1.0 / 300.0),
            alpha_target: 0.0,
            velocity_decay: 0.6,
            rng: XorShift64Star::new(seed),
        };
        sim.seed_unplaced();
        sim
    }

    fn seed_unplaced(&mut self) {
        let initial_angle = PI * (3.0 - 5.0_f64.sqrt());
        for (i, body) in self.bodies.iter_mut().enumerate() {
            if body.x.is_nan() || body.y.is_nan() {
                let radius = INITIAL_RADIUS * (i as f64).sqrt();
                let angle = i as f64 * initial_angle;
                body.x = radius * angle.cos();
                body.y = radius * angle.sin();
            }
            if body.vx.is_nan() || body.vy.is_nan() {
                body.vx = 0.0;
                body.vy = 0.0;
            }
        }
    }

    /// Installs the forces applied on each tick, replacing any previous set.
    /// Position forces must carry exactly one target per body.
    pub fn set_forces(&mut self, forces: Vec<Force>) -> Result<()> {
        for force in &forces {
            if let Force::PositionX(f) | Force::PositionY(f) = force {
                if f.targets.len() != self.bodies.len() {
                    return Err(Error::TargetCountMismatch {
                        targets: f.targets.len(),
                        bodies: self.bodies.len(),
                    });
                }
            }
        }
        self.forces = forces;
        Ok(())
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha;
    }

    pub fn alpha_min(&self) -> f64 {
        self.alpha_min
    }

    /// Whether the schedule still has heat in it. Upstream's internal
    /// stepper keeps ticking until `alpha` drops below `alpha_min`.
    pub fn active(&self) -> bool {
        self.alpha >= self.alpha_min
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn bodies_mut(&mut self) -> &mut [Body] {
        &mut self.bodies
    }

    /// Advances the simulation one step: cools `alpha`, applies every force
    /// in insertion order, then damps velocities and moves the bodies.
    pub fn tick(&mut self) {
        self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
        let alpha = self.alpha;
        for force in &self.forces {
            apply_force(force, &mut self.bodies, &mut self.rng, alpha);
        }
        for body in &mut self.bodies {
            body.vx *= self.velocity_decay;
            body.vy *= self.velocity_decay;
            body.x += body.vx;
            body.y += body.vy;
        }
    }
}

fn apply_force(force: &Force, bodies: &mut [Body], rng: &mut XorShift64Star, alpha: f64) {
    match force {
        Force::Center(f) => apply_center(f, bodies),
        Force::ManyBody(f) => apply_many_body(f, bodies, rng, alpha),
        Force::Collide(f) => apply_collide(f, bodies, rng),
        Force::PositionX(f) => {
            for (body, &target) in bodies.iter_mut().zip(&f.targets) {
                body.vx += (target - body.x) * f.strength * alpha;
            }
        }
        Force::PositionY(f) => {
            for (body, &target) in bodies.iter_mut().zip(&f.targets) {
                body.vy += (target - body.y) * f.strength * alpha;
            }
        }
    }
}

fn apply_center(f: &CenterForce, bodies: &mut [Body]) {
    if bodies.is_empty() {
        return;
    }
    let n = bodies.len() as f64;
    let mut sx = 0.0;
    let mut sy = 0.0;
    for body in bodies.iter() {
        sx += body.x;
        sy += body.y;
    }
    let sx = sx / n - f.x;
    let sy = sy / n - f.y;
    for body in bodies.iter_mut() {
        body.x -= sx;
        body.y -= sy;
    }
}

/// Tiny deterministic offset used to separate exactly coincident bodies.
fn jiggle(rng: &mut XorShift64Star) -> f64 {
    (rng.next_f64_unit() - 0.5) * 1e-6
}

fn apply_many_body(f: &ManyBodyForce, bodies: &mut [Body], rng: &mut XorShift64Star, alpha: f64) {
    let min2 = f.distance_min * f.distance_min;
    let max2 = f.distance_max * f.distance_max;
    let n = bodies.len();
    for i in 0..n {
        let (xi, yi) = (bodies[i].x, bodies[i].y);
        for j in 0..n {
            if j == i {
                continue;
            }
            let mut x = bodies[j].x - xi;
            let mut y = bodies[j].y - yi;
            let mut l = x * x + y * y;
            if l >= max2 {
                continue;
            }
            if x == 0.0 {
                x = jiggle(rng);
                l += x * x;
            }
            if y == 0.0 {
                y = jiggle(rng);
                l += y * y;
            }
            // Soften pairs inside the minimum distance instead of letting
            // the inverse-square term explode.
            if l < min2 {
                l = (min2 * l).sqrt();
            }
            let w = f.strength * alpha / l;
            bodies[i].vx += x * w;
            bodies[i].vy += y * w;
        }
    }
}

fn apply_collide(f: &CollideForce, bodies: &mut [Body], rng: &mut XorShift64Star) {
    let n = bodies.len();
    let r = f.radius + f.radius;
    let r2 = r * r;
    for _ in 0..f.iterations {
        for i in 0..n {
            // Predicted position of body i, frozen for this pass even as
            // its velocity picks up corrections below.
            let xi = bodies[i].x + bodies[i].vx;
            let yi = bodies[i].y + bodies[i].vy;
            for j in (i + 1)..n {
                let mut x = xi - bodies[j].x - bodies[j].vx;
                let mut y = yi - bodies[j].y - bodies[j].vy;
                let mut l = x * x + y * y;
                if l < r2 {
                    if x == 0.0 {
                        x = jiggle(rng);
                        l += x * x;
                    }
                    if y == 0.0 {
                        y = jiggle(rng);
                        l += y * y;
                    }
                    l = l.sqrt();
                    let push = (r - l) / l * f.strength;
                    x *= push;
                    y *= push;
                    // Uniform radius, so the correction splits evenly.
                    bodies[i].vx += x * 0.5;
                    bodies[i].vy += y * 0.5;
                    bodies[j].vx -= x * 0.5;
                    bodies[j].vy -= y * 0.5;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schedule_rests_after_about_three_hundred_ticks() {
        let mut sim = Simulation::new(vec![Body::at(0.0, 0.0)], 1);
        let mut ticks = 0;
        while sim.alpha() > sim.alpha_min() {
            sim.tick();
            ticks += 1;
            assert!(ticks < 400, "schedule never cooled");
        }
        assert!(
            (300..=301).contains(&ticks),
            "expected the upstream tick count, got {ticks}"
        );
    }

    #[test]
    fn unplaced_bodies_land_on_the_phyllotaxis_spiral() {
        let sim = Simulation::new(vec![Body::unplaced(); 8], 1);
        for (i, body) in sim.bodies().iter().enumerate() {
            let expected = 10.0 * (i as f64).sqrt();
            let actual = body.x.hypot(body.y);
            assert!(
                (actual - expected).abs() < 1e-9,
                "body {i} at radius {actual}, expected {expected}"
            );
            assert_eq!(body.vx, 0.0);
            assert_eq!(body.vy, 0.0);
        }
        assert_eq!(sim.bodies()[0].x, 0.0);
        assert_eq!(sim.bodies()[0].y, 0.0);
    }

    #[test]
    fn center_force_moves_the_mean_onto_the_target() {
        let mut sim = Simulation::new(vec![Body::at(0.0, 0.0), Body::at(10.0, 10.0)], 1);
        sim.set_forces(vec![Force::Center(CenterForce { x: 100.0, y: 100.0 })])
            .unwrap();
        sim.tick();
        let bodies = sim.bodies();
        let mean_x = (bodies[0].x + bodies[1].x) / 2.0;
        let mean_y = (bodies[0].y + bodies[1].y) / 2.0;
        assert_eq!(mean_x, 100.0);
        assert_eq!(mean_y, 100.0);
        // Relative placement is preserved.
        assert_eq!(bodies[1].x - bodies[0].x, 10.0);
    }

    #[test]
    fn position_force_draws_the_body_toward_its_target() {
        let mut sim = Simulation::new(vec![Body::at(0.0, 0.0)], 1);
        sim.set_forces(vec![Force::PositionX(PositionForce {
            targets: vec![100.0],
            strength: 0.05,
        })])
        .unwrap();
        while sim.alpha() > sim.alpha_min() {
            sim.tick();
        }
        let body = sim.bodies()[0];
        assert!(
            body.x > 60.0 && body.x < 140.0,
            "body settled at {}, expected near 100",
            body.x
        );
        assert!(body.vx.abs() < 1.0);
        assert_eq!(body.y, 0.0);
    }

    #[test]
    fn positive_many_body_strength_attracts() {
        let mut sim = Simulation::new(vec![Body::at(0.0, 0.0), Body::at(10.0, 0.0)], 1);
        sim.set_forces(vec![Force::ManyBody(ManyBodyForce {
            strength: 100.0,
            ..ManyBodyForce::default()
        })])
        .unwrap();
        sim.tick();
        let bodies = sim.bodies();
        assert!(bodies[0].x > 0.0, "left body should move right");
        assert!(bodies[1].x < 10.0, "right body should move left");
    }

    #[test]
    fn negative_many_body_strength_repels() {
        let mut sim = Simulation::new(vec![Body::at(0.0, 0.0), Body::at(10.0, 0.0)], 1);
        sim.set_forces(vec![Force::ManyBody(ManyBodyForce {
            strength: -100.0,
            ..ManyBodyForce::default()
        })])
        .unwrap();
        sim.tick();
        let bodies = sim.bodies();
        assert!(bodies[0].x < 0.0, "left body should move left");
        assert!(bodies[1].x > 10.0, "right body should move right");
    }

    #[test]
    fn many_body_ignores_pairs_beyond_distance_max() {
        let mut sim = Simulation::new(vec![Body::at(0.0, 0.0), Body::at(100.0, 0.0)], 1);
        sim.set_forces(vec![Force::ManyBody(ManyBodyForce {
            strength: -1000.0,
            distance_max: 50.0,
            ..ManyBodyForce::default()
        })])
        .unwrap();
        sim.tick();
        assert_eq!(sim.bodies()[0].x, 0.0);
        assert_eq!(sim.bodies()[1].x, 100.0);
    }

    #[test]
    fn coincident_bodies_are_jiggled_apart_deterministically() {
        let build = || {
            let mut sim = Simulation::new(vec![Body::at(5.0, 5.0), Body::at(5.0, 5.0)], 7);
            sim.set_forces(vec![Force::ManyBody(ManyBodyForce::default())])
                .unwrap();
            sim.tick();
            sim
        };
        let a = build();
        let b = build();
        assert_ne!(a.bodies()[0].x, a.bodies()[1].x, "jiggle must separate");
        assert_eq!(a.bodies()[0], b.bodies()[0]);
        assert_eq!(a.bodies()[1], b.bodies()[1]);
    }

    #[test]
    fn collide_pushes_overlapping_bodies_apart() {
        let mut sim = Simulation::new(vec![Body::at(0.0, 0.0), Body::at(3.0, 4.0)], 1);
        sim.set_forces(vec![Force::Collide(CollideForce {
            strength: 1.0,
            ..CollideForce::new(5.0)
        })])
        .unwrap();
        sim.tick();
        // Centers 5 apart with a 10 overlap threshold: push of 5 along the
        // (3, 4) axis, split evenly, then damped by 0.6.
        let bodies = sim.bodies();
        assert!((bodies[0].x - -0.9).abs() < 1e-12);
        assert!((bodies[0].y - -1.2).abs() < 1e-12);
        assert!((bodies[1].x - 3.9).abs() < 1e-12);
        assert!((bodies[1].y - 5.2).abs() < 1e-12);
    }

    #[test]
    fn collide_defaults_to_the_soft_upstream_strength() {
        let mut sim = Simulation::new(vec![Body::at(0.0, 0.0), Body::at(3.0, 4.0)], 1);
        sim.set_forces(vec![Force::Collide(CollideForce::new(5.0))])
            .unwrap();
        sim.tick();
        // Same geometry as above, scaled by the 0.7 default strength.
        let bodies = sim.bodies();
        assert!((bodies[0].x - -0.63).abs() < 1e-12);
        assert!((bodies[0].y - -0.84).abs() < 1e-12);
        assert!((bodies[1].x - 3.63).abs() < 1e-12);
        assert!((bodies[1].y - 4.84).abs() < 1e-12);
    }

    #[test]
    fn collide_leaves_separated_bodies_alone() {
        let mut sim = Simulation::new(vec![Body::at(0.0, 0.0), Body::at(20.0, 0.0)], 1);
        sim.set_forces(vec![Force::Collide(CollideForce::new(5.0))])
            .unwrap();
        sim.tick();
        assert_eq!(sim.bodies()[0].x, 0.0);
        assert_eq!(sim.bodies()[1].x, 20.0);
    }

    #[test]
    fn position_force_target_count_must_match_bodies() {
        let mut sim = Simulation::new(vec![Body::at(0.0, 0.0), Body::at(1.0, 1.0)], 1);
        let err = sim
            .set_forces(vec![Force::PositionX(PositionForce {
                targets: vec![0.0; 3],
                strength: 0.05,
            })])
            .unwrap_err();
        assert!(matches!(
            err,
            Error::TargetCountMismatch {
                targets: 3,
                bodies: 2
            }
        ));
    }
}
