#![forbid(unsafe_code)]

//! Headless force placement and label annealing for dot-population charts.
//!
//! Two upstream JS libraries are ported here, reduced to the subset that
//! dot-swarm census charts actually drive:
//!
//! - [`sim`]: the `d3-force@1` velocity Verlet simulation with center,
//!   many-body, collision, and axis-positioning forces.
//! - [`labeler`]: tinker10's `D3-Labeler` simulated-annealing label placer.
//!
//! Upstream relies on `Math.random`; both ports draw from a seeded
//! xorshift64* generator instead so the same seed reproduces the same layout.

pub mod error;
pub mod geom;
pub mod labeler;
pub mod rng;
pub mod sim;

pub use error::{Error, Result};
pub use labeler::{Anchor, AnnealOptions, EnergyWeights, Label, anneal};
pub use rng::XorShift64Star;
pub use sim::{
    Body, CenterForce, CollideForce, Force, ManyBodyForce, PositionForce, Simulation,
};
