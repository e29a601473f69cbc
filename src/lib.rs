//! # sphere-flow
//!
//! Point particles gliding over the surface of a sphere, pushed around by a
//! time-varying noise field, pulled back toward where they were born, and
//! colored by how fast they move.
//!
//! The crate is the physics core only. Rendering, windowing and the frame loop
//! live with the caller: each frame the caller runs [`Simulation::update`] and
//! then copies positions and colors out of the simulation.
//!
//! ## Quick Start
//!
//! ```ignore
//! use sphere_flow::prelude::*;
//!
//! fn main() -> Result<(), SimulationError> {
//!     let mut sim = Simulation::new(SimulationConfig {
//!         particle_count: 10_000,
//!         sphere_radius: 50.0,
//!         ..Default::default()
//!     })?;
//!     sim.init()?;
//!
//!     let mut positions = vec![0.0; sim.len() * 3];
//!     for step in 0..600 {
//!         sim.update(0.5, step);
//!         sim.write_positions(&mut positions);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Particles
//!
//! A [`Particle`] has an `origin`, a `position` on the sphere, a `velocity` in
//! the tangent plane, and a derived display `color`. The store is fixed-size:
//! particles are never removed, only recycled in place when they stall.
//!
//! ### Update rule
//!
//! Every step applies, in order: spring toward origin, noise forcing, Euler
//! integration, re-projection onto the sphere, damping, color, recycling.
//! See [`store`] for details.
//!
//! ### Noise strategies
//!
//! | Mode | Behavior |
//! |------|----------|
//! | [`NoiseMode::Flow`] | Smooth heading from 4D simplex noise |
//! | [`NoiseMode::Pulse`] | Flow plus periodic large kicks split by a zone boundary |
//!
//! ### Determinism
//!
//! All randomness comes from the configured seed. Each particle draws from its
//! own stream keyed by `(seed, step, index)`, so the `parallel` feature
//! produces the same output as the sequential loop.

pub mod color;
pub mod config;
pub mod coords;
mod error;
pub mod noise;
mod particle;
pub mod render;
mod simulation;
pub mod spawn;
pub mod store;
pub mod zone;

pub use crate::color::{ColorScheme, Palette, SpeedGradient};
pub use crate::config::SimulationConfig;
pub use crate::coords::{to_cartesian, to_polar, Polar};
pub use crate::error::{ConfigError, SimulationError};
pub use glam::{Vec2, Vec3};
pub use crate::noise::{NoiseConfig, NoiseField, NoiseMode, PulseConfig};
pub use crate::particle::Particle;
pub use crate::render::RenderVertex;
pub use crate::simulation::Simulation;
pub use crate::spawn::SpawnConfig;
pub use crate::store::{ParticleStore, PhysicsConfig, StepStats};
pub use crate::zone::ZoneBoundary;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use sphere_flow::prelude::*;
/// ```
pub mod prelude {
    pub use crate::color::{ColorScheme, Palette, SpeedGradient};
    pub use crate::config::SimulationConfig;
    pub use crate::error::{ConfigError, SimulationError};
    pub use crate::noise::{NoiseConfig, NoiseMode, PulseConfig};
    pub use crate::particle::Particle;
    pub use crate::simulation::Simulation;
    pub use crate::store::{PhysicsConfig, StepStats};
    pub use crate::zone::ZoneBoundary;
    pub use crate::{Vec2, Vec3};
}
