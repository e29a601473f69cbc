//! Particle storage and the per-particle integration rule.
//!
//! Each update runs these stages on every particle, in order:
//!
//! | # | Stage | Effect |
//! |---|-------|--------|
//! | 1 | Spring | `v += k_spring * (origin - p)` |
//! | 2 | Noise | `v.xy += k_noise * dt * heading` (and `v.z` with `noise_on_z`) |
//! | 3 | Euler | `p += v * dt` |
//! | 4 | Surface | re-project `p` onto the sphere, strip the radial part of `v` |
//! | 5 | Damping | `v *= 1 - friction` |
//! | 6 | Color | `color = scheme(|v|, p)` |
//! | 7 | Recycle | respawn if `|v| < recycle_threshold` |
//!
//! Particles never read each other, so the loop is data-parallel. With the
//! `parallel` feature it runs on rayon; random draws are keyed by particle
//! index so both paths produce identical results.

use crate::error::ConfigError;
use crate::noise::NoiseField;
use crate::particle::Particle;
use crate::spawn::{SpawnConfig, SpawnContext};
use glam::Vec3;
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Integration tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Fraction of velocity removed every step.
    pub friction: f32,
    /// Gain of the pull back toward each particle's origin. Applied directly
    /// to velocity, not scaled by `delta_time`.
    pub spring_strength: f32,
    /// Gain of the noise heading, scaled by `delta_time`.
    pub noise_strength: f32,
    /// Speed below which a particle is respawned.
    pub recycle_threshold: f32,
    /// Also force the Z velocity component from a second noise sample.
    pub noise_on_z: bool,
    /// Rescale positions back onto the sphere after integrating. When off,
    /// particles drift radially by the Euler step error.
    pub renormalize: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            friction: 0.02,
            spring_strength: 0.0001,
            noise_strength: 0.01,
            recycle_threshold: 0.001,
            noise_on_z: false,
            renormalize: true,
        }
    }
}

impl PhysicsConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if !(self.friction.is_finite() && (0.0..1.0).contains(&self.friction)) {
            return Err(ConfigError::InvalidFriction(self.friction));
        }
        if self.friction == 0.0 {
            log::warn!("friction is zero, velocities will never decay");
        }
        for (name, value) in [
            ("spring_strength", self.spring_strength),
            ("noise_strength", self.noise_strength),
            ("recycle_threshold", self.recycle_threshold),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }
}

/// Summary of one update.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StepStats {
    /// Particles respawned this step.
    pub recycled: usize,
    /// Mean speed after damping, before recycling.
    pub mean_speed: f32,
}

/// Everything one step needs besides the particle itself.
pub(crate) struct Frame<'a> {
    pub radius: f32,
    pub delta_time: f32,
    pub step: u64,
    pub seed: u64,
    pub physics: &'a PhysicsConfig,
    pub spawn: &'a SpawnConfig,
    pub noise: &'a NoiseField,
    pub color: &'a (dyn Fn(f32, Vec3) -> Vec3 + Sync),
}

/// Fixed-size, ordered particle collection.
///
/// Index `i` always refers to the same slot, so external buffers can be
/// filled by index.
#[derive(Debug, Clone, Default)]
pub struct ParticleStore {
    particles: Vec<Particle>,
}

impl ParticleStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_particles(particles: Vec<Particle>) -> Self {
        Self { particles }
    }

    /// Fill the store with `count` fresh particles.
    pub(crate) fn populate(&mut self, count: usize, radius: f32, seed: u64, spawn: &SpawnConfig) {
        self.particles = (0..count)
            .map(|i| SpawnContext::initial(seed, i as u32).particle(radius, spawn))
            .collect();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Particle> {
        self.particles.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    /// Advance every particle by one step.
    pub(crate) fn step(&mut self, frame: &Frame<'_>) -> StepStats {
        if self.particles.is_empty() {
            return StepStats::default();
        }

        #[cfg(feature = "parallel")]
        let (recycled, speed_sum) = self
            .particles
            .par_iter_mut()
            .enumerate()
            .map(|(i, p)| {
                let (recycled, speed) = advance(p, i as u32, frame);
                (recycled as usize, speed as f64)
            })
            .reduce(|| (0, 0.0), |a, b| (a.0 + b.0, a.1 + b.1));

        #[cfg(not(feature = "parallel"))]
        let (recycled, speed_sum) = self
            .particles
            .iter_mut()
            .enumerate()
            .fold((0usize, 0.0f64), |(n, sum), (i, p)| {
                let (recycled, speed) = advance(p, i as u32, frame);
                (n + recycled as usize, sum + speed as f64)
            });

        StepStats {
            recycled,
            mean_speed: (speed_sum / self.particles.len() as f64) as f32,
        }
    }
}

impl<'a> IntoIterator for &'a ParticleStore {
    type Item = &'a Particle;
    type IntoIter = std::slice::Iter<'a, Particle>;

    fn into_iter(self) -> Self::IntoIter {
        self.particles.iter()
    }
}

/// Apply the update rule to one particle.
///
/// Returns whether it was recycled and its speed after damping.
pub(crate) fn advance(particle: &mut Particle, index: u32, frame: &Frame<'_>) -> (bool, f32) {
    let physics = frame.physics;
    let dt = frame.delta_time;
    let mut ctx = SpawnContext::new(frame.seed, frame.step, index);

    // 1. Spring toward origin
    particle.velocity += (particle.origin - particle.position) * physics.spring_strength;

    // 2. Noise forcing
    let heading = frame.noise.sample(particle.position, frame.step, ctx.rng());
    let gain = physics.noise_strength * dt;
    particle.velocity.x += heading.x * gain;
    particle.velocity.y += heading.y * gain;
    if physics.noise_on_z {
        particle.velocity.z += frame.noise.sample_z(particle.position, frame.step, ctx.rng()) * gain;
    }

    // 3. Explicit Euler
    particle.position += particle.velocity * dt;

    // 4. Back onto the surface
    if physics.renormalize {
        let distance = particle.position.length();
        debug_assert!(distance > 0.0, "particle {} collapsed to the sphere center", index);
        if distance > f32::MIN_POSITIVE {
            particle.position *= frame.radius / distance;
        }
    }
    let normal = particle.position / frame.radius;
    particle.velocity -= particle.velocity.dot(normal) * normal;

    // 5. Damping
    particle.velocity *= 1.0 - physics.friction;

    // 6. Color from post-damping speed
    let speed = particle.velocity.length();
    let color = (frame.color)(speed, particle.position);

    // 7. Recycle stalled particles
    let recycled = speed < physics.recycle_threshold;
    if recycled {
        *particle = ctx.particle(frame.radius, frame.spawn);
    }
    particle.color = color;

    (recycled, speed)
}
