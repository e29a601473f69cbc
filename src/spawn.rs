//! Spawn context for particle initialization and recycling.
//!
//! Every random draw the simulation makes goes through a `SpawnContext`.
//! A context owns a small RNG seeded from `(seed, step, index)`, so the
//! stream a particle sees never depends on the order particles are visited.

use crate::coords::{to_cartesian, Polar};
use crate::particle::Particle;
use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Initial-velocity settings for fresh particles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Half-width of the uniform draw for each velocity component, before
    /// projection onto the tangent plane. `Vec3::ZERO` spawns at rest.
    pub velocity_spread: Vec3,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            velocity_spread: Vec3::new(0.005, 0.0005, 0.0005),
        }
    }
}

// Salt separating the initial population from per-step streams.
const INIT_SALT: u64 = 0x5851_f42d_4c95_7f2d;

#[inline]
fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Per-particle random stream with sampling helpers.
pub(crate) struct SpawnContext {
    rng: SmallRng,
}

impl SpawnContext {
    /// Stream for particle `index` during `step`.
    pub(crate) fn new(seed: u64, step: u64, index: u32) -> Self {
        let key = mix64(seed ^ mix64(step.wrapping_add(mix64(index as u64 + 1))));
        Self {
            rng: SmallRng::seed_from_u64(key),
        }
    }

    /// Stream used to build the initial population.
    pub(crate) fn initial(seed: u64, index: u32) -> Self {
        let key = mix64(seed ^ INIT_SALT ^ mix64(index as u64 + 1));
        Self {
            rng: SmallRng::seed_from_u64(key),
        }
    }

    /// Underlying RNG.
    #[inline]
    pub fn rng(&mut self) -> &mut SmallRng {
        &mut self.rng
    }

    /// Random f32 in `[-half_width, half_width)`. Zero width yields zero.
    #[inline]
    pub fn random_symmetric(&mut self, half_width: f32) -> f32 {
        if half_width > 0.0 {
            self.rng.gen_range(-half_width..half_width)
        } else {
            0.0
        }
    }

    /// Uniformly distributed direction on the unit sphere.
    ///
    /// `theta = U(0, 2π)` and `phi = acos(2U - 1)`; drawing `phi` uniformly
    /// instead would bunch points at the poles.
    pub fn random_polar(&mut self) -> Polar {
        let theta = self.rng.gen_range(0.0..TAU);
        let phi = (2.0 * self.rng.gen::<f32>() - 1.0).clamp(-1.0, 1.0).acos();
        Polar { theta, phi }
    }

    /// Random point on the surface of a sphere of given radius.
    pub fn random_on_sphere(&mut self, radius: f32) -> Vec3 {
        to_cartesian(self.random_polar(), radius)
    }

    /// Small random velocity lying in the tangent plane at `position`.
    pub fn tangent_velocity(&mut self, position: Vec3, spread: Vec3) -> Vec3 {
        let raw = Vec3::new(
            self.random_symmetric(spread.x),
            self.random_symmetric(spread.y),
            self.random_symmetric(spread.z),
        );
        match position.try_normalize() {
            Some(normal) => raw - raw.dot(normal) * normal,
            None => raw,
        }
    }

    /// Fresh particle on the sphere, with `origin == position`.
    pub fn particle(&mut self, radius: f32, config: &SpawnConfig) -> Particle {
        let position = self.random_on_sphere(radius);
        let velocity = self.tangent_velocity(position, config.velocity_spread);
        Particle::new(position, velocity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    impl SpawnContext {
        fn random(&mut self) -> f32 {
            self.rng.gen()
        }
    }

    #[test]
    fn test_streams_are_reproducible() {
        let mut a = SpawnContext::new(42, 7, 3);
        let mut b = SpawnContext::new(42, 7, 3);
        for _ in 0..10 {
            assert_eq!(a.random(), b.random());
        }
    }

    #[test]
    fn test_streams_differ_by_index_and_step() {
        let first = SpawnContext::new(42, 7, 3).random();
        assert_ne!(first, SpawnContext::new(42, 7, 4).random());
        assert_ne!(first, SpawnContext::new(42, 8, 3).random());
        assert_ne!(first, SpawnContext::initial(42, 3).random());
    }

    #[test]
    fn test_random_on_sphere_radius() {
        let mut ctx = SpawnContext::initial(1, 0);
        for _ in 0..200 {
            let p = ctx.random_on_sphere(50.0);
            assert!((p.length() - 50.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_sphere_sampling_is_uniform_in_z() {
        // Uniform on the sphere means z is uniform on [-r, r].
        let mut ctx = SpawnContext::initial(9, 0);
        let n = 20_000;
        let upper = (0..n).filter(|_| ctx.random_on_sphere(1.0).z > 0.5).count();
        let fraction = upper as f32 / n as f32;
        assert!((fraction - 0.25).abs() < 0.02, "fraction above z=0.5: {}", fraction);
    }

    #[test]
    fn test_tangent_velocity_is_tangent() {
        let mut ctx = SpawnContext::initial(5, 0);
        for _ in 0..100 {
            let p = ctx.random_on_sphere(50.0);
            let v = ctx.tangent_velocity(p, Vec3::splat(0.01));
            assert!(v.dot(p / 50.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_spawned_particle_sits_on_origin() {
        let mut ctx = SpawnContext::initial(5, 0);
        let particle = ctx.particle(50.0, &SpawnConfig::default());
        assert_eq!(particle.origin, particle.position);
        assert!((particle.position.length() - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_zero_spread_spawns_at_rest() {
        let mut ctx = SpawnContext::initial(5, 0);
        let config = SpawnConfig {
            velocity_spread: Vec3::ZERO,
        };
        assert_eq!(ctx.particle(10.0, &config).velocity, Vec3::ZERO);
    }
}
