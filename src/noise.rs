//! Time-varying flow field sampled by every particle, every step.
//!
//! The field turns a 4D simplex noise value into a heading: the sample in
//! `[-1, 1]` is mapped linearly onto `[-π, π]` and returned as the unit vector
//! `(cos a, sin a)`. Using the noise as an angle keeps the forcing magnitude
//! constant, so particles never stall in a flat region of the noise.
//!
//! # Strategies
//!
//! | Mode | Behavior |
//! |------|----------|
//! | [`NoiseMode::Flow`] | Smooth heading from 4D noise (default) |
//! | [`NoiseMode::Pulse`] | Flow heading, replaced by a large kick on loop boundaries |
//!
//! # Example
//!
//! ```ignore
//! let field = NoiseField::new(&NoiseConfig::default(), 42);
//! let heading = field.flow(Vec3::new(10.0, 0.0, 49.0), 120);
//! assert!((heading.length() - 1.0).abs() < 1e-5);
//! ```

use crate::error::ConfigError;
use crate::zone::ZoneBoundary;
use glam::{Vec2, Vec3};
use noise::{NoiseFn, OpenSimplex};
use rand::rngs::SmallRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Noise construction parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    /// Multiplier applied to `x`, `y`, `z` before sampling.
    pub spatial_resolution: f32,
    /// Multiplier applied to the step counter before sampling.
    pub temporal_resolution: f32,
    /// Which strategy produces the flow heading.
    pub mode: NoiseMode,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            spatial_resolution: 0.05,
            temporal_resolution: 0.005,
            mode: NoiseMode::Flow,
        }
    }
}

impl NoiseConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if !(self.spatial_resolution.is_finite() && self.spatial_resolution > 0.0) {
            return Err(ConfigError::InvalidResolution {
                axis: "spatial",
                value: self.spatial_resolution,
            });
        }
        if !(self.temporal_resolution.is_finite() && self.temporal_resolution > 0.0) {
            return Err(ConfigError::InvalidResolution {
                axis: "temporal",
                value: self.temporal_resolution,
            });
        }
        if let NoiseMode::Pulse(pulse) = &self.mode {
            pulse.validate()?;
        }
        Ok(())
    }
}

/// Strategy used to produce a particle's flow heading.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum NoiseMode {
    /// Smooth heading derived from 4D noise.
    #[default]
    Flow,
    /// Flow heading, except on the last step of every loop where a large
    /// pseudo-random kick is injected instead.
    Pulse(PulseConfig),
}

/// Parameters of the scripted pulse strategy.
///
/// Every `loop_frequency` steps the field emits a kick `(x, y)` with both
/// components drawn from `even_range` on even loops and `odd_range` on odd
/// loops. Particles whose zone boundary value is below `threshold` receive the
/// kick as is; the rest receive it negated, so the two zones are pushed apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    /// Steps per loop. A kick fires on step `loop_frequency - 1` of each loop.
    pub loop_frequency: u64,
    /// Component range `[min, max)` for kicks on even loops.
    pub even_range: [f32; 2],
    /// Component range `[min, max)` for kicks on odd loops.
    pub odd_range: [f32; 2],
    /// Boundary value separating the two zones.
    pub threshold: f32,
    /// Shape of the zone boundary.
    pub boundary: ZoneBoundary,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            loop_frequency: 60,
            even_range: [0.0, 100.0],
            odd_range: [50.0, 70.0],
            threshold: -5.0,
            boundary: ZoneBoundary::default(),
        }
    }
}

impl PulseConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.loop_frequency == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "loop_frequency",
                value: 0.0,
            });
        }
        for (name, [min, max]) in [("even_range", self.even_range), ("odd_range", self.odd_range)] {
            if !(min.is_finite() && max.is_finite() && min <= max) {
                return Err(ConfigError::InvalidRange { name, min, max });
            }
        }
        if !self.threshold.is_finite() {
            return Err(ConfigError::InvalidParameter {
                name: "threshold",
                value: self.threshold,
            });
        }
        self.boundary.validate()
    }

    /// Whether `step` is the kick step of its loop. Never fires with a zero
    /// `loop_frequency`.
    #[inline]
    pub fn fires_at(&self, step: u64) -> bool {
        match step.checked_rem(self.loop_frequency) {
            Some(phase) => phase == self.loop_frequency - 1,
            None => false,
        }
    }

    /// Kick for `position` at a firing `step`.
    ///
    /// The sign depends on which side of the boundary `position` lies.
    pub fn kick(&self, position: Vec3, step: u64, rng: &mut SmallRng) -> Vec2 {
        let lap = step.checked_div(self.loop_frequency).unwrap_or(0);
        let range = if lap % 2 == 0 {
            self.even_range
        } else {
            self.odd_range
        };
        let kick = Vec2::new(draw(rng, range), draw(rng, range));

        if self.boundary.value(position) < self.threshold {
            kick
        } else {
            -kick
        }
    }
}

fn draw(rng: &mut SmallRng, [min, max]: [f32; 2]) -> f32 {
    if max > min {
        rng.gen_range(min..max)
    } else {
        min
    }
}

/// Seeded 4D noise field.
///
/// The generator's permutation tables are built once in [`NoiseField::new`]
/// and never change, so [`NoiseField::flow`] is a pure function of its inputs.
pub struct NoiseField {
    generator: OpenSimplex,
    spatial_resolution: f64,
    temporal_resolution: f64,
    mode: NoiseMode,
}

impl NoiseField {
    /// Build a field from `config`, seeding the generator with `seed`.
    pub fn new(config: &NoiseConfig, seed: u32) -> Self {
        Self {
            generator: OpenSimplex::new(seed),
            spatial_resolution: config.spatial_resolution as f64,
            temporal_resolution: config.temporal_resolution as f64,
            mode: config.mode.clone(),
        }
    }

    /// Active strategy.
    pub fn mode(&self) -> &NoiseMode {
        &self.mode
    }

    /// Raw noise value in `[-1, 1]`.
    pub fn value(&self, position: Vec3, step: u64) -> f32 {
        let s = self.spatial_resolution;
        let sample = self.generator.get([
            position.x as f64 * s,
            position.y as f64 * s,
            position.z as f64 * s,
            step as f64 * self.temporal_resolution,
        ]);
        (sample as f32).clamp(-1.0, 1.0)
    }

    /// Unit heading at `position` and `step`, ignoring the strategy.
    #[inline]
    pub fn flow(&self, position: Vec3, step: u64) -> Vec2 {
        let angle = self.value(position, step) * PI;
        let (sin, cos) = angle.sin_cos();
        Vec2::new(cos, sin)
    }

    /// Heading for a particle under the active strategy.
    ///
    /// `rng` is only drawn from when a pulse fires.
    pub fn sample(&self, position: Vec3, step: u64, rng: &mut SmallRng) -> Vec2 {
        match &self.mode {
            NoiseMode::Pulse(pulse) if pulse.fires_at(step) => pulse.kick(position, step, rng),
            _ => self.flow(position, step),
        }
    }

    /// Extra Z forcing for a particle under the active strategy.
    ///
    /// Flow reads the field at the axis-rotated point `(z, x, y)` so the Z
    /// push is decorrelated from the XY heading. A firing pulse draws a second
    /// kick at the particle's own position, so all three axes share its zone.
    pub fn sample_z(&self, position: Vec3, step: u64, rng: &mut SmallRng) -> f32 {
        match &self.mode {
            NoiseMode::Pulse(pulse) if pulse.fires_at(step) => pulse.kick(position, step, rng).x,
            _ => {
                let rotated = Vec3::new(position.z, position.x, position.y);
                self.flow(rotated, step).x
            }
        }
    }
}

impl std::fmt::Debug for NoiseField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseField")
            .field("spatial_resolution", &self.spatial_resolution)
            .field("temporal_resolution", &self.temporal_resolution)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}
