//! Simulation configuration.
//!
//! A [`SimulationConfig`] can be built in code or loaded from JSON. Every
//! field has a default, so a config file only needs the values it changes:
//!
//! ```json
//! {
//!   "sphere_radius": 50.0,
//!   "particle_count": 20000,
//!   "noise": { "spatial_resolution": 0.05, "mode": { "Pulse": { "loop_frequency": 60 } } },
//!   "colors": { "Speed": { "palette": "Fire", "max_speed": 0.12 } }
//! }
//! ```

use crate::color::ColorScheme;
use crate::error::ConfigError;
use crate::noise::NoiseConfig;
use crate::spawn::SpawnConfig;
use crate::store::PhysicsConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Radius shared by every particle. Must be positive.
    pub sphere_radius: f32,
    /// Number of particles. Fixed for the lifetime of the simulation.
    pub particle_count: usize,
    /// Seed for the noise tables and every per-particle random stream.
    pub seed: u64,
    pub noise: NoiseConfig,
    pub physics: PhysicsConfig,
    pub spawn: SpawnConfig,
    pub colors: ColorScheme,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            sphere_radius: 50.0,
            particle_count: 100_000,
            seed: 0,
            noise: NoiseConfig::default(),
            physics: PhysicsConfig::default(),
            spawn: SpawnConfig::default(),
            colors: ColorScheme::default(),
        }
    }
}

impl SimulationConfig {
    /// Check every construction-time invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sphere_radius.is_finite() && self.sphere_radius > 0.0) {
            return Err(ConfigError::InvalidRadius(self.sphere_radius));
        }
        self.noise.validate()?;
        self.physics.validate()?;
        self.colors.validate()?;

        let spread = self.spawn.velocity_spread;
        if !(spread.is_finite() && spread.min_element() >= 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "velocity_spread",
                value: spread.min_element(),
            });
        }
        Ok(())
    }

    /// Parse a config from a JSON string and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
