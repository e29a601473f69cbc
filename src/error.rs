//! Error types for sphere-flow.
//!
//! All validation happens when a simulation is built. Once running, `update`
//! has no failure surface.

use std::fmt;

/// Errors produced while loading or validating a [`SimulationConfig`](crate::SimulationConfig).
#[derive(Debug)]
pub enum ConfigError {
    /// Sphere radius must be finite and strictly positive.
    InvalidRadius(f32),
    /// Noise resolutions must be finite and strictly positive.
    InvalidResolution {
        /// Which resolution was rejected (`"spatial"` or `"temporal"`).
        axis: &'static str,
        /// The offending value.
        value: f32,
    },
    /// Friction must lie in `[0, 1)`.
    InvalidFriction(f32),
    /// Any other tunable outside its allowed range.
    InvalidParameter {
        /// Parameter name as it appears in the config file.
        name: &'static str,
        /// The offending value.
        value: f32,
    },
    /// A `[min, max]` pair that is non-finite or reversed.
    InvalidRange {
        name: &'static str,
        min: f32,
        max: f32,
    },
    /// Failed to read the config file.
    Io(std::io::Error),
    /// Failed to parse the config file.
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidRadius(r) => {
                write!(f, "Sphere radius must be finite and greater than zero, got {}", r)
            }
            ConfigError::InvalidResolution { axis, value } => write!(
                f,
                "Noise {} resolution must be finite and greater than zero, got {}",
                axis, value
            ),
            ConfigError::InvalidFriction(v) => {
                write!(f, "Friction must be in the range [0, 1), got {}", v)
            }
            ConfigError::InvalidParameter { name, value } => {
                write!(f, "Parameter `{}` is out of range, got {}", name, value)
            }
            ConfigError::InvalidRange { name, min, max } => write!(
                f,
                "Range `{}` must be finite with min <= max, got [{}, {}]",
                name, min, max
            ),
            ConfigError::Io(e) => write!(f, "Failed to read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "Failed to parse config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Errors that can occur when building or driving a simulation.
#[derive(Debug)]
pub enum SimulationError {
    /// The configuration was rejected.
    Config(ConfigError),
    /// `init()` was called on a simulation that already holds particles.
    AlreadyInitialized,
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::Config(e) => write!(f, "Invalid configuration: {}", e),
            SimulationError::AlreadyInitialized => {
                write!(f, "Simulation was already initialized. Call init() exactly once.")
            }
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::Config(e) => Some(e),
            SimulationError::AlreadyInitialized => None,
        }
    }
}

impl From<ConfigError> for SimulationError {
    fn from(e: ConfigError) -> Self {
        SimulationError::Config(e)
    }
}
