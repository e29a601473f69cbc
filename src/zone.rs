//! Spatial zone boundary shared by the pulse noise strategy and zoned coloring.

use crate::error::ConfigError;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A wavy boundary splitting space into two zones.
///
/// `value(p) = p.x + amplitude * cos(p.y / wavelength)`. Callers compare the
/// value against their own threshold: below is the "inner" zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneBoundary {
    /// Height of the cosine ripple along X.
    pub amplitude: f32,
    /// Divisor applied to `y` before taking the cosine.
    pub wavelength: f32,
}

impl Default for ZoneBoundary {
    fn default() -> Self {
        Self {
            amplitude: 3.0,
            wavelength: 2.0,
        }
    }
}

impl ZoneBoundary {
    pub fn new(amplitude: f32, wavelength: f32) -> Self {
        Self { amplitude, wavelength }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if !self.amplitude.is_finite() {
            return Err(ConfigError::InvalidParameter {
                name: "amplitude",
                value: self.amplitude,
            });
        }
        if !(self.wavelength.is_finite() && self.wavelength != 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "wavelength",
                value: self.wavelength,
            });
        }
        Ok(())
    }

    /// Scalar boundary value at `position`.
    #[inline]
    pub fn value(&self, position: Vec3) -> f32 {
        position.x + self.amplitude * (position.y / self.wavelength).cos()
    }
}
