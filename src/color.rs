//! Speed-to-color mapping.
//!
//! Color is a pure function of a particle's speed (and, for zoned schemes, its
//! position). The integrator calls [`ColorScheme::color`] once per particle per
//! step, and the same function is exposed through
//! [`Simulation::color_for`](crate::Simulation::color_for) so a presentation
//! layer never needs its own copy.
//!
//! # Usage
//!
//! ```ignore
//! let scheme = ColorScheme::Speed(SpeedGradient::new(Palette::Fire, 0.0, 0.2));
//! let rgb = scheme.color(0.05, Vec3::new(0.0, 0.0, 50.0));
//! ```

use crate::error::ConfigError;
use crate::zone::ZoneBoundary;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Pre-defined five-stop color palettes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Palette {
    /// Purple to yellow, perceptually uniform.
    Viridis,
    /// Deep navy to pale cyan.
    Ocean,
    /// Dark red to white-yellow. Slow particles glow dim.
    #[default]
    Fire,
    /// White to deep blue. Fast particles read darker.
    Ice,
    Grayscale,
}

impl Palette {
    /// Color stops, slow end first.
    pub fn colors(&self) -> [Vec3; 5] {
        match self {
            Palette::Viridis => [
                Vec3::new(0.267, 0.004, 0.329),
                Vec3::new(0.282, 0.140, 0.458),
                Vec3::new(0.127, 0.566, 0.551),
                Vec3::new(0.369, 0.789, 0.383),
                Vec3::new(0.993, 0.906, 0.144),
            ],
            Palette::Ocean => [
                Vec3::new(0.0, 0.05, 0.15),
                Vec3::new(0.0, 0.2, 0.4),
                Vec3::new(0.0, 0.4, 0.6),
                Vec3::new(0.2, 0.6, 0.8),
                Vec3::new(0.6, 0.9, 1.0),
            ],
            Palette::Fire => [
                Vec3::new(0.1, 0.0, 0.0),
                Vec3::new(0.5, 0.0, 0.0),
                Vec3::new(1.0, 0.3, 0.0),
                Vec3::new(1.0, 0.7, 0.0),
                Vec3::new(1.0, 1.0, 0.8),
            ],
            Palette::Ice => [
                Vec3::new(1.0, 1.0, 1.0),
                Vec3::new(0.8, 0.9, 1.0),
                Vec3::new(0.4, 0.7, 1.0),
                Vec3::new(0.1, 0.4, 0.8),
                Vec3::new(0.0, 0.1, 0.4),
            ],
            Palette::Grayscale => [
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.25, 0.25, 0.25),
                Vec3::new(0.5, 0.5, 0.5),
                Vec3::new(0.75, 0.75, 0.75),
                Vec3::new(1.0, 1.0, 1.0),
            ],
        }
    }

    /// Sample the palette at `t`, clamped to `[0, 1]`.
    ///
    /// Linear interpolation between neighbouring stops.
    pub fn sample(&self, t: f32) -> Vec3 {
        let stops = self.colors();
        let scaled = t.clamp(0.0, 1.0) * 4.0;
        let idx = (scaled.floor() as usize).min(4);
        let frac = scaled - idx as f32;

        stops[idx].lerp(stops[(idx + 1).min(4)], frac)
    }
}

/// Maps speed onto a palette.
///
/// `speed * speed_scale` is normalized into `[min_speed, max_speed]`, so
/// `speed_scale` acts as a brightness knob without touching the bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedGradient {
    pub palette: Palette,
    /// Speed mapped to the first stop.
    pub min_speed: f32,
    /// Speed mapped to the last stop.
    pub max_speed: f32,
    /// Multiplier applied to speed before normalizing.
    pub speed_scale: f32,
}

impl Default for SpeedGradient {
    fn default() -> Self {
        Self {
            palette: Palette::Fire,
            min_speed: 0.0,
            max_speed: 0.1,
            speed_scale: 1.0,
        }
    }
}

impl SpeedGradient {
    pub fn new(palette: Palette, min_speed: f32, max_speed: f32) -> Self {
        Self {
            palette,
            min_speed,
            max_speed,
            speed_scale: 1.0,
        }
    }

    /// Set the speed multiplier.
    pub fn with_speed_scale(mut self, scale: f32) -> Self {
        self.speed_scale = scale;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let (min, max) = (self.min_speed, self.max_speed);
        if !(min.is_finite() && max.is_finite() && min <= max) {
            return Err(ConfigError::InvalidRange { name: "speed", min, max });
        }
        if !self.speed_scale.is_finite() {
            return Err(ConfigError::InvalidParameter {
                name: "speed_scale",
                value: self.speed_scale,
            });
        }
        Ok(())
    }

    /// Color for `speed`.
    pub fn sample(&self, speed: f32) -> Vec3 {
        let span = self.max_speed - self.min_speed;
        let t = if span > 0.0 {
            (speed * self.speed_scale - self.min_speed) / span
        } else {
            // Degenerate range: a step at min_speed.
            if speed * self.speed_scale >= self.min_speed { 1.0 } else { 0.0 }
        };
        self.palette.sample(t)
    }
}

/// How particle color is derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColorScheme {
    /// One gradient everywhere.
    Speed(SpeedGradient),

    /// Two gradients split by a spatial boundary.
    ///
    /// With `v = boundary.value(position) - threshold`, particles with
    /// `v << 0` use `inner`, `v >> 0` use `outer`, and the band of width
    /// `blend_width` around the boundary mixes the two linearly. A
    /// non-positive `blend_width` gives a hard edge.
    Zoned {
        inner: SpeedGradient,
        outer: SpeedGradient,
        boundary: ZoneBoundary,
        threshold: f32,
        blend_width: f32,
    },
}

impl Default for ColorScheme {
    fn default() -> Self {
        ColorScheme::Speed(SpeedGradient::default())
    }
}

impl ColorScheme {
    /// Reject gradients and boundaries that would produce NaN colors.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        match self {
            ColorScheme::Speed(gradient) => gradient.validate(),
            ColorScheme::Zoned {
                inner,
                outer,
                boundary,
                threshold,
                blend_width,
            } => {
                inner.validate()?;
                outer.validate()?;
                boundary.validate()?;
                for (name, value) in [("threshold", *threshold), ("blend_width", *blend_width)] {
                    if !value.is_finite() {
                        return Err(ConfigError::InvalidParameter { name, value });
                    }
                }
                Ok(())
            }
        }
    }

    /// Display color for a particle moving at `speed` at `position`.
    pub fn color(&self, speed: f32, position: Vec3) -> Vec3 {
        match self {
            ColorScheme::Speed(gradient) => gradient.sample(speed),
            ColorScheme::Zoned {
                inner,
                outer,
                boundary,
                threshold,
                blend_width,
            } => {
                let v = boundary.value(position) - threshold;
                let t = if *blend_width > 0.0 {
                    (v / blend_width + 0.5).clamp(0.0, 1.0)
                } else if v < 0.0 {
                    0.0
                } else {
                    1.0
                };

                if t <= 0.0 {
                    inner.sample(speed)
                } else if t >= 1.0 {
                    outer.sample(speed)
                } else {
                    inner.sample(speed).lerp(outer.sample(speed), t)
                }
            }
        }
    }
}
