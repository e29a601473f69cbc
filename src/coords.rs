//! Conversions between spherical-polar and Cartesian coordinates.
//!
//! Polar coordinates use the physics convention with an implicit unit radius:
//! `theta` is the azimuth around the Z axis and `phi` is the angle measured
//! from +Z. [`to_polar`] returns `theta` in `(-π, π]` and `phi` in `[0, π]`.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A direction on the sphere, radius left implicit.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Polar {
    /// Azimuth around +Z, in radians.
    pub theta: f32,
    /// Inclination from +Z, in radians.
    pub phi: f32,
}

impl Polar {
    pub fn new(theta: f32, phi: f32) -> Self {
        Self { theta, phi }
    }
}

/// Point at `coords` on the sphere of the given radius.
#[inline]
pub fn to_cartesian(coords: Polar, radius: f32) -> Vec3 {
    let (sin_phi, cos_phi) = coords.phi.sin_cos();
    let (sin_theta, cos_theta) = coords.theta.sin_cos();

    Vec3::new(
        radius * sin_phi * cos_theta,
        radius * sin_phi * sin_theta,
        radius * cos_phi,
    )
}

/// Polar direction of `point`. The radial distance is discarded.
///
/// The origin has no direction. It trips a debug assertion and maps to
/// `Polar { theta: 0, phi: 0 }` in release builds.
pub fn to_polar(point: Vec3) -> Polar {
    let radius = point.length();
    debug_assert!(radius > 0.0, "to_polar called with a zero-length vector");

    if radius <= f32::MIN_POSITIVE {
        return Polar::default();
    }

    Polar {
        theta: point.y.atan2(point.x),
        phi: (point.z / radius).clamp(-1.0, 1.0).acos(),
    }
}
