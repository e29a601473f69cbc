//! Particle record.

use glam::Vec3;

/// A single point moving on the sphere.
///
/// `origin` anchors the spring pull and only changes when the particle is
/// recycled. `color` is derived from speed on every update and carries no
/// physical meaning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Position at (re)spawn time.
    pub origin: Vec3,
    /// Current position.
    pub position: Vec3,
    /// Current velocity, tangent to the sphere.
    pub velocity: Vec3,
    /// Display color, RGB in `[0, 1]`.
    pub color: Vec3,
}

impl Particle {
    /// Particle anchored at its starting position, black until first update.
    pub fn new(position: Vec3, velocity: Vec3) -> Self {
        Self {
            origin: position,
            position,
            velocity,
            color: Vec3::ZERO,
        }
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Radial component of velocity relative to a sphere of `radius`.
    #[inline]
    pub fn radial_velocity(&self, radius: f32) -> f32 {
        self.velocity.dot(self.position / radius)
    }
}
