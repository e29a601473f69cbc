//! Render-side views of particle state.
//!
//! The core knows nothing about any particular graphics API. These helpers
//! copy positions and colors into caller-owned buffers, one entry per
//! particle in store order.

use crate::particle::Particle;
use bytemuck::{Pod, Zeroable};

/// Interleaved vertex for point rendering.
///
/// `#[repr(C)]` and `Pod`, so a `&[RenderVertex]` can be handed to a GPU
/// upload as raw bytes via [`bytemuck::cast_slice`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct RenderVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl From<&Particle> for RenderVertex {
    fn from(p: &Particle) -> Self {
        Self {
            position: p.position.to_array(),
            color: p.color.to_array(),
        }
    }
}

/// Write `xyz` triples into `out`. Returns the number of particles written,
/// which is limited by `out.len() / 3`.
pub fn write_positions(particles: &[Particle], out: &mut [f32]) -> usize {
    let mut written = 0;
    for (p, slot) in particles.iter().zip(out.chunks_exact_mut(3)) {
        p.position.write_to_slice(slot);
        written += 1;
    }
    written
}

/// Write `rgb` triples into `out`. Returns the number of particles written.
pub fn write_colors(particles: &[Particle], out: &mut [f32]) -> usize {
    let mut written = 0;
    for (p, slot) in particles.iter().zip(out.chunks_exact_mut(3)) {
        p.color.write_to_slice(slot);
        written += 1;
    }
    written
}

/// Fill `out` with one vertex per particle, reusing its allocation.
pub fn fill_vertices(particles: &[Particle], out: &mut Vec<RenderVertex>) {
    out.clear();
    out.extend(particles.iter().map(RenderVertex::from));
}
