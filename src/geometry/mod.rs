//! Point-cloud synthesis for the two formations.
//!
//! A [`Formation`] is built once per theme and never mutated afterwards:
//!
//! - [`ShellBuilder`] scatters particles over a cylinder and pushes each one
//!   out along its normal by baked fbm noise. Colors follow the theme ramp
//!   around the circumference.
//! - [`CoreBuilder`] places particles on a Fibonacci sphere and caches a
//!   jittered HSL per particle so the colors can be hue-rotated every frame
//!   with [`Formation::recolor_into`].
//!
//! Both builders take the RNG as a parameter so a seeded
//! [`SmallRng`](rand::rngs::SmallRng) reproduces the same cloud.

mod shell;
mod sphere;

pub use shell::{shell_size_factor, ShellBuilder};
pub use sphere::CoreBuilder;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::color::{hsl_to_linear, Hsl};
use crate::palette::Palette;

/// Static per-particle attributes, uploaded once as an instance buffer.
///
/// Colors live in a separate stream so the core can re-upload them every
/// frame without touching this buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct ParticleVertex {
    /// Rest position in formation space.
    pub position: [f32; 3],
    /// Base point size before pulsing and perspective.
    pub size: f32,
    /// Unit direction that noise and shockwaves push along.
    pub normal: [f32; 3],
    /// Ramp hue before jitter (shell only, 0 for the core). Not read by
    /// the shader.
    pub original_hue: f32,
}

/// Which of the two formations a dataset is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormationKind {
    /// Noise-displaced cylinder.
    Shell,
    /// Fibonacci sphere at the center.
    Core,
}

impl FormationKind {
    pub fn name(&self) -> &'static str {
        match self {
            FormationKind::Shell => "shell",
            FormationKind::Core => "core",
        }
    }
}

/// An immutable particle dataset.
#[derive(Debug, Clone)]
pub struct Formation {
    kind: FormationKind,
    palette: Palette,
    vertices: Vec<ParticleVertex>,
    colors: Vec<[f32; 3]>,
    hsl: Vec<Hsl>,
    bounding_radius: f32,
}

impl Formation {
    pub(crate) fn new(
        kind: FormationKind,
        palette: Palette,
        vertices: Vec<ParticleVertex>,
        colors: Vec<[f32; 3]>,
        hsl: Vec<Hsl>,
    ) -> Self {
        debug_assert_eq!(vertices.len(), colors.len());
        debug_assert!(hsl.is_empty() || hsl.len() == colors.len());

        let bounding_radius = vertices
            .iter()
            .map(|v| Vec3::from(v.position).length())
            .fold(0.0, f32::max);

        Self {
            kind,
            palette,
            vertices,
            colors,
            hsl,
            bounding_radius,
        }
    }

    pub fn kind(&self) -> FormationKind {
        self.kind
    }

    /// Theme the formation was built with.
    pub fn palette(&self) -> Palette {
        self.palette
    }

    pub fn vertices(&self) -> &[ParticleVertex] {
        &self.vertices
    }

    /// Initial linear RGB colors, parallel to [`vertices`](Self::vertices).
    pub fn colors(&self) -> &[[f32; 3]] {
        &self.colors
    }

    /// Per-particle base HSL. Empty for shells.
    pub fn hsl_cache(&self) -> &[Hsl] {
        &self.hsl
    }

    pub fn count(&self) -> u32 {
        self.vertices.len() as u32
    }

    /// Largest distance of any rest position from the origin.
    pub fn bounding_radius(&self) -> f32 {
        self.bounding_radius
    }

    /// Write hue-rotated colors for `time` into `out`.
    ///
    /// Each particle's hue becomes `(h + time * speed) mod 1` with its cached
    /// saturation and lightness. `out` must have one slot per particle in
    /// the HSL cache; no allocation happens here.
    pub fn recolor_into(&self, time: f32, speed: f32, out: &mut [[f32; 3]]) {
        debug_assert_eq!(out.len(), self.hsl.len());
        let shift = time * speed;
        for (slot, hsl) in out.iter_mut().zip(&self.hsl) {
            let h = (hsl.h + shift).rem_euclid(1.0);
            *slot = hsl_to_linear(h, hsl.s, hsl.l);
        }
    }
}
