//! Fibonacci-sphere core.

use std::f32::consts::TAU;

use rand::Rng;

use super::{Formation, FormationKind, ParticleVertex};
use crate::color::{Color, Hsl};
use crate::error::ConfigError;
use crate::palette::Palette;

/// Builder for the core formation.
#[derive(Debug, Clone)]
pub struct CoreBuilder {
    count: u32,
    radius: f32,
}

impl CoreBuilder {
    /// A core of `count` particles with the default radius (3.6).
    pub fn new(count: u32) -> Self {
        Self { count, radius: 3.6 }
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    /// Synthesize the core.
    ///
    /// Needs at least two particles: the lattice divides by `count - 1`.
    pub fn build<R>(&self, palette: Palette, rng: &mut R) -> Result<Formation, ConfigError>
    where
        R: Rng,
    {
        if self.count < 2 {
            return Err(ConfigError::TooFewParticles {
                formation: FormationKind::Core.name(),
                count: self.count,
                minimum: 2,
            });
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "core.radius",
                value: self.radius,
            });
        }

        let n = self.count as usize;
        let golden = (1.0 + 5.0_f32.sqrt()) / 2.0;
        let base = palette.core_color().to_hsl();

        let mut vertices = Vec::with_capacity(n);
        let mut colors = Vec::with_capacity(n);
        let mut hsl = Vec::with_capacity(n);

        for i in 0..n {
            let y = 1.0 - (i as f32 / (n - 1) as f32) * 2.0;
            let ring = (1.0 - y * y).max(0.0).sqrt();
            let theta = TAU * i as f32 / golden;

            let position = [
                theta.cos() * ring * self.radius,
                y * self.radius,
                theta.sin() * ring * self.radius,
            ];
            let normal = glam::Vec3::from(position).normalize();

            let jitter = Hsl::new(
                (base.h + rng.gen_range(-0.05..0.05)).rem_euclid(1.0),
                (base.s + rng.gen_range(-0.05..0.15)).max(0.7),
                (base.l + rng.gen_range(0.0..0.15)).min(0.9),
            );

            vertices.push(ParticleVertex {
                position,
                size: rng.gen_range(0.5..1.0),
                normal: normal.to_array(),
                original_hue: 0.0,
            });
            colors.push(Color::from_hsl(jitter).to_array());
            hsl.push(jitter);
        }

        Ok(Formation::new(FormationKind::Core, palette, vertices, colors, hsl))
    }
}
