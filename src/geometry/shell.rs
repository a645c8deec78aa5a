//! Noise-displaced cylindrical shell.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

use super::{Formation, FormationKind, ParticleVertex};
use crate::error::ConfigError;
use crate::noise::{NoiseKernel, FBM_OCTAVES};
use crate::palette::Palette;

/// Builder for the cylindrical shell formation.
///
/// # Example
///
/// ```
/// use pulsar::geometry::ShellBuilder;
/// use pulsar::noise::Simplex;
/// use pulsar::palette::Palette;
/// use rand::{rngs::SmallRng, SeedableRng};
///
/// let mut rng = SmallRng::seed_from_u64(7);
/// let shell = ShellBuilder::new(1_000)
///     .with_radius(15.0)
///     .build(Palette::Fire, &Simplex, &mut rng)
///     .unwrap();
/// assert_eq!(shell.count(), 1_000);
/// ```
#[derive(Debug, Clone)]
pub struct ShellBuilder {
    count: u32,
    radius: f32,
    height: f32,
    displacement_strength: f32,
}

impl ShellBuilder {
    /// A shell of `count` particles with the default dimensions
    /// (radius 15, height 30, displacement 3).
    pub fn new(count: u32) -> Self {
        Self {
            count,
            radius: 15.0,
            height: 30.0,
            displacement_strength: 3.0,
        }
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }

    /// Maximum distance noise may push a particle off the cylinder,
    /// per unit of fbm output.
    pub fn with_displacement_strength(mut self, strength: f32) -> Self {
        self.displacement_strength = strength;
        self
    }

    pub fn displacement_strength(&self) -> f32 {
        self.displacement_strength
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.count == 0 {
            return Err(ConfigError::TooFewParticles {
                formation: FormationKind::Shell.name(),
                count: self.count,
                minimum: 1,
            });
        }
        for (name, value) in [
            ("shell.radius", self.radius),
            ("shell.height", self.height),
            ("shell.displacement_strength", self.displacement_strength),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }

    /// Synthesize the shell.
    pub fn build<K, R>(&self, palette: Palette, kernel: &K, rng: &mut R) -> Result<Formation, ConfigError>
    where
        K: NoiseKernel + ?Sized,
        R: Rng,
    {
        self.validate()?;

        let n = self.count as usize;
        let mut vertices = Vec::with_capacity(n);
        let mut colors = Vec::with_capacity(n);

        let noise_scale = 1.0 / self.radius * 1.2;
        let strength = self.displacement_strength;

        for _ in 0..n {
            let phi = rng.gen::<f32>() * TAU;
            let h = (rng.gen::<f32>() - 0.5) * self.height;
            let base = Vec3::new(self.radius * phi.cos(), h, self.radius * phi.sin());
            let normal = Vec3::new(base.x, 0.0, base.z).normalize();

            let displacement = kernel.fbm3(base * noise_scale, FBM_OCTAVES) * strength;
            let position = base + normal * displacement;

            let ramp = palette.sample((phi / TAU).fract());
            let original_hue = ramp.to_hsl().h;
            let color = ramp.offset_hsl(
                rng.gen_range(-0.01..0.01),
                rng.gen_range(-0.02..0.03),
                rng.gen_range(-0.02..0.03),
            );

            let size = shell_size_factor(displacement, strength) * rng.gen_range(0.7..1.1);

            vertices.push(ParticleVertex {
                position: position.to_array(),
                size,
                normal: normal.to_array(),
                original_hue,
            });
            colors.push(color.to_array());
        }

        Ok(Formation::new(
            FormationKind::Shell,
            palette,
            vertices,
            colors,
            Vec::new(),
        ))
    }
}

/// Size multiplier for a particle displaced by `displacement`.
///
/// Particles pushed furthest from the cylinder shrink, down to a floor of
/// 0.3. Non-increasing in `|displacement|`.
pub fn shell_size_factor(displacement: f32, strength: f32) -> f32 {
    (1.0 - displacement.abs() / (strength + 1e-6)).max(0.3)
}
