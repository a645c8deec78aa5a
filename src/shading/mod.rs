//! The per-frame point shader and its CPU reference.
//!
//! Every particle is drawn as a camera-facing quad. The vertex stage moves
//! it off its rest position in three layers:
//!
//! 1. **Noise breathing**: animated fbm along the particle normal.
//! 2. **Shockwave**: a spherical front expanding from the last click pushes
//!    particles outward and enlarges them while it passes.
//! 3. **Repulsion**: particles near the pointer are pushed away from it.
//!
//! The fragment stage draws a soft circular glow, tints particles caught in
//! the shockwave with a fiery gradient, and fades distant particles.
//! Output is blended additively.
//!
//! All constants below are shared by [`point_shader`], which emits them as
//! WGSL `const`s, and by [`reference`], which evaluates the same math on
//! the CPU for tests. The [`bloom`] post-process runs over the finished
//! point image.

pub mod bloom;
mod program;
pub mod reference;
mod uniforms;

pub use bloom::{bloom_shader, BloomParams, BloomUniforms};
pub use program::point_shader;
pub use uniforms::{FrameContext, ShaderUniforms, ViewState};

/// Scale applied to rest positions before sampling breathing noise.
pub const NOISE_POSITION_SCALE: f32 = 0.04;
/// Scale applied to scene time before sampling breathing noise.
pub const NOISE_TIME_SCALE: f32 = 0.3;
/// Breathing displacement per unit of fbm output.
pub const NOISE_AMPLITUDE: f32 = 1.2;

/// Seconds a shockwave stays alive after its click.
pub const WAVE_LIFETIME: f32 = 2.5;
/// Outward push at full wave intensity.
pub const WAVE_PUSH: f32 = 7.0;
/// Extra point size at full wave intensity.
pub const WAVE_SIZE_BONUS: f32 = 1.5;
/// Below this distance from the click the push falls back to the normal.
pub const WAVE_DEGENERATE_DISTANCE: f32 = 1e-3;

pub const PULSE_SPEED: f32 = 2.5;
pub const PULSE_AMPLITUDE: f32 = 0.3;
pub const PULSE_RADIAL_PHASE: f32 = 0.1;

/// Pixels of point size per unit of size at unit depth.
pub const POINT_SCALE: f32 = 1500.0;

/// Radius (in quad units) of the solid center.
pub const GLOW_CORE_RADIUS: f32 = 0.1;
/// Radius (in quad units) where the halo reaches zero.
pub const GLOW_OUTER_RADIUS: f32 = 0.6;

/// How far wave tint pulls the color toward the fiery gradient.
pub const WAVE_TINT: f32 = 0.85;
/// Brightness gain at full wave intensity.
pub const WAVE_BRIGHTEN: f32 = 1.5;
/// Red, orange, white.
pub const FIERY_STOPS: [[f32; 3]; 3] = [[0.9, 0.2, 0.0], [1.0, 0.7, 0.0], [1.0, 1.0, 0.9]];

/// Fade starts at this multiple of the formation radius...
pub const FADE_NEAR: f32 = 0.9;
/// ...and reaches zero at this one.
pub const FADE_FAR: f32 = 1.8;

/// Upper bound on output color components.
pub const COLOR_CEILING: f32 = 3.5;

/// Configurable inputs to the shader, copied into every uniform block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadingParams {
    pub wave_speed: f32,
    pub wave_thickness: f32,
    pub repel_radius: f32,
    pub repel_strength: f32,
    pub formation_radius: f32,
}

impl Default for ShadingParams {
    fn default() -> Self {
        Self {
            wave_speed: 40.0,
            wave_thickness: 5.0,
            repel_radius: 8.0,
            repel_strength: 1.5,
            formation_radius: 25.0,
        }
    }
}

/// Hermite interpolation, as WGSL `smoothstep` with `edge0 < edge1`.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
