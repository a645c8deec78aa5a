//! Bloom post-processing.
//!
//! The point pass renders into an offscreen float target. Bloom then runs
//! three fullscreen stages over it:
//!
//! 1. **Threshold**: keep only pixels whose luminance passes the threshold,
//!    written at half resolution.
//! 2. **Blur**: a separable gaussian, horizontal then vertical. The radius
//!    setting widens the kernel.
//! 3. **Composite**: the scene plus the blurred highlights scaled by the
//!    strength, written to the surface.
//!
//! [`bloom_shader`] holds all stages as separate fragment entry points
//! sharing one fullscreen-triangle vertex stage. The free functions below
//! evaluate the same math on the CPU.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

use super::smoothstep;
use crate::noise::wgsl_f32;

/// Width of the soft edge above the luminance threshold.
pub const BLOOM_SMOOTHING: f32 = 0.01;
/// Taps on each side of the blur center.
pub const BLOOM_TAPS: usize = 8;
/// Blur sigma in half-resolution texels at radius 0.
pub const BLOOM_SIGMA_MIN: f32 = 1.0;
/// Extra sigma per unit of radius.
pub const BLOOM_SIGMA_SCALE: f32 = 6.0;
/// Rec. 709 luma weights for linear RGB.
pub const LUMA_WEIGHTS: [f32; 3] = [0.2126, 0.7152, 0.0722];

/// Bloom tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomParams {
    /// Weight of the blurred highlights in the composite. Zero disables bloom.
    pub strength: f32,
    /// Spread of the blur, nominally in [0, 1].
    pub radius: f32,
    /// Luminance above which a pixel contributes.
    pub threshold: f32,
}

impl Default for BloomParams {
    fn default() -> Self {
        Self {
            strength: 0.09,
            radius: 0.45,
            threshold: 0.85,
        }
    }
}

impl BloomParams {
    /// Whether the threshold and blur stages need to run.
    pub fn is_active(&self) -> bool {
        self.strength > 0.0
    }
}

/// Uniform block shared by every bloom stage. 32 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BloomUniforms {
    /// One texel of the source texture in uv units.
    pub texel_size: [f32; 2],
    /// Blur axis, (1, 0) or (0, 1). Unused outside the blur stage.
    pub direction: [f32; 2],
    pub threshold: f32,
    pub smoothing: f32,
    pub strength: f32,
    pub sigma: f32,
}

impl BloomUniforms {
    pub const WGSL_STRUCT: &'static str = r#"struct BloomUniforms {
    texel_size: vec2<f32>,
    direction: vec2<f32>,
    threshold: f32,
    smoothing: f32,
    strength: f32,
    sigma: f32,
};
"#;

    pub fn new(params: &BloomParams, texel_size: Vec2, direction: Vec2) -> Self {
        Self {
            texel_size: texel_size.to_array(),
            direction: direction.to_array(),
            threshold: params.threshold,
            smoothing: BLOOM_SMOOTHING,
            strength: params.strength.max(0.0),
            sigma: blur_sigma(params.radius),
        }
    }
}

pub fn luminance(color: Vec3) -> f32 {
    color.dot(Vec3::from(LUMA_WEIGHTS))
}

/// The part of `color` that feeds the blur.
pub fn bright_pass(color: Vec3, threshold: f32) -> Vec3 {
    color * smoothstep(threshold, threshold + BLOOM_SMOOTHING, luminance(color))
}

/// Gaussian sigma, in half-resolution texels, for a radius setting.
pub fn blur_sigma(radius: f32) -> f32 {
    BLOOM_SIGMA_MIN + radius.max(0.0) * BLOOM_SIGMA_SCALE
}

/// Normalized blur weights for offsets `-BLOOM_TAPS..=BLOOM_TAPS`.
pub fn blur_weights(sigma: f32) -> [f32; 2 * BLOOM_TAPS + 1] {
    let mut weights = [0.0; 2 * BLOOM_TAPS + 1];
    let mut total = 0.0;
    for (i, w) in weights.iter_mut().enumerate() {
        let x = i as f32 - BLOOM_TAPS as f32;
        *w = (-(x * x) / (2.0 * sigma * sigma)).exp();
        total += *w;
    }
    for w in &mut weights {
        *w /= total;
    }
    weights
}

/// Final color for a pixel: scene plus weighted glow.
pub fn composite(scene: Vec3, glow: Vec3, strength: f32) -> Vec3 {
    scene + glow * strength
}

/// Full WGSL source of the bloom stages.
///
/// Entry points: `vs_main` (fullscreen triangle, draw 3 vertices),
/// `fs_threshold`, `fs_blur` and `fs_composite`. Bindings at group 0:
/// source texture (0), sampler (1), [`BloomUniforms`] (2) and the blurred
/// highlights (3), which only `fs_composite` reads.
pub fn bloom_shader() -> String {
    format!(
        r#"const BLOOM_TAPS: i32 = {taps};
const LUMA: vec3<f32> = vec3<f32>({l0}, {l1}, {l2});

{uniforms}
@group(0) @binding(0)
var source: texture_2d<f32>;
@group(0) @binding(1)
var source_sampler: sampler;
@group(0) @binding(2)
var<uniform> bloom: BloomUniforms;
@group(0) @binding(3)
var glow: texture_2d<f32>;

struct VertexOutput {{
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
}};

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {{
    var positions = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(3.0, -1.0),
        vec2<f32>(-1.0, 3.0),
    );
    var uvs = array<vec2<f32>, 3>(
        vec2<f32>(0.0, 1.0),
        vec2<f32>(2.0, 1.0),
        vec2<f32>(0.0, -1.0),
    );

    var out: VertexOutput;
    out.clip_position = vec4<f32>(positions[vertex_index], 0.0, 1.0);
    out.uv = uvs[vertex_index];
    return out;
}}

fn luminance(color: vec3<f32>) -> f32 {{
    return dot(color, LUMA);
}}

@fragment
fn fs_threshold(in: VertexOutput) -> @location(0) vec4<f32> {{
    let color = textureSampleLevel(source, source_sampler, in.uv, 0.0).rgb;
    let weight = smoothstep(bloom.threshold, bloom.threshold + bloom.smoothing, luminance(color));
    return vec4<f32>(color * weight, 1.0);
}}

@fragment
fn fs_blur(in: VertexOutput) -> @location(0) vec4<f32> {{
    let stride = bloom.direction * bloom.texel_size;
    let denom = 2.0 * bloom.sigma * bloom.sigma;
    var sum = vec3<f32>(0.0);
    var total = 0.0;
    for (var i: i32 = -BLOOM_TAPS; i <= BLOOM_TAPS; i += 1) {{
        let x = f32(i);
        let w = exp(-(x * x) / denom);
        sum += textureSampleLevel(source, source_sampler, in.uv + stride * x, 0.0).rgb * w;
        total += w;
    }}
    return vec4<f32>(sum / total, 1.0);
}}

@fragment
fn fs_composite(in: VertexOutput) -> @location(0) vec4<f32> {{
    let scene = textureSampleLevel(source, source_sampler, in.uv, 0.0).rgb;
    let halo = textureSampleLevel(glow, source_sampler, in.uv, 0.0).rgb;
    return vec4<f32>(scene + halo * bloom.strength, 1.0);
}}
"#,
        taps = BLOOM_TAPS,
        l0 = wgsl_f32(LUMA_WEIGHTS[0]),
        l1 = wgsl_f32(LUMA_WEIGHTS[1]),
        l2 = wgsl_f32(LUMA_WEIGHTS[2]),
        uniforms = BloomUniforms::WGSL_STRUCT,
    )
}
