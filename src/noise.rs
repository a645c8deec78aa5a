//! 3-D simplex noise and fractal Brownian motion.
//!
//! The same algorithm runs in two places: on the CPU when formations are
//! baked, and on the GPU every frame inside the point shader. To keep the
//! two from drifting apart, the algorithm is specified once by the
//! [`NoiseKernel`] contract and its shared `FBM_*` constants, and then
//! implemented three times:
//!
//! - [`Simplex`] - scalar, corner-by-corner evaluation used for baking.
//! - [`LaneSimplex`] - a four-lane port that follows the WGSL statement by
//!   statement. It is the CPU stand-in for the shader.
//! - [`noise_wgsl`] - the WGSL source compiled into the point shader,
//!   generated from the same constants.
//!
//! The conformance tests check that the two CPU kernels agree and that the
//! WGSL validates. `gpu::NoiseProbe` runs the WGSL on a real device and
//! compares it against [`Simplex`].
//!
//! # Example
//!
//! ```
//! use pulsar::noise::{NoiseKernel, Simplex, FBM_OCTAVES};
//! use glam::Vec3;
//!
//! let n = Simplex.noise3(Vec3::new(0.3, 1.7, -2.4));
//! assert!((-1.0..=1.0).contains(&n));
//!
//! let f = Simplex.fbm3(Vec3::new(0.3, 1.7, -2.4), FBM_OCTAVES);
//! assert!(f.abs() <= 0.875 + 1e-4);
//! ```

use glam::{Vec3, Vec3Swizzles, Vec4, Vec4Swizzles};

/// Octaves used by both the bake and the per-frame displacement.
pub const FBM_OCTAVES: u32 = 3;
/// Amplitude of the first octave.
pub const FBM_AMPLITUDE: f32 = 0.5;
/// Frequency of the first octave.
pub const FBM_FREQUENCY: f32 = 0.8;
/// Amplitude multiplier between octaves.
pub const FBM_GAIN: f32 = 0.5;
/// Frequency multiplier between octaves.
pub const FBM_LACUNARITY: f32 = 2.0;
/// How far each octave's sample point drifts per unit of time, relative to
/// its frequency.
pub const FBM_TIME_DRIFT: f32 = 0.10;

const SKEW: f32 = 1.0 / 3.0;
const UNSKEW: f32 = 1.0 / 6.0;
const GRADIENT_RING: f32 = 0.142857142857;

/// A deterministic 3-D gradient noise source.
///
/// Implementors only provide [`noise3`](NoiseKernel::noise3); the fbm
/// composition is shared so every kernel sums octaves the same way.
pub trait NoiseKernel {
    /// Simplex noise at `p`, in [-1, 1].
    fn noise3(&self, p: Vec3) -> f32;

    /// Static fractal Brownian motion:
    /// `sum(0.5 * 0.5^i * noise3(p * 0.8 * 2^i))` over `octaves`.
    fn fbm3(&self, p: Vec3, octaves: u32) -> f32 {
        let mut value = 0.0;
        let mut amplitude = FBM_AMPLITUDE;
        let mut frequency = FBM_FREQUENCY;
        for _ in 0..octaves {
            value += amplitude * self.noise3(p * frequency);
            amplitude *= FBM_GAIN;
            frequency *= FBM_LACUNARITY;
        }
        value
    }

    /// Time-animated fbm as evaluated by the point shader.
    ///
    /// Each octave's sample point is offset by `frequency * time * 0.1` on
    /// all three axes. At `time == 0` this equals [`fbm3`](NoiseKernel::fbm3).
    fn fbm3_animated(&self, p: Vec3, time: f32, octaves: u32) -> f32 {
        let mut value = 0.0;
        let mut amplitude = FBM_AMPLITUDE;
        let mut frequency = FBM_FREQUENCY;
        for _ in 0..octaves {
            let drift = Vec3::splat(frequency * time * FBM_TIME_DRIFT);
            value += amplitude * self.noise3(p * frequency + drift);
            amplitude *= FBM_GAIN;
            frequency *= FBM_LACUNARITY;
        }
        value
    }
}

// ============================================================================
// Scalar kernel
// ============================================================================

/// Scalar simplex noise, one tetrahedron corner at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct Simplex;

#[inline]
fn mod289(x: f32) -> f32 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

#[inline]
fn permute(x: f32) -> f32 {
    mod289((x * 34.0 + 1.0) * x)
}

#[inline]
fn taylor_inv_sqrt(r: f32) -> f32 {
    1.79284291400159 - 0.85373472095314 * r
}

#[inline]
fn step(edge: f32, x: f32) -> f32 {
    if x < edge {
        0.0
    } else {
        1.0
    }
}

impl NoiseKernel for Simplex {
    fn noise3(&self, v: Vec3) -> f32 {
        let i = (v + Vec3::splat(v.dot(Vec3::splat(SKEW)))).floor();
        let x0 = v - i + Vec3::splat(i.dot(Vec3::splat(UNSKEW)));

        // Which simplex of the skewed cube we are in
        let g = Vec3::new(step(x0.y, x0.x), step(x0.z, x0.y), step(x0.x, x0.z));
        let l = Vec3::ONE - g;
        let l_zxy = Vec3::new(l.z, l.x, l.y);
        let i1 = g.min(l_zxy);
        let i2 = g.max(l_zxy);

        let offsets = [Vec3::ZERO, i1, i2, Vec3::ONE];
        let corners = [
            x0,
            x0 - i1 + Vec3::splat(UNSKEW),
            x0 - i2 + Vec3::splat(SKEW),
            x0 - Vec3::splat(0.5),
        ];

        let im = Vec3::new(mod289(i.x), mod289(i.y), mod289(i.z));
        let ns = Vec3::new(2.0 * GRADIENT_RING, 0.5 * GRADIENT_RING - 1.0, GRADIENT_RING);

        let mut sum = 0.0;
        for (offset, x) in offsets.iter().zip(corners.iter()) {
            let p = permute(permute(permute(im.z + offset.z) + im.y + offset.y) + im.x + offset.x);

            // Map the hash onto a 7x7 ring of gradients on the octahedron
            let j = p - 49.0 * (p * ns.z * ns.z).floor();
            let gx_ = (j * ns.z).floor();
            let gy_ = (j - 7.0 * gx_).floor();
            let gx = gx_ * ns.x + ns.y;
            let gy = gy_ * ns.x + ns.y;
            let h = 1.0 - gx.abs() - gy.abs();
            let sh = -step(h, 0.0);

            let mut grad = Vec3::new(
                gx + (gx.floor() * 2.0 + 1.0) * sh,
                gy + (gy.floor() * 2.0 + 1.0) * sh,
                h,
            );
            grad *= taylor_inv_sqrt(grad.dot(grad));

            let m = (0.6 - x.dot(*x)).max(0.0);
            let m2 = m * m;
            sum += m2 * m2 * grad.dot(*x);
        }

        42.0 * sum
    }
}

// ============================================================================
// Lane kernel (mirrors the WGSL)
// ============================================================================

/// Four-lane simplex noise written the way the shader computes it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LaneSimplex;

#[inline]
fn mod289_3(x: Vec3) -> Vec3 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

#[inline]
fn mod289_4(x: Vec4) -> Vec4 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

#[inline]
fn permute4(x: Vec4) -> Vec4 {
    mod289_4((x * 34.0 + Vec4::ONE) * x)
}

#[inline]
fn taylor_inv_sqrt4(r: Vec4) -> Vec4 {
    Vec4::splat(1.79284291400159) - 0.85373472095314 * r
}

#[inline]
fn step3(edge: Vec3, x: Vec3) -> Vec3 {
    Vec3::select(x.cmplt(edge), Vec3::ZERO, Vec3::ONE)
}

#[inline]
fn step4(edge: Vec4, x: Vec4) -> Vec4 {
    Vec4::select(x.cmplt(edge), Vec4::ZERO, Vec4::ONE)
}

impl NoiseKernel for LaneSimplex {
    fn noise3(&self, v: Vec3) -> f32 {
        let d = Vec4::new(0.0, 0.5, 1.0, 2.0);

        // First corner
        let i = (v + Vec3::splat(v.dot(Vec3::splat(SKEW)))).floor();
        let x0 = v - i + Vec3::splat(i.dot(Vec3::splat(UNSKEW)));

        // Other corners
        let g = step3(x0.yzx(), x0);
        let l = Vec3::ONE - g;
        let i1 = g.min(l.zxy());
        let i2 = g.max(l.zxy());

        let x1 = x0 - i1 + Vec3::splat(UNSKEW);
        let x2 = x0 - i2 + Vec3::splat(SKEW);
        let x3 = x0 - Vec3::splat(d.y);

        // Permutations
        let i = mod289_3(i);
        let p = permute4(
            permute4(
                permute4(Vec4::splat(i.z) + Vec4::new(0.0, i1.z, i2.z, 1.0))
                    + Vec4::splat(i.y)
                    + Vec4::new(0.0, i1.y, i2.y, 1.0),
            ) + Vec4::splat(i.x)
                + Vec4::new(0.0, i1.x, i2.x, 1.0),
        );

        // Gradients
        let ns = GRADIENT_RING * d.wyz() - d.xzx();
        let j = p - 49.0 * (p * ns.z * ns.z).floor();

        let x_ = (j * ns.z).floor();
        let y_ = (j - 7.0 * x_).floor();

        let x = x_ * ns.x + Vec4::splat(ns.y);
        let y = y_ * ns.x + Vec4::splat(ns.y);
        let h = Vec4::ONE - x.abs() - y.abs();

        let b0 = Vec4::new(x.x, x.y, y.x, y.y);
        let b1 = Vec4::new(x.z, x.w, y.z, y.w);

        let s0 = b0.floor() * 2.0 + Vec4::ONE;
        let s1 = b1.floor() * 2.0 + Vec4::ONE;
        let sh = -step4(h, Vec4::ZERO);

        let a0 = b0.xzyw() + s0.xzyw() * sh.xxyy();
        let a1 = b1.xzyw() + s1.xzyw() * sh.zzww();

        let mut p0 = Vec3::new(a0.x, a0.y, h.x);
        let mut p1 = Vec3::new(a0.z, a0.w, h.y);
        let mut p2 = Vec3::new(a1.x, a1.y, h.z);
        let mut p3 = Vec3::new(a1.z, a1.w, h.w);

        // Normalize gradients
        let norm = taylor_inv_sqrt4(Vec4::new(p0.dot(p0), p1.dot(p1), p2.dot(p2), p3.dot(p3)));
        p0 *= norm.x;
        p1 *= norm.y;
        p2 *= norm.z;
        p3 *= norm.w;

        // Mix final noise value
        let m = (Vec4::splat(0.6) - Vec4::new(x0.dot(x0), x1.dot(x1), x2.dot(x2), x3.dot(x3)))
            .max(Vec4::ZERO);
        let m = m * m;
        42.0 * (m * m).dot(Vec4::new(p0.dot(x0), p1.dot(x1), p2.dot(x2), p3.dot(x3)))
    }
}

// ============================================================================
// WGSL
// ============================================================================

/// WGSL simplex noise. Identical in structure to [`LaneSimplex`].
pub const SIMPLEX_WGSL: &str = r#"
fn mod289_3(x: vec3<f32>) -> vec3<f32> {
    return x - floor(x * (1.0 / 289.0)) * 289.0;
}

fn mod289_4(x: vec4<f32>) -> vec4<f32> {
    return x - floor(x * (1.0 / 289.0)) * 289.0;
}

fn permute4(x: vec4<f32>) -> vec4<f32> {
    return mod289_4(((x * 34.0) + 1.0) * x);
}

fn taylor_inv_sqrt4(r: vec4<f32>) -> vec4<f32> {
    return 1.79284291400159 - 0.85373472095314 * r;
}

// 3D simplex noise in [-1, 1]
fn noise3(v: vec3<f32>) -> f32 {
    let C = vec2<f32>(1.0 / 6.0, 1.0 / 3.0);
    let D = vec4<f32>(0.0, 0.5, 1.0, 2.0);

    // First corner
    var i = floor(v + dot(v, vec3<f32>(C.y)));
    let x0 = v - i + dot(i, vec3<f32>(C.x));

    // Other corners
    let g = step(x0.yzx, x0.xyz);
    let l = 1.0 - g;
    let i1 = min(g.xyz, l.zxy);
    let i2 = max(g.xyz, l.zxy);

    let x1 = x0 - i1 + C.x;
    let x2 = x0 - i2 + C.y;
    let x3 = x0 - D.yyy;

    // Permutations
    i = mod289_3(i);
    let p = permute4(permute4(permute4(
        i.z + vec4<f32>(0.0, i1.z, i2.z, 1.0))
      + i.y + vec4<f32>(0.0, i1.y, i2.y, 1.0))
      + i.x + vec4<f32>(0.0, i1.x, i2.x, 1.0));

    // Gradients
    let n_ = 0.142857142857;
    let ns = n_ * D.wyz - D.xzx;

    let j = p - 49.0 * floor(p * ns.z * ns.z);

    let x_ = floor(j * ns.z);
    let y_ = floor(j - 7.0 * x_);

    let x = x_ * ns.x + ns.yyyy;
    let y = y_ * ns.x + ns.yyyy;
    let h = 1.0 - abs(x) - abs(y);

    let b0 = vec4<f32>(x.xy, y.xy);
    let b1 = vec4<f32>(x.zw, y.zw);

    let s0 = floor(b0) * 2.0 + 1.0;
    let s1 = floor(b1) * 2.0 + 1.0;
    let sh = -step(h, vec4<f32>(0.0));

    let a0 = b0.xzyw + s0.xzyw * sh.xxyy;
    let a1 = b1.xzyw + s1.xzyw * sh.zzww;

    var p0 = vec3<f32>(a0.xy, h.x);
    var p1 = vec3<f32>(a0.zw, h.y);
    var p2 = vec3<f32>(a1.xy, h.z);
    var p3 = vec3<f32>(a1.zw, h.w);

    // Normalize gradients
    let norm = taylor_inv_sqrt4(vec4<f32>(dot(p0, p0), dot(p1, p1), dot(p2, p2), dot(p3, p3)));
    p0 *= norm.x;
    p1 *= norm.y;
    p2 *= norm.z;
    p3 *= norm.w;

    // Mix final noise value
    var m = max(0.6 - vec4<f32>(dot(x0, x0), dot(x1, x1), dot(x2, x2), dot(x3, x3)), vec4<f32>(0.0));
    m = m * m;
    return 42.0 * dot(m * m, vec4<f32>(dot(p0, x0), dot(p1, x1), dot(p2, x2), dot(p3, x3)));
}
"#;

/// Format an `f32` as a WGSL float literal (always with a decimal point).
pub(crate) fn wgsl_f32(value: f32) -> String {
    format!("{:?}", value)
}

/// Full WGSL noise library: [`SIMPLEX_WGSL`] plus `fbm3` and
/// `fbm3_animated`, with the octave constants baked in.
pub fn noise_wgsl() -> String {
    format!(
        r#"// Simplex noise and fbm
{simplex}
fn fbm3(p: vec3<f32>, octaves: i32) -> f32 {{
    var value = 0.0;
    var amplitude = {amplitude};
    var frequency = {frequency};
    for (var i = 0; i < octaves; i++) {{
        value += amplitude * noise3(p * frequency);
        amplitude *= {gain};
        frequency *= {lacunarity};
    }}
    return value;
}}

fn fbm3_animated(p: vec3<f32>, time: f32, octaves: i32) -> f32 {{
    var value = 0.0;
    var amplitude = {amplitude};
    var frequency = {frequency};
    for (var i = 0; i < octaves; i++) {{
        let drift = vec3<f32>(frequency * time * {drift});
        value += amplitude * noise3(p * frequency + drift);
        amplitude *= {gain};
        frequency *= {lacunarity};
    }}
    return value;
}}
"#,
        simplex = SIMPLEX_WGSL,
        amplitude = wgsl_f32(FBM_AMPLITUDE),
        frequency = wgsl_f32(FBM_FREQUENCY),
        gain = wgsl_f32(FBM_GAIN),
        lacunarity = wgsl_f32(FBM_LACUNARITY),
        drift = wgsl_f32(FBM_TIME_DRIFT),
    )
}
