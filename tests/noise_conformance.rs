//! Conformance tests for the noise kernels.
//!
//! The bake kernel (`Simplex`), the shader-shaped kernel (`LaneSimplex`) and
//! the generated WGSL must describe one function. These tests pin the CPU
//! kernels to each other across the coordinate ranges the visualizer
//! actually samples, and check the WGSL the shader embeds.

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use pulsar::noise::{noise_wgsl, LaneSimplex, NoiseKernel, Simplex, FBM_OCTAVES};
use pulsar::shading::{point_shader, NOISE_POSITION_SCALE, NOISE_TIME_SCALE};

fn random_points(seed: u64, count: usize, extent: f32) -> Vec<Vec3> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            Vec3::new(
                rng.gen_range(-extent..extent),
                rng.gen_range(-extent..extent),
                rng.gen_range(-extent..extent),
            )
        })
        .collect()
}

#[test]
fn test_kernels_agree_on_noise3() {
    for p in random_points(11, 2_000, 20.0) {
        let a = Simplex.noise3(p);
        let b = LaneSimplex.noise3(p);
        assert!((a - b).abs() < 1e-3, "noise3 disagrees at {:?}: {} vs {}", p, a, b);
    }
}

#[test]
fn test_kernels_agree_on_shader_inputs() {
    // Shell positions scaled as the vertex stage scales them
    for (i, p) in random_points(12, 500, 40.0).into_iter().enumerate() {
        let time = i as f32 * 0.37 * NOISE_TIME_SCALE;
        let q = p * NOISE_POSITION_SCALE;
        let a = Simplex.fbm3_animated(q, time, FBM_OCTAVES);
        let b = LaneSimplex.fbm3_animated(q, time, FBM_OCTAVES);
        assert!((a - b).abs() < 1e-3, "fbm disagrees at {:?}, t={}: {} vs {}", q, time, a, b);
    }
}

#[test]
fn test_noise3_range_and_balance() {
    let points = random_points(13, 4_000, 30.0);
    let mut sum = 0.0;
    for &p in &points {
        let n = Simplex.noise3(p);
        assert!((-1.0001..=1.0001).contains(&n), "noise3({:?}) = {}", p, n);
        sum += n;
    }
    let mean = sum / points.len() as f32;
    assert!(mean.abs() < 0.1, "mean {}", mean);
}

#[test]
fn test_noise3_is_continuous() {
    for p in random_points(14, 300, 10.0) {
        let a = Simplex.noise3(p);
        let b = Simplex.noise3(p + Vec3::splat(1e-3));
        assert!((a - b).abs() < 0.05, "jump at {:?}: {} vs {}", p, a, b);
    }
}

fn validate(code: &str) {
    let module = naga::front::wgsl::parse_str(code)
        .unwrap_or_else(|e| panic!("{}", e.emit_to_string(code)));
    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    )
    .validate(&module)
    .unwrap_or_else(|e| panic!("WGSL validation error: {:?}", e));
}

#[test]
fn test_point_shader_embeds_noise() {
    let shader = point_shader();
    assert!(shader.contains(&noise_wgsl()));
    validate(&shader);
}
