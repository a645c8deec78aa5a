//! Device-side noise against the CPU kernels.
//!
//! Needs a GPU adapter. Machines without one skip the comparison.

use glam::Vec3;

use pulsar::gpu::NoiseProbe;
use pulsar::noise::{LaneSimplex, NoiseKernel, FBM_OCTAVES};
use pulsar::GpuError;

fn probe() -> Option<NoiseProbe> {
    match NoiseProbe::blocking() {
        Ok(probe) => Some(probe),
        Err(GpuError::NoAdapter) => {
            eprintln!("no GPU adapter, skipping");
            None
        }
        Err(e) => {
            eprintln!("GPU unavailable ({}), skipping", e);
            None
        }
    }
}

fn grid() -> Vec<Vec3> {
    let mut points = Vec::new();
    for x in 0..10 {
        for y in 0..10 {
            for z in 0..5 {
                points.push(Vec3::new(
                    x as f32 * 0.83 - 4.0,
                    y as f32 * 0.61 - 3.0,
                    z as f32 * 1.17 - 2.5,
                ));
            }
        }
    }
    points
}

#[test]
fn test_gpu_noise_matches_cpu() {
    let Some(probe) = probe() else {
        return;
    };
    let points = grid();
    let time = 1.75;
    let samples = probe.sample(&points, time).expect("probe readback");
    assert_eq!(samples.len(), points.len());

    for (p, s) in points.iter().zip(&samples) {
        let noise = LaneSimplex.noise3(*p);
        let fbm = LaneSimplex.fbm3(*p, FBM_OCTAVES);
        let animated = LaneSimplex.fbm3_animated(*p, time, FBM_OCTAVES);
        assert!((s.noise - noise).abs() < 2e-3, "noise3 at {:?}: gpu {} cpu {}", p, s.noise, noise);
        assert!((s.fbm - fbm).abs() < 2e-3, "fbm3 at {:?}: gpu {} cpu {}", p, s.fbm, fbm);
        assert!(
            (s.fbm_animated - animated).abs() < 2e-3,
            "fbm3_animated at {:?}: gpu {} cpu {}",
            p,
            s.fbm_animated,
            animated
        );
    }
}

#[test]
fn test_empty_probe_is_empty() {
    let Some(probe) = probe() else {
        return;
    };
    assert!(probe.sample(&[], 0.0).expect("empty readback").is_empty());
}
