//! CPU evaluation of the point shader.
//!
//! Each function here mirrors the WGSL function of the same name in
//! [`point_shader`](super::point_shader) line for line, so the per-vertex
//! fields can be checked without a GPU. Pair it with
//! [`LaneSimplex`](crate::noise::LaneSimplex) for the closest match to the
//! device's noise.

use glam::{Vec2, Vec3, Vec4, Vec4Swizzles};

use super::*;
use crate::geometry::ParticleVertex;
use crate::noise::{NoiseKernel, FBM_OCTAVES};

/// Quad corners in draw order; vertex `i` of an instance uses corner `i`.
pub const QUAD_CORNERS: [Vec2; 6] = [
    Vec2::new(-1.0, -1.0),
    Vec2::new(1.0, -1.0),
    Vec2::new(-1.0, 1.0),
    Vec2::new(-1.0, 1.0),
    Vec2::new(1.0, -1.0),
    Vec2::new(1.0, 1.0),
];

/// Clip position given to vertices behind the eye.
pub const PARKED_CLIP: Vec4 = Vec4::new(0.0, 0.0, 2.0, 1.0);

/// Everything the vertex stage computes for one quad corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadedVertex {
    pub clip_position: Vec4,
    pub view_position: Vec4,
    /// Final local-space position.
    pub displaced: Vec3,
    /// Point diameter in physical pixels. Zero when parked.
    pub point_size: f32,
    pub wave: f32,
    /// Distance from the eye in view space.
    pub distance: f32,
    pub color: Vec3,
    pub uv: Vec2,
}

/// Shockwave intensity at a world position, in [0, 1].
pub fn wave_intensity(world: Vec3, uniforms: &ShaderUniforms) -> f32 {
    if uniforms.click_active < 0.5 {
        return 0.0;
    }
    let elapsed = uniforms.time - uniforms.click_time;
    if !(0.0..WAVE_LIFETIME).contains(&elapsed) {
        return 0.0;
    }
    let radius = elapsed * uniforms.wave_speed;
    let proximity = ((world - uniforms.click_position()).length() - radius).abs();
    1.0 - smoothstep(0.0, uniforms.wave_thickness, proximity)
}

/// Outward displacement for a particle at `world` caught by the wave.
pub fn wave_push(world: Vec3, normal: Vec3, wave: f32, uniforms: &ShaderUniforms) -> Vec3 {
    let away = world - uniforms.click_position();
    let direction = if away.length() >= WAVE_DEGENERATE_DISTANCE {
        away.normalize()
    } else {
        normal
    };
    direction * wave * WAVE_PUSH
}

/// Displacement away from the pointer for a particle at `current`.
pub fn repulsion(current: Vec3, uniforms: &ShaderUniforms) -> Vec3 {
    if uniforms.pointer_active < 0.5 {
        return Vec3::ZERO;
    }
    let diff = current - uniforms.pointer_position();
    let dist = diff.length();
    if dist <= 0.0 || dist >= uniforms.repel_radius {
        return Vec3::ZERO;
    }
    let falloff = 1.0 - smoothstep(0.0, uniforms.repel_radius, dist);
    diff / dist * falloff * uniforms.repel_strength
}

/// Red to orange to white as `t` goes from 0 to 1.
pub fn fiery_gradient(t: f32) -> Vec3 {
    let [red, orange, white] = FIERY_STOPS.map(Vec3::from);
    let low = red.lerp(orange, smoothstep(0.0, 0.5, t));
    let high = orange.lerp(white, smoothstep(0.5, 1.0, t));
    if t < 0.5 {
        low
    } else {
        high
    }
}

fn transform_point(m: glam::Mat4, p: Vec3) -> Vec3 {
    let h = m * p.extend(1.0);
    h.xyz() / h.w
}

/// Run the vertex stage for one corner of one particle's quad.
pub fn shade_vertex<K: NoiseKernel + ?Sized>(
    kernel: &K,
    vertex: &ParticleVertex,
    color: [f32; 3],
    corner: Vec2,
    uniforms: &ShaderUniforms,
) -> ShadedVertex {
    let position = Vec3::from(vertex.position);
    let normal = Vec3::from(vertex.normal);
    let model = uniforms.model_matrix();
    let t = uniforms.time;

    let breath = kernel.fbm3_animated(
        position * NOISE_POSITION_SCALE,
        t * NOISE_TIME_SCALE,
        FBM_OCTAVES,
    );
    let modulation = normal * breath * NOISE_AMPLITUDE;

    let rest_world = transform_point(model, position);
    let wave = wave_intensity(rest_world, uniforms);
    let push = if wave > 0.0 {
        wave_push(rest_world, normal, wave, uniforms)
    } else {
        Vec3::ZERO
    };

    let repel = repulsion(transform_point(model, position + modulation), uniforms);

    let displaced = position + modulation + push + repel;
    let view_position = uniforms.view_matrix() * model * displaced.extend(1.0);

    let mut shaded = ShadedVertex {
        clip_position: PARKED_CLIP,
        view_position,
        displaced,
        point_size: 0.0,
        wave,
        distance: view_position.xyz().length(),
        color: Vec3::from(color),
        uv: corner,
    };
    if view_position.z >= 0.0 {
        return shaded;
    }

    let pulse = 1.0 + (t * PULSE_SPEED + position.length() * PULSE_RADIAL_PHASE).sin() * PULSE_AMPLITUDE;
    let point_size = (vertex.size * pulse + wave * WAVE_SIZE_BONUS) * (POINT_SCALE / -view_position.z);

    let mut clip = uniforms.projection_matrix() * view_position;
    let viewport = Vec2::from(uniforms.viewport);
    clip.x += corner.x * point_size / viewport.x * clip.w;
    clip.y += corner.y * point_size / viewport.y * clip.w;

    shaded.clip_position = clip;
    shaded.point_size = point_size;
    shaded
}

/// Run the fragment stage. `None` means the fragment is discarded.
///
/// The result is straight (non-premultiplied) color plus alpha; the
/// pipeline blends it as `src * alpha + dst`.
pub fn shade_fragment(
    uv: Vec2,
    color: Vec3,
    wave: f32,
    distance: f32,
    uniforms: &ShaderUniforms,
) -> Option<Vec4> {
    let r2 = uv.length_squared();
    if r2 > 1.0 {
        return None;
    }
    let r = r2.sqrt();

    let center = 1.0 - smoothstep(0.0, GLOW_CORE_RADIUS, r);
    let halo = 1.0 - smoothstep(GLOW_CORE_RADIUS, GLOW_OUTER_RADIUS, r);
    let mut alpha = center + halo * (1.0 - center);

    let mut color = color;
    if wave > 0.0 {
        color = color.lerp(fiery_gradient(wave), wave * WAVE_TINT);
        color *= 1.0 + wave * WAVE_BRIGHTEN;
    }

    let radius = uniforms.formation_radius;
    alpha *= 1.0 - smoothstep(radius * FADE_NEAR, radius * FADE_FAR, distance);

    Some(color.clamp(Vec3::ZERO, Vec3::splat(COLOR_CEILING)).extend(alpha))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::{InteractionSnapshot, Shockwave};
    use crate::noise::LaneSimplex;
    use glam::Mat4;

    fn uniforms_at(time: f32, interaction: InteractionSnapshot) -> ShaderUniforms {
        let frame = FrameContext {
            time,
            interaction,
            ..Default::default()
        };
        let view = ViewState {
            view: Mat4::from_translation(Vec3::new(0.0, 0.0, -10.0)),
            projection: Mat4::perspective_rh(1.0, 1.0, 0.1, 100.0),
            viewport: Vec2::new(1000.0, 1000.0),
        };
        ShaderUniforms::new(&frame, &view, Mat4::IDENTITY, &ShadingParams::default())
    }

    fn clicked_at(start_time: f32, time: f32) -> ShaderUniforms {
        uniforms_at(
            time,
            InteractionSnapshot {
                pointer: None,
                shockwave: Some(Shockwave {
                    origin: Vec3::ZERO,
                    start_time,
                }),
            },
        )
    }

    fn pointer_at(p: Vec3) -> ShaderUniforms {
        uniforms_at(
            0.0,
            InteractionSnapshot {
                pointer: Some(p),
                shockwave: None,
            },
        )
    }

    #[test]
    fn test_wave_peaks_at_front() {
        let u = clicked_at(1.0, 1.2);
        let wave = wave_intensity(Vec3::new(8.0, 0.0, 0.0), &u);
        assert!((wave - 1.0).abs() < 1e-4, "wave {}", wave);
    }

    #[test]
    fn test_wave_lifecycle() {
        let p = Vec3::new(8.0, 0.0, 0.0);
        assert_eq!(wave_intensity(p, &clicked_at(1.0, 0.9)), 0.0);
        assert!(wave_intensity(p, &clicked_at(1.0, 1.2)) > 0.99);
        assert_eq!(wave_intensity(p, &clicked_at(1.0, 3.5)), 0.0);
        assert_eq!(wave_intensity(p, &clicked_at(1.0, 10.0)), 0.0);
    }

    #[test]
    fn test_wave_fades_across_thickness() {
        let u = clicked_at(0.0, 0.25); // front at radius 10
        let at_front = wave_intensity(Vec3::new(10.0, 0.0, 0.0), &u);
        let inside = wave_intensity(Vec3::new(12.0, 0.0, 0.0), &u);
        let outside = wave_intensity(Vec3::new(16.0, 0.0, 0.0), &u);
        assert!(at_front > inside);
        assert!(inside > 0.0);
        assert_eq!(outside, 0.0);
    }

    #[test]
    fn test_no_interaction_is_inert() {
        let u = uniforms_at(0.0, InteractionSnapshot::default());
        assert_eq!(wave_intensity(Vec3::ZERO, &u), 0.0);
        assert_eq!(repulsion(Vec3::new(1.0, 0.0, 0.0), &u), Vec3::ZERO);
    }

    #[test]
    fn test_degenerate_push_uses_normal() {
        let u = clicked_at(0.0, 0.0);
        let push = wave_push(Vec3::ZERO, Vec3::Y, 1.0, &u);
        assert!((push - Vec3::Y * WAVE_PUSH).length() < 1e-6);

        let push = wave_push(Vec3::new(2.0, 0.0, 0.0), Vec3::Y, 0.5, &u);
        assert!((push - Vec3::X * WAVE_PUSH * 0.5).length() < 1e-5);
    }

    #[test]
    fn test_repulsion_pushes_away() {
        let u = pointer_at(Vec3::ZERO);
        let force = repulsion(Vec3::new(4.0, 0.0, 0.0), &u);
        assert!(force.x > 0.0);
        assert!(force.y.abs() < 1e-6 && force.z.abs() < 1e-6);
        assert!(force.length() <= 1.5);

        let nearer = repulsion(Vec3::new(1.0, 0.0, 0.0), &u);
        assert!(nearer.length() > force.length());
    }

    #[test]
    fn test_repulsion_bounds() {
        let u = pointer_at(Vec3::ZERO);
        assert_eq!(repulsion(Vec3::ZERO, &u), Vec3::ZERO);
        assert_eq!(repulsion(Vec3::new(8.0, 0.0, 0.0), &u), Vec3::ZERO);
        assert_eq!(repulsion(Vec3::new(0.0, 20.0, 0.0), &u), Vec3::ZERO);
    }

    #[test]
    fn test_inert_uniforms_ignore_interaction() {
        let u = clicked_at(0.0, 0.05).without_interaction();
        assert_eq!(wave_intensity(Vec3::new(2.0, 0.0, 0.0), &u), 0.0);
    }

    #[test]
    fn test_fiery_gradient_stops() {
        let red = Vec3::from(FIERY_STOPS[0]);
        let orange = Vec3::from(FIERY_STOPS[1]);
        let white = Vec3::from(FIERY_STOPS[2]);
        assert!((fiery_gradient(0.0) - red).length() < 1e-6);
        assert!((fiery_gradient(0.5) - orange).length() < 1e-6);
        assert!((fiery_gradient(1.0) - white).length() < 1e-6);
    }

    #[test]
    fn test_point_size_scales_with_depth() {
        let vertex = ParticleVertex {
            position: [0.0; 3],
            size: 1.0,
            normal: [0.0; 3],
            original_hue: 0.0,
        };
        let u = uniforms_at(0.0, InteractionSnapshot::default());
        let shaded = shade_vertex(&LaneSimplex, &vertex, [1.0; 3], QUAD_CORNERS[0], &u);
        // Eye 10 units away, pulse phase 0
        assert!((shaded.point_size - 150.0).abs() < 1e-3, "size {}", shaded.point_size);
        assert!((shaded.distance - 10.0).abs() < 1e-4);
        assert_eq!(shaded.wave, 0.0);
    }

    #[test]
    fn test_vertex_behind_eye_is_parked() {
        let vertex = ParticleVertex {
            position: [0.0, 0.0, 20.0],
            size: 1.0,
            normal: [0.0; 3],
            original_hue: 0.0,
        };
        let u = uniforms_at(0.0, InteractionSnapshot::default());
        let shaded = shade_vertex(&LaneSimplex, &vertex, [1.0; 3], QUAD_CORNERS[5], &u);
        assert_eq!(shaded.clip_position, PARKED_CLIP);
        assert_eq!(shaded.point_size, 0.0);
    }

    #[test]
    fn test_breathing_moves_along_normal() {
        let vertex = ParticleVertex {
            position: [3.0, 4.0, 5.0],
            size: 1.0,
            normal: [0.0, 1.0, 0.0],
            original_hue: 0.0,
        };
        let u = uniforms_at(1.7, InteractionSnapshot::default());
        let shaded = shade_vertex(&LaneSimplex, &vertex, [1.0; 3], QUAD_CORNERS[0], &u);
        let offset = shaded.displaced - Vec3::from(vertex.position);
        assert!(offset.x.abs() < 1e-6 && offset.z.abs() < 1e-6);
        // |fbm| <= 0.875, times 1.2
        assert!(offset.y.abs() <= 1.05 + 1e-4);
    }

    #[test]
    fn test_fragment_glow_profile() {
        let u = uniforms_at(0.0, InteractionSnapshot::default());
        let color = Vec3::new(0.2, 0.4, 0.6);
        assert!(shade_fragment(Vec2::new(0.9, 0.9), color, 0.0, 5.0, &u).is_none());

        let center = shade_fragment(Vec2::ZERO, color, 0.0, 5.0, &u).unwrap();
        assert!((center.w - 1.0).abs() < 1e-6);
        assert_eq!(center.truncate(), color);

        let edge = shade_fragment(Vec2::new(0.7, 0.0), color, 0.0, 5.0, &u).unwrap();
        assert_eq!(edge.w, 0.0);
        let mid = shade_fragment(Vec2::new(0.3, 0.0), color, 0.0, 5.0, &u).unwrap();
        assert!(mid.w > 0.0 && mid.w < 1.0);
    }

    #[test]
    fn test_fragment_distance_fade() {
        let u = uniforms_at(0.0, InteractionSnapshot::default());
        let near = shade_fragment(Vec2::ZERO, Vec3::ONE, 0.0, 22.0, &u).unwrap();
        let mid = shade_fragment(Vec2::ZERO, Vec3::ONE, 0.0, 33.0, &u).unwrap();
        let far = shade_fragment(Vec2::ZERO, Vec3::ONE, 0.0, 45.0, &u).unwrap();
        assert!((near.w - 1.0).abs() < 1e-6);
        assert!(mid.w > 0.0 && mid.w < 1.0);
        assert_eq!(far.w, 0.0);
    }

    #[test]
    fn test_fragment_wave_brightens_and_clamps() {
        let u = uniforms_at(0.0, InteractionSnapshot::default());
        let base = Vec3::new(0.1, 0.1, 0.1);
        let calm = shade_fragment(Vec2::ZERO, base, 0.0, 5.0, &u).unwrap();
        let hit = shade_fragment(Vec2::ZERO, base, 1.0, 5.0, &u).unwrap();
        assert!(hit.x > calm.x);

        let hot = shade_fragment(Vec2::ZERO, Vec3::splat(10.0), 1.0, 5.0, &u).unwrap();
        assert!(hot.truncate().max_element() <= COLOR_CEILING);
    }
}
