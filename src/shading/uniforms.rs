//! The uniform block and the frame state it is derived from.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};

use super::ShadingParams;
use crate::camera::OrbitCamera;
use crate::interaction::{InteractionSnapshot, Viewport};

/// Frame-local state handed to uniform derivation and rendering.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameContext {
    /// Scene time in seconds.
    pub time: f32,
    /// Seconds since the previous frame.
    pub delta: f32,
    /// Frames since start.
    pub frame: u64,
    pub interaction: InteractionSnapshot,
}

/// Camera matrices plus the physical surface size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub view: Mat4,
    pub projection: Mat4,
    /// Surface size in physical pixels.
    pub viewport: Vec2,
}

impl ViewState {
    pub fn from_camera(camera: &OrbitCamera, viewport: &Viewport) -> Self {
        Self {
            view: camera.view_matrix(),
            projection: camera.projection_matrix(),
            viewport: viewport.size(),
        }
    }

    /// Whether there are pixels to draw into.
    pub fn has_area(&self) -> bool {
        self.viewport.x > 0.0 && self.viewport.y > 0.0
    }
}

/// Uniform block read by both shader stages.
///
/// Layout matches the WGSL struct in [`ShaderUniforms::WGSL_STRUCT`]: the
/// vec3 members sit on 16-byte boundaries with a scalar packed into each
/// one's tail, and the trailing padding rounds the struct up to 272 bytes.
/// Flags are floats (0 or 1).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ShaderUniforms {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub click_position: [f32; 3],
    pub click_time: f32,
    pub pointer_position: [f32; 3],
    pub pointer_active: f32,
    pub viewport: [f32; 2],
    pub time: f32,
    pub click_active: f32,
    pub wave_speed: f32,
    pub wave_thickness: f32,
    pub repel_radius: f32,
    pub repel_strength: f32,
    pub formation_radius: f32,
    pub _padding: [f32; 3],
}

impl ShaderUniforms {
    pub const WGSL_STRUCT: &'static str = r#"struct Uniforms {
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    model: mat4x4<f32>,
    click_position: vec3<f32>,
    click_time: f32,
    pointer_position: vec3<f32>,
    pointer_active: f32,
    viewport: vec2<f32>,
    time: f32,
    click_active: f32,
    wave_speed: f32,
    wave_thickness: f32,
    repel_radius: f32,
    repel_strength: f32,
    formation_radius: f32,
};
"#;

    /// Derive the block for one formation this frame.
    pub fn new(frame: &FrameContext, view: &ViewState, model: Mat4, params: &ShadingParams) -> Self {
        let (click_position, click_time, click_active) = match frame.interaction.shockwave {
            Some(wave) => (wave.origin.to_array(), wave.start_time, 1.0),
            None => ([0.0; 3], 0.0, 0.0),
        };
        let (pointer_position, pointer_active) = match frame.interaction.pointer {
            Some(p) => (p.to_array(), 1.0),
            None => ([0.0; 3], 0.0),
        };

        Self {
            view: view.view.to_cols_array_2d(),
            projection: view.projection.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            click_position,
            click_time,
            pointer_position,
            pointer_active,
            viewport: view.viewport.to_array(),
            time: frame.time,
            click_active,
            wave_speed: params.wave_speed,
            wave_thickness: params.wave_thickness,
            repel_radius: params.repel_radius,
            repel_strength: params.repel_strength,
            formation_radius: params.formation_radius,
            _padding: [0.0; 3],
        }
    }

    /// The same block with shockwave and repulsion switched off.
    pub fn without_interaction(mut self) -> Self {
        self.click_active = 0.0;
        self.pointer_active = 0.0;
        self
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.view)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.projection)
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.model)
    }

    pub fn click_position(&self) -> Vec3 {
        Vec3::from(self.click_position)
    }

    pub fn pointer_position(&self) -> Vec3 {
        Vec3::from(self.pointer_position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::Shockwave;
    use std::mem::{offset_of, size_of};

    fn view_state() -> ViewState {
        ViewState {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            viewport: Vec2::new(800.0, 600.0),
        }
    }

    #[test]
    fn test_layout_matches_wgsl() {
        assert_eq!(size_of::<ShaderUniforms>(), 272);
        assert_eq!(offset_of!(ShaderUniforms, click_position), 192);
        assert_eq!(offset_of!(ShaderUniforms, click_time), 204);
        assert_eq!(offset_of!(ShaderUniforms, pointer_position), 208);
        assert_eq!(offset_of!(ShaderUniforms, pointer_active), 220);
        assert_eq!(offset_of!(ShaderUniforms, viewport), 224);
        assert_eq!(offset_of!(ShaderUniforms, time), 232);
        assert_eq!(offset_of!(ShaderUniforms, formation_radius), 256);
    }

    #[test]
    fn test_neutral_frame_clears_flags() {
        let u = ShaderUniforms::new(
            &FrameContext::default(),
            &view_state(),
            Mat4::IDENTITY,
            &ShadingParams::default(),
        );
        assert_eq!(u.click_active, 0.0);
        assert_eq!(u.pointer_active, 0.0);
        assert_eq!(u.wave_speed, 40.0);
        assert_eq!(u.viewport, [800.0, 600.0]);
    }

    #[test]
    fn test_interaction_is_copied() {
        let frame = FrameContext {
            time: 3.0,
            interaction: InteractionSnapshot {
                pointer: Some(Vec3::new(1.0, 2.0, 3.0)),
                shockwave: Some(Shockwave {
                    origin: Vec3::X,
                    start_time: 2.0,
                }),
            },
            ..Default::default()
        };
        let u = ShaderUniforms::new(&frame, &view_state(), Mat4::IDENTITY, &ShadingParams::default());
        assert_eq!(u.click_active, 1.0);
        assert_eq!(u.click_time, 2.0);
        assert_eq!(u.click_position(), Vec3::X);
        assert_eq!(u.pointer_active, 1.0);
        assert_eq!(u.pointer_position(), Vec3::new(1.0, 2.0, 3.0));

        let inert = u.without_interaction();
        assert_eq!(inert.click_active, 0.0);
        assert_eq!(inert.pointer_active, 0.0);
        assert_eq!(inert.time, 3.0);
    }

    #[test]
    fn test_minimized_view_has_no_area() {
        assert!(view_state().has_area());
        let minimized = ViewState {
            viewport: Vec2::ZERO,
            ..view_state()
        };
        assert!(!minimized.has_area());
        let from_window = ViewState::from_camera(
            &OrbitCamera::from_config(&Default::default(), 1.0),
            &Viewport::new(0, 0, 1.0),
        );
        assert!(!from_window.has_area());
    }
}
