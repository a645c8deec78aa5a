//! Orbit camera.

use glam::{Mat4, Vec2, Vec3};

use crate::config::CameraConfig;
use crate::interaction::RayCaster;
use crate::ray::Ray;

/// Largest pitch magnitude, just short of straight up or down.
pub const PITCH_LIMIT: f32 = 1.5;

/// Radians of orbit per pixel of drag at rotate speed 1.
const DRAG_RADIANS_PER_PIXEL: f32 = 0.005;

/// Perspective camera orbiting a target point.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    /// Horizontal rotation angle in radians.
    pub yaw: f32,
    /// Vertical rotation angle in radians.
    pub pitch: f32,
    /// Distance from the target point.
    pub distance: f32,
    /// Point the camera orbits around.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Width over height of the surface.
    pub aspect: f32,
    min_distance: f32,
    max_distance: f32,
    rotate_speed: f32,
    /// Fraction of the pending orbit applied per frame.
    damping: f32,
    /// Yaw and pitch still to be applied, in radians.
    pending: Vec2,
}

impl OrbitCamera {
    /// Build a camera from configuration.
    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        Self {
            yaw: config.yaw,
            pitch: config.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            distance: config
                .distance
                .clamp(config.min_distance, config.max_distance),
            target: Vec3::from(config.target),
            fov_degrees: config.fov_degrees,
            near: config.near,
            far: config.far,
            aspect,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            rotate_speed: config.rotate_speed,
            damping: config.damping.clamp(f32::EPSILON, 1.0),
            pending: Vec2::ZERO,
        }
    }

    /// Calculate the camera's world position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    /// Queue an orbit by a drag of `delta` physical pixels.
    ///
    /// The rotation is eased in by [`update`](Self::update).
    pub fn orbit(&mut self, delta: Vec2) {
        let step = DRAG_RADIANS_PER_PIXEL * self.rotate_speed;
        self.pending += Vec2::new(-delta.x, delta.y) * step;
    }

    /// Apply one frame of damped orbit motion.
    pub fn update(&mut self) {
        let step = self.pending * self.damping;
        self.yaw += step.x;
        self.pitch = (self.pitch + step.y).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.pending -= step;
        if self.pending.length_squared() < 1e-12 {
            self.pending = Vec2::ZERO;
        }
    }

    /// Whether queued orbit motion remains.
    pub fn is_moving(&self) -> bool {
        self.pending != Vec2::ZERO
    }

    /// Zoom by wheel lines; positive moves closer.
    pub fn zoom(&mut self, lines: f32) {
        let factor = 0.95_f32.powf(lines);
        self.distance = (self.distance * factor).clamp(self.min_distance, self.max_distance);
    }
}

impl RayCaster for OrbitCamera {
    fn eye(&self) -> Vec3 {
        self.position()
    }

    fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        Ray::from_ndc(ndc, &self.view_projection().inverse())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> OrbitCamera {
        OrbitCamera::from_config(&CameraConfig::default(), 16.0 / 9.0)
    }

    #[test]
    fn test_default_looks_down_from_distance() {
        let cam = camera();
        let eye = cam.position();
        assert!((eye.length() - 35.0).abs() < 1e-3);
        assert!(eye.y > 34.0);
    }

    #[test]
    fn test_zoom_respects_limits() {
        let mut cam = camera();
        cam.zoom(1_000.0);
        assert!((cam.distance - 5.0).abs() < 1e-6);
        cam.zoom(-1_000.0);
        assert!((cam.distance - 100.0).abs() < 1e-6);
    }

    fn settle(cam: &mut OrbitCamera) {
        for _ in 0..2_000 {
            cam.update();
        }
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut cam = camera();
        cam.orbit(Vec2::new(0.0, 10_000.0));
        settle(&mut cam);
        assert_eq!(cam.pitch, PITCH_LIMIT);
        cam.orbit(Vec2::new(0.0, -100_000.0));
        settle(&mut cam);
        assert_eq!(cam.pitch, -PITCH_LIMIT);
    }

    #[test]
    fn test_orbit_is_damped() {
        let mut cam = camera();
        let yaw = cam.yaw;
        cam.orbit(Vec2::new(100.0, 0.0));
        assert_eq!(cam.yaw, yaw);
        assert!(cam.is_moving());

        // 100 px at 0.005 rad/px is 0.5 rad, 5% of it lands on the first frame
        cam.update();
        assert!((cam.yaw - (yaw - 0.025)).abs() < 1e-6, "yaw {}", cam.yaw);
        cam.update();
        assert!((cam.yaw - (yaw - 0.025 - 0.02375)).abs() < 1e-6, "yaw {}", cam.yaw);

        settle(&mut cam);
        assert!((cam.yaw - (yaw - 0.5)).abs() < 1e-4, "yaw {}", cam.yaw);
        assert!(!cam.is_moving());
    }

    #[test]
    fn test_full_damping_applies_at_once() {
        let config = CameraConfig {
            damping: 1.0,
            ..CameraConfig::default()
        };
        let mut cam = OrbitCamera::from_config(&config, 1.0);
        cam.orbit(Vec2::new(-40.0, 0.0));
        cam.update();
        assert!((cam.yaw - 0.2).abs() < 1e-6);
        assert!(!cam.is_moving());
    }

    #[test]
    fn test_center_ray_passes_through_target() {
        let cam = camera();
        let ray = cam.ray_from_ndc(Vec2::ZERO);
        // Closest approach of the ray to the origin
        let t = (-ray.origin).dot(ray.direction);
        let closest = ray.at(t);
        assert!(closest.length() < 1e-2, "closest {:?}", closest);
    }

    #[test]
    fn test_bad_aspect_ignored() {
        let mut cam = camera();
        cam.set_aspect(0.0);
        assert!((cam.aspect - 16.0 / 9.0).abs() < 1e-6);
    }
}
