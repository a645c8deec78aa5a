//! Pointer hover and click handling.
//!
//! The [`InteractionController`] turns raw pointer positions into two pieces
//! of world-space state the shader reacts to:
//!
//! - the **pointer position**, re-projected every frame while the pointer is
//!   over the window, which drives repulsion;
//! - the **shockwave**, an origin and start time recorded by a click.
//!
//! Both are resolved by casting a ray from the camera through the pointer
//! onto the plane through the origin that faces the camera. The camera is
//! reached through the [`RayCaster`] trait so the controller can be driven
//! from tests without a window.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::ray::{Plane, Ray};

/// Something that can cast rays from the eye into the scene.
pub trait RayCaster {
    /// World-space eye position.
    fn eye(&self) -> Vec3;

    /// Ray through a point in normalized device coordinates.
    fn ray_from_ndc(&self, ndc: Vec2) -> Ray;
}

/// Surface size in physical pixels plus the display scale factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub scale_factor: f64,
}

impl Viewport {
    pub fn new(width: u32, height: u32, scale_factor: f64) -> Self {
        Self {
            width,
            height,
            scale_factor,
        }
    }

    /// Size in physical pixels as floats.
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Size in logical pixels.
    pub fn logical_size(&self) -> Vec2 {
        self.size() / self.scale_factor as f32
    }

    /// True when either side is zero, as while the window is minimized.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Convert a physical-pixel position to NDC.
    ///
    /// Returns `None` for a zero-sized viewport or a non-finite position.
    pub fn to_ndc(&self, physical: Vec2) -> Option<Vec2> {
        if self.is_empty() || !physical.is_finite() {
            return None;
        }
        Some(Vec2::new(
            physical.x / self.width as f32 * 2.0 - 1.0,
            1.0 - physical.y / self.height as f32 * 2.0,
        ))
    }

    /// Convert a physical-pixel position to logical pixels.
    pub fn to_logical(&self, physical: Vec2) -> Vec2 {
        physical / self.scale_factor as f32
    }
}

/// Window corner a [`Region`] is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    #[default]
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// A screen rectangle, in logical pixels, where clicks are not shockwaves.
///
/// `offset` is the distance from the anchored corner to the nearest corner
/// of the rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    #[serde(default)]
    pub anchor: Anchor,
    pub offset: [f32; 2],
    pub size: [f32; 2],
}

impl Region {
    pub fn new(anchor: Anchor, offset: [f32; 2], size: [f32; 2]) -> Self {
        Self {
            anchor,
            offset,
            size,
        }
    }

    /// Whether the logical point lies inside this region on a surface of
    /// the given logical size.
    pub fn contains(&self, point: Vec2, surface: Vec2) -> bool {
        let [w, h] = self.size;
        let [ox, oy] = self.offset;
        let left = match self.anchor {
            Anchor::TopLeft | Anchor::BottomLeft => ox,
            Anchor::TopRight | Anchor::BottomRight => surface.x - ox - w,
        };
        let top = match self.anchor {
            Anchor::TopLeft | Anchor::TopRight => oy,
            Anchor::BottomLeft | Anchor::BottomRight => surface.y - oy - h,
        };
        point.x >= left && point.x <= left + w && point.y >= top && point.y <= top + h
    }
}

/// A live or expired shockwave.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shockwave {
    /// World-space center.
    pub origin: Vec3,
    /// Scene time of the click, in seconds.
    pub start_time: f32,
}

/// What the shader needs to know about interaction this frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InteractionSnapshot {
    /// World-space pointer position, present while the pointer is over
    /// the window.
    pub pointer: Option<Vec3>,
    /// The most recent shockwave. The shader decides whether it is alive.
    pub shockwave: Option<Shockwave>,
}

/// Result of [`InteractionController::click`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickOutcome {
    /// A new shockwave replaced the previous one.
    Started(Shockwave),
    /// The click landed on a reserved region, was malformed, or predates
    /// the live shockwave.
    Ignored,
    /// The click ray missed the interaction plane.
    Unresolved,
}

/// Tracks hover and click state between frames.
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    reserved: Vec<Region>,
    pointer_active: bool,
    pointer_ndc: Vec2,
    pointer_world: Vec3,
    shockwave: Option<Shockwave>,
}

impl InteractionController {
    /// A controller that ignores clicks inside `reserved`.
    pub fn new(reserved: Vec<Region>) -> Self {
        Self {
            reserved,
            ..Default::default()
        }
    }

    /// Return to the startup state: no hover, no shockwave.
    pub fn reset(&mut self) {
        self.pointer_active = false;
        self.pointer_ndc = Vec2::ZERO;
        self.pointer_world = Vec3::ZERO;
        self.shockwave = None;
    }

    pub fn pointer_active(&self) -> bool {
        self.pointer_active
    }

    /// Last pointer position in NDC.
    pub fn pointer_ndc(&self) -> Vec2 {
        self.pointer_ndc
    }

    pub fn shockwave(&self) -> Option<Shockwave> {
        self.shockwave
    }

    /// Record a pointer move in physical pixels.
    pub fn pointer_moved(&mut self, physical: Vec2, viewport: &Viewport) {
        if let Some(ndc) = viewport.to_ndc(physical) {
            self.pointer_ndc = ndc;
            self.pointer_active = true;
        }
    }

    /// The pointer left the window.
    pub fn pointer_left(&mut self) {
        self.pointer_active = false;
    }

    /// Handle a click at a physical-pixel position.
    pub fn click(
        &mut self,
        physical: Vec2,
        viewport: &Viewport,
        time: f32,
        caster: &impl RayCaster,
    ) -> ClickOutcome {
        let Some(ndc) = viewport.to_ndc(physical) else {
            return ClickOutcome::Ignored;
        };
        if !time.is_finite() {
            return ClickOutcome::Ignored;
        }

        let logical = viewport.to_logical(physical);
        let surface = viewport.logical_size();
        if self.reserved.iter().any(|r| r.contains(logical, surface)) {
            log::debug!("click at {:?} ignored: reserved region", logical);
            return ClickOutcome::Ignored;
        }

        if let Some(live) = self.shockwave {
            if time < live.start_time {
                log::debug!(
                    "click at t={} ignored: earlier than live shockwave at t={}",
                    time,
                    live.start_time
                );
                return ClickOutcome::Ignored;
            }
        }

        match project_onto_interaction_plane(caster, ndc) {
            Some(origin) => {
                let wave = Shockwave {
                    origin,
                    start_time: time,
                };
                self.shockwave = Some(wave);
                ClickOutcome::Started(wave)
            }
            None => {
                log::warn!("click at {:?} did not hit the interaction plane", ndc);
                ClickOutcome::Unresolved
            }
        }
    }

    /// Re-project the hovering pointer for this frame's camera.
    ///
    /// A miss keeps the previous world position.
    pub fn update(&mut self, caster: &impl RayCaster) {
        if !self.pointer_active {
            return;
        }
        if let Some(world) = project_onto_interaction_plane(caster, self.pointer_ndc) {
            self.pointer_world = world;
        }
    }

    pub fn snapshot(&self) -> InteractionSnapshot {
        InteractionSnapshot {
            pointer: self.pointer_active.then_some(self.pointer_world),
            shockwave: self.shockwave,
        }
    }
}

/// The plane through the origin facing the eye.
fn interaction_plane(eye: Vec3) -> Option<Plane> {
    let normal = eye.normalize_or_zero();
    if normal == Vec3::ZERO {
        return None;
    }
    Some(Plane { normal, constant: 0.0 })
}

fn project_onto_interaction_plane(caster: &impl RayCaster, ndc: Vec2) -> Option<Vec3> {
    let plane = interaction_plane(caster.eye())?;
    let hit = caster.ray_from_ndc(ndc).intersect_plane(&plane)?;
    hit.is_finite().then_some(hit)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Orthographic-style caster looking down -Z from `eye`.
    struct StraightCaster {
        eye: Vec3,
        direction: Vec3,
    }

    impl RayCaster for StraightCaster {
        fn eye(&self) -> Vec3 {
            self.eye
        }

        fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
            Ray::new(self.eye + ndc.extend(0.0) * 10.0, self.direction)
        }
    }

    fn caster() -> StraightCaster {
        StraightCaster {
            eye: Vec3::new(0.0, 0.0, 20.0),
            direction: Vec3::NEG_Z,
        }
    }

    fn viewport() -> Viewport {
        Viewport::new(800, 600, 1.0)
    }

    #[test]
    fn test_ndc_conversion() {
        let vp = viewport();
        assert_eq!(vp.to_ndc(Vec2::new(400.0, 300.0)), Some(Vec2::ZERO));
        assert_eq!(vp.to_ndc(Vec2::new(0.0, 0.0)), Some(Vec2::new(-1.0, 1.0)));
        assert_eq!(vp.to_ndc(Vec2::new(800.0, 600.0)), Some(Vec2::new(1.0, -1.0)));
        assert_eq!(Viewport::new(0, 600, 1.0).to_ndc(Vec2::ZERO), None);
        assert_eq!(vp.to_ndc(Vec2::new(f32::NAN, 0.0)), None);
    }

    #[test]
    fn test_minimized_viewport_is_empty() {
        assert!(Viewport::new(0, 0, 1.0).is_empty());
        assert!(Viewport::new(800, 0, 2.0).is_empty());
        assert!(!viewport().is_empty());
        assert_eq!(Viewport::new(0, 0, 1.0).aspect(), 1.0);
    }

    #[test]
    fn test_starts_neutral() {
        let c = InteractionController::new(Vec::new());
        assert_eq!(c.snapshot(), InteractionSnapshot::default());
    }

    #[test]
    fn test_hover_projects_every_update() {
        let mut c = InteractionController::new(Vec::new());
        c.pointer_moved(Vec2::new(600.0, 300.0), &viewport());
        c.update(&caster());

        let pointer = c.snapshot().pointer.unwrap();
        assert!(pointer.abs_diff_eq(Vec3::new(5.0, 0.0, 0.0), 1e-5));

        c.pointer_left();
        assert!(c.snapshot().pointer.is_none());
    }

    #[test]
    fn test_failed_projection_keeps_previous_pointer() {
        let mut c = InteractionController::new(Vec::new());
        c.pointer_moved(Vec2::new(600.0, 300.0), &viewport());
        c.update(&caster());

        let away = StraightCaster {
            eye: Vec3::new(0.0, 0.0, 20.0),
            direction: Vec3::Z,
        };
        c.pointer_moved(Vec2::new(200.0, 300.0), &viewport());
        c.update(&away);

        let pointer = c.snapshot().pointer.unwrap();
        assert!(pointer.abs_diff_eq(Vec3::new(5.0, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn test_click_starts_shockwave() {
        let mut c = InteractionController::new(Vec::new());
        let outcome = c.click(Vec2::new(400.0, 300.0), &viewport(), 1.0, &caster());
        match outcome {
            ClickOutcome::Started(wave) => {
                assert!(wave.origin.abs_diff_eq(Vec3::ZERO, 1e-5));
                assert_eq!(wave.start_time, 1.0);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(c.snapshot().shockwave.is_some());
    }

    #[test]
    fn test_second_click_truncates_first() {
        let mut c = InteractionController::new(Vec::new());
        c.click(Vec2::new(400.0, 300.0), &viewport(), 1.0, &caster());
        c.click(Vec2::new(600.0, 300.0), &viewport(), 1.5, &caster());
        let wave = c.shockwave().unwrap();
        assert_eq!(wave.start_time, 1.5);
        assert!(wave.origin.abs_diff_eq(Vec3::new(5.0, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn test_click_start_time_never_decreases() {
        let mut c = InteractionController::new(Vec::new());
        c.click(Vec2::new(400.0, 300.0), &viewport(), 2.0, &caster());
        let outcome = c.click(Vec2::new(600.0, 300.0), &viewport(), 1.0, &caster());
        assert_eq!(outcome, ClickOutcome::Ignored);
        assert_eq!(c.shockwave().unwrap().start_time, 2.0);
    }

    #[test]
    fn test_reserved_region_ignores_click() {
        let region = Region::new(Anchor::TopRight, [20.0, 20.0], [140.0, 48.0]);
        let mut c = InteractionController::new(vec![region]);

        let outcome = c.click(Vec2::new(700.0, 40.0), &viewport(), 1.0, &caster());
        assert_eq!(outcome, ClickOutcome::Ignored);
        assert!(c.shockwave().is_none());

        let outcome = c.click(Vec2::new(400.0, 300.0), &viewport(), 1.0, &caster());
        assert!(matches!(outcome, ClickOutcome::Started(_)));
    }

    #[test]
    fn test_reserved_region_uses_logical_pixels() {
        let region = Region::new(Anchor::TopLeft, [0.0, 0.0], [100.0, 100.0]);
        let mut c = InteractionController::new(vec![region]);
        let hidpi = Viewport::new(1600, 1200, 2.0);

        // Physical (150, 150) is logical (75, 75)
        let outcome = c.click(Vec2::new(150.0, 150.0), &hidpi, 1.0, &caster());
        assert_eq!(outcome, ClickOutcome::Ignored);
    }

    #[test]
    fn test_unresolved_click_keeps_state() {
        let mut c = InteractionController::new(Vec::new());
        c.click(Vec2::new(400.0, 300.0), &viewport(), 1.0, &caster());

        let away = StraightCaster {
            eye: Vec3::new(0.0, 0.0, 20.0),
            direction: Vec3::Z,
        };
        let outcome = c.click(Vec2::new(400.0, 300.0), &viewport(), 2.0, &away);
        assert_eq!(outcome, ClickOutcome::Unresolved);
        assert_eq!(c.shockwave().unwrap().start_time, 1.0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut c = InteractionController::new(Vec::new());
        c.pointer_moved(Vec2::new(10.0, 10.0), &viewport());
        c.click(Vec2::new(400.0, 300.0), &viewport(), 1.0, &caster());
        c.reset();
        assert_eq!(c.snapshot(), InteractionSnapshot::default());
    }
}
