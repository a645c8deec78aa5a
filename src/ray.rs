//! Rays, planes and screen-to-world ray construction.

use glam::{Mat4, Vec2, Vec3};

/// A half-line with a unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

/// The plane `normal · p + constant = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub constant: f32,
}

impl Plane {
    /// Create a plane; `normal` is normalized.
    pub fn new(normal: Vec3, constant: f32) -> Self {
        Self {
            normal: normal.normalize(),
            constant,
        }
    }

    /// The plane through `point` with the given normal.
    pub fn from_normal_and_point(normal: Vec3, point: Vec3) -> Self {
        let normal = normal.normalize();
        Self {
            normal,
            constant: -point.dot(normal),
        }
    }

    /// Signed distance from `point` to the plane.
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.constant
    }
}

impl Ray {
    /// Create a ray; `direction` is normalized.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Point at parameter `t` along the ray.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Ray through a point in normalized device coordinates.
    ///
    /// Unprojects the NDC point at the near (z = 0) and far (z = 1) planes
    /// of the wgpu depth range and connects them.
    pub fn from_ndc(ndc: Vec2, inverse_view_projection: &Mat4) -> Self {
        let near = inverse_view_projection.project_point3(ndc.extend(0.0));
        let far = inverse_view_projection.project_point3(ndc.extend(1.0));
        Self::new(near, far - near)
    }

    /// Distance along the ray to `plane`.
    ///
    /// Returns `None` if the ray is parallel to the plane (and not lying in
    /// it) or the plane is behind the origin.
    pub fn distance_to_plane(&self, plane: &Plane) -> Option<f32> {
        let denom = plane.normal.dot(self.direction);
        if denom.abs() < 1e-8 {
            if plane.distance_to_point(self.origin).abs() < 1e-8 {
                return Some(0.0);
            }
            return None;
        }

        let t = -(self.origin.dot(plane.normal) + plane.constant) / denom;
        if t >= 0.0 {
            Some(t)
        } else {
            None
        }
    }

    /// Intersection point with `plane`, if any.
    pub fn intersect_plane(&self, plane: &Plane) -> Option<Vec3> {
        self.distance_to_plane(plane).map(|t| self.at(t))
    }
}
