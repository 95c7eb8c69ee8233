//! Spatial math for the girder viewer.
//!
//! Only what the segment picker needs: vectors, a perspective camera that
//! can turn a pointer position into a world-space ray (and back), and
//! ray/box intersection for hit testing.
//!
//! ```text
//!            camera
//!              ●──────────ray──────────▶
//!                         ┌───┐   ┌───┐
//!                         │ 1 │   │ 5 │   nearest hit wins
//!                         └───┘   └───┘
//! ```

use serde::{Deserialize, Serialize};

/// A 3D vector for positions and directions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
    /// Z component.
    pub z: f32,
}

impl Vec3 {
    /// Create a new vector.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Zero vector.
    #[must_use]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Unit vector pointing up (Y+).
    #[must_use]
    pub const fn up() -> Self {
        Self::new(0.0, 1.0, 0.0)
    }

    /// Calculate the length (magnitude) of the vector.
    #[must_use]
    pub fn length(&self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Normalize the vector to unit length.
    #[must_use]
    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            self.scale(1.0 / len)
        } else {
            *self
        }
    }

    /// Cross product of two vectors.
    #[must_use]
    pub fn cross(&self, other: &Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Dot product of two vectors.
    #[must_use]
    pub fn dot(&self, other: &Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Subtract two vectors.
    #[must_use]
    pub fn sub(&self, other: &Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    /// Add two vectors.
    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    /// Scale vector by a scalar.
    #[must_use]
    pub fn scale(&self, s: f32) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }

    /// Linear interpolation towards `other`; `t` is not clamped.
    #[must_use]
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        self.add(&other.sub(self).scale(t))
    }
}

impl Default for Vec3 {
    fn default() -> Self {
        Self::zero()
    }
}

/// A half-line in world space. `direction` is always unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Ray origin.
    pub origin: Vec3,
    /// Normalized direction.
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray, normalizing the direction. A zero direction falls back to -Z.
    #[must_use]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        let direction = if direction.length() > 0.0 {
            direction.normalize()
        } else {
            Vec3::new(0.0, 0.0, -1.0)
        };
        Self { origin, direction }
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Aabb {
    /// Build a box from its centre and full edge lengths.
    #[must_use]
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size.scale(0.5);
        Self {
            min: center.sub(&half),
            max: center.add(&half),
        }
    }

    /// Centre of the box.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        self.min.lerp(&self.max, 0.5)
    }

    /// Slab test. Returns the entry distance along the ray, or `None` when the
    /// box is missed or lies entirely behind the origin.
    #[must_use]
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        let mut tmin = f32::NEG_INFINITY;
        let mut tmax = f32::INFINITY;

        let origin = [ray.origin.x, ray.origin.y, ray.origin.z];
        let direction = [ray.direction.x, ray.direction.y, ray.direction.z];
        let min = [self.min.x, self.min.y, self.min.z];
        let max = [self.max.x, self.max.y, self.max.z];

        for i in 0..3 {
            if direction[i].abs() > 1e-6 {
                let t1 = (min[i] - origin[i]) / direction[i];
                let t2 = (max[i] - origin[i]) / direction[i];

                tmin = tmin.max(t1.min(t2));
                tmax = tmax.min(t1.max(t2));

                if tmin > tmax {
                    return None;
                }
            } else if origin[i] < min[i] || origin[i] > max[i] {
                // Parallel to the slab and outside it
                return None;
            }
        }

        if tmax < 0.0 {
            None
        } else {
            Some(tmin.max(0.0))
        }
    }

    /// The eight corners of the box.
    #[must_use]
    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(b.x, b.y, b.z),
            Vec3::new(a.x, b.y, b.z),
        ]
    }
}

/// Perspective camera looking at a target point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    /// Camera position in world space.
    pub position: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Up direction (usually Y+).
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Width / height of the mount.
    pub aspect: f32,
}

impl Camera {
    /// The viewer's starting camera: 65° field of view from (0, 5, 12).
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec3::new(0.0, 5.0, 12.0),
            target: Vec3::zero(),
            up: Vec3::up(),
            fov: 65.0_f32.to_radians(),
            near: 0.1,
            far: 1000.0,
            aspect: 4.0 / 3.0,
        }
    }

    /// Update the aspect ratio from mount dimensions. Degenerate sizes are ignored.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    /// Orthonormal (right, up, forward) basis.
    fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let forward = self.target.sub(&self.position).normalize();
        let right = forward.cross(&self.up).normalize();
        let up = right.cross(&forward);
        (right, up, forward)
    }

    /// Build the picking ray through normalized device coordinates.
    #[must_use]
    pub fn ray_from_ndc(&self, ndc_x: f32, ndc_y: f32) -> Ray {
        let (right, up, forward) = self.basis();
        let tan_half_fov = (self.fov / 2.0).tan();

        let direction = forward
            .add(&right.scale(ndc_x * self.aspect * tan_half_fov))
            .add(&up.scale(ndc_y * tan_half_fov));

        Ray::new(self.position, direction)
    }

    /// Project a world point to normalized device coordinates.
    ///
    /// Returns `None` for points at or behind the near plane.
    #[must_use]
    pub fn project(&self, point: Vec3) -> Option<(f32, f32)> {
        let (right, up, forward) = self.basis();
        let tan_half_fov = (self.fov / 2.0).tan();

        let v = point.sub(&self.position);
        let depth = v.dot(&forward);
        if depth <= self.near {
            return None;
        }

        Some((
            v.dot(&right) / (depth * tan_half_fov * self.aspect),
            v.dot(&up) / (depth * tan_half_fov),
        ))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

/// Mount dimensions in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl Viewport {
    /// Create a viewport.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Convert mount-relative pixels to normalized device coordinates.
    #[must_use]
    pub fn to_ndc(self, x: f32, y: f32) -> (f32, f32) {
        (
            (2.0 * x / self.width) - 1.0,
            1.0 - (2.0 * y / self.height),
        )
    }

    /// Convert normalized device coordinates back to mount-relative pixels.
    #[must_use]
    pub fn to_pixels(self, ndc_x: f32, ndc_y: f32) -> (f32, f32) {
        (
            (ndc_x + 1.0) / 2.0 * self.width,
            (1.0 - ndc_y) / 2.0 * self.height,
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_vec3_cross_and_dot() {
        let x = Vec3::new(1.0, 0.0, 0.0);
        let y = Vec3::new(0.0, 1.0, 0.0);
        let z = x.cross(&y);
        assert!(approx_eq(z.z, 1.0));
        assert!(approx_eq(Vec3::new(1.0, 2.0, 3.0).dot(&Vec3::new(4.0, 5.0, 6.0)), 32.0));
    }

    #[test]
    fn test_vec3_normalize_zero() {
        let n = Vec3::zero().normalize();
        assert!(approx_eq(n.length(), 0.0));
    }

    #[test]
    fn test_vec3_lerp() {
        let a = Vec3::new(0.0, 5.0, 12.0);
        let b = Vec3::new(2.0, 4.0, 10.0);
        let mid = a.lerp(&b, 0.5);
        assert!(approx_eq(mid.x, 1.0));
        assert!(approx_eq(mid.y, 4.5));
        assert!(approx_eq(mid.z, 11.0));
    }

    #[test]
    fn test_ray_zero_direction_falls_back() {
        let ray = Ray::new(Vec3::zero(), Vec3::zero());
        assert!(approx_eq(ray.direction.z, -1.0));
    }

    #[test]
    fn test_aabb_hit_front() {
        let b = Aabb::from_center_size(Vec3::zero(), Vec3::new(2.0, 2.0, 2.0));
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 0.0, -1.0));
        let t = b.intersect(&ray).expect("should hit");
        assert!(approx_eq(t, 9.0));
    }

    #[test]
    fn test_aabb_miss() {
        let b = Aabb::from_center_size(Vec3::zero(), Vec3::new(2.0, 2.0, 2.0));
        let ray = Ray::new(Vec3::new(5.0, 0.0, 10.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(b.intersect(&ray).is_none());
    }

    #[test]
    fn test_aabb_behind_origin() {
        let b = Aabb::from_center_size(Vec3::zero(), Vec3::new(2.0, 2.0, 2.0));
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(b.intersect(&ray).is_none());
    }

    #[test]
    fn test_camera_center_ray_points_at_target() {
        let camera = Camera::new();
        let ray = camera.ray_from_ndc(0.0, 0.0);
        let expected = camera.target.sub(&camera.position).normalize();
        assert!(approx_eq(ray.direction.x, expected.x));
        assert!(approx_eq(ray.direction.y, expected.y));
        assert!(approx_eq(ray.direction.z, expected.z));
    }

    #[test]
    fn test_project_inverts_ray() {
        let camera = Camera::new();
        let ray = camera.ray_from_ndc(0.3, -0.4);
        let (x, y) = camera.project(ray.origin.add(&ray.direction.scale(7.5))).expect("in front of camera");
        assert!(approx_eq(x, 0.3));
        assert!(approx_eq(y, -0.4));
    }

    #[test]
    fn test_project_behind_camera() {
        let camera = Camera::new();
        assert!(camera.project(Vec3::new(0.0, 5.0, 20.0)).is_none());
    }

    #[test]
    fn test_viewport_round_trip() {
        let viewport = Viewport::new(1024.0, 768.0);
        let (nx, ny) = viewport.to_ndc(256.0, 600.0);
        let (x, y) = viewport.to_pixels(nx, ny);
        assert!(approx_eq(x, 256.0));
        assert!(approx_eq(y, 600.0));
    }

    #[test]
    fn test_set_viewport_ignores_degenerate() {
        let mut camera = Camera::new();
        camera.set_viewport(0.0, 600.0);
        assert!(approx_eq(camera.aspect, 4.0 / 3.0));
        camera.set_viewport(1920.0, 1080.0);
        assert!(approx_eq(camera.aspect, 16.0 / 9.0));
    }
}
