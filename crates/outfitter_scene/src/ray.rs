use glam::{Affine3A, Mat4, Vec2, Vec3};

use crate::bounds::BoundingBox;

/// A half-line used for pointer picking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

impl Ray {
    #[must_use]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction: direction.normalize_or_zero() }
    }

    /// Ray through a pointer position given in normalized device coordinates
    /// (`[-1, 1]` on both axes, +Y up).
    ///
    /// `view_projection` maps world space to clip space with a `[0, 1]` depth range.
    #[must_use]
    pub fn from_ndc(ndc: Vec2, view_projection: Mat4) -> Option<Self> {
        let inverse = view_projection.inverse();
        if !inverse.is_finite() {
            return None;
        }
        let near = inverse.project_point3(ndc.extend(0.0));
        let far = inverse.project_point3(ndc.extend(1.0));
        let direction = far - near;
        if direction.length_squared() <= f32::EPSILON {
            return None;
        }
        Some(Self::new(near, direction))
    }

    #[inline]
    #[must_use]
    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }

    /// Slab test against an axis-aligned box. Returns the entry distance,
    /// clamped to zero when the origin is inside.
    #[must_use]
    pub fn intersect_aabb(&self, bounds: &BoundingBox) -> Option<f32> {
        slab_test(self.origin, self.direction, bounds)
    }

    /// Intersection with a box given in the local space of `world`.
    ///
    /// The ray is carried into local space without renormalizing, so the
    /// returned parameter is still a world-space distance.
    #[must_use]
    pub fn intersect_box_transformed(&self, bounds: &BoundingBox, world: &Affine3A) -> Option<f32> {
        if bounds.is_empty() || world.matrix3.determinant().abs() <= f32::EPSILON {
            return None;
        }
        let inverse = world.inverse();
        let origin = inverse.transform_point3(self.origin);
        let direction = inverse.transform_vector3(self.direction);
        slab_test(origin, direction, bounds)
    }
}

fn slab_test(origin: Vec3, direction: Vec3, bounds: &BoundingBox) -> Option<f32> {
    let inv_dir = direction.recip();

    let t1 = (bounds.min.x - origin.x) * inv_dir.x;
    let t2 = (bounds.max.x - origin.x) * inv_dir.x;
    let t3 = (bounds.min.y - origin.y) * inv_dir.y;
    let t4 = (bounds.max.y - origin.y) * inv_dir.y;
    let t5 = (bounds.min.z - origin.z) * inv_dir.z;
    let t6 = (bounds.max.z - origin.z) * inv_dir.z;

    // f32::min/max discard NaN from 0 * inf on axis-parallel rays.
    let tmin = t1.min(t2).max(t3.min(t4)).max(t5.min(t6));
    let tmax = t1.max(t2).min(t3.max(t4)).min(t5.max(t6));

    if tmax < 0.0 || tmin > tmax { None } else { Some(tmin.max(0.0)) }
}
