use crate::{primitives::Triangle, Ray, EPS};
use glam::Vec3;

/// Axis-aligned bounding box. The empty box keeps min at +inf and max at
/// -inf so the first point grown into it becomes the initial bound.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn surface_area(&self) -> f32 {
        let d = self.max - self.min;
        2.0 * (d.x * d.y + d.y * d.z + d.z * d.x)
    }

    pub fn grow_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn grow_triangle(&mut self, triangle: &Triangle) {
        self.grow_point(triangle.v0);
        self.grow_point(triangle.v1);
        self.grow_point(triangle.v2);
    }

    /// Slab test. Returns the entry distance, or +inf on a miss. The entry
    /// distance is negative when the box straddles the ray origin; callers
    /// that prune against a current-closest distance want exactly that.
    pub fn hit(&self, ray: &Ray) -> f32 {
        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;

        for axis in 0..3 {
            if ray.direction[axis].abs() < EPS {
                // Parallel to this slab: a miss unless the origin lies inside it.
                if ray.origin[axis] < self.min[axis] || ray.origin[axis] > self.max[axis] {
                    return f32::INFINITY;
                }
            } else {
                let mut t1 = (self.min[axis] - ray.origin[axis]) / ray.direction[axis];
                let mut t2 = (self.max[axis] - ray.origin[axis]) / ray.direction[axis];
                if t1 > t2 {
                    std::mem::swap(&mut t1, &mut t2);
                }

                t_min = t_min.max(t1);
                t_max = t_max.min(t2);

                if t_min > t_max {
                    return f32::INFINITY;
                }
            }
        }

        t_min
    }
}
