use crate::{material::MaterialCoord, HitInfo, Ray, EPS};
use glam::Vec3;

/// A triangle with precomputed edges and unit normal. Immutable once built;
/// the BVH builder only moves whole triangles around.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub v0: Vec3,
    pub v1: Vec3,
    pub v2: Vec3,
    pub e1: Vec3,
    pub e2: Vec3,
    pub normal: Vec3,
    pub material: MaterialCoord,
}

impl Triangle {
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: MaterialCoord) -> Self {
        let e1 = v1 - v0;
        let e2 = v2 - v0;
        let normal = e1.cross(e2).normalize();

        Self {
            v0,
            v1,
            v2,
            e1,
            e2,
            normal,
            material,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.v0 + self.v1 + self.v2) / 3.0
    }

    /// Moller-Trumbore intersection. The reported distance is the ray
    /// parameter `t`.
    pub fn hit(&self, ray: &Ray) -> Option<HitInfo> {
        let t_vec = ray.origin - self.v0;
        let d = ray.direction;

        let p = d.cross(self.e2);
        let det = p.dot(self.e1);

        if det.abs() <= EPS {
            return None;
        }
        let inv_det = 1.0 / det;

        let u = p.dot(t_vec) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = t_vec.cross(self.e1);
        let v = q.dot(d) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = q.dot(self.e2) * inv_det;
        if t <= EPS {
            return None;
        }

        let front_face = self.normal.dot(d) < 0.0;
        Some(HitInfo {
            dst: t,
            point: ray.origin + t * d,
            normal: if front_face { self.normal } else { -self.normal },
            material: self.material,
            front_face,
        })
    }
}
