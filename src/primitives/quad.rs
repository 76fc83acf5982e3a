use crate::{material::MaterialCoord, HitInfo, Ray, EPS};
use glam::Vec3;

/// A parallelogram spanned by `u` and `v` from corner `q`. The plane
/// constant `d` and the basis-projection vector `w` are precomputed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quad {
    pub q: Vec3,
    pub u: Vec3,
    pub v: Vec3,
    pub normal: Vec3,
    pub d: f32,
    pub w: Vec3,
    pub material: MaterialCoord,
}

impl Quad {
    pub fn new(q: Vec3, u: Vec3, v: Vec3, material: MaterialCoord) -> Self {
        let normal = u.cross(v).normalize();
        let d = normal.dot(q);
        let w = normal / normal.dot(normal);

        Self {
            q,
            u,
            v,
            normal,
            d,
            w,
            material,
        }
    }

    fn is_interior(alpha: f32, beta: f32) -> bool {
        (0.0..=1.0).contains(&alpha) && (0.0..=1.0).contains(&beta)
    }

    pub fn hit(&self, ray: &Ray) -> Option<HitInfo> {
        let denom = self.normal.dot(ray.direction);
        if denom.abs() <= EPS {
            return None;
        }

        let t = (self.d - self.normal.dot(ray.origin)) / denom;
        if t <= EPS {
            return None;
        }

        let point = ray.at(t);
        let planar = point - self.q;

        let area_uv = self.w.dot(self.u.cross(self.v));
        let alpha = self.w.dot(planar.cross(self.v)) / area_uv;
        let beta = self.w.dot(self.u.cross(planar)) / area_uv;

        if !Self::is_interior(alpha, beta) {
            return None;
        }

        let front_face = denom < 0.0;
        Some(HitInfo {
            dst: (ray.origin - point).length(),
            point,
            normal: if front_face { self.normal } else { -self.normal },
            material: self.material,
            front_face,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec3;

    fn unit_quad() -> Quad {
        Quad::new(
            Vec3::ZERO,
            vec3(1.0, 0.0, 0.0),
            vec3(0.0, 1.0, 0.0),
            MaterialCoord::default(),
        )
    }

    #[test]
    fn hits_interior() {
        let quad = unit_quad();
        let ray = Ray::new(vec3(0.5, 0.5, 3.0), vec3(0.0, 0.0, -1.0));

        let hit = quad.hit(&ray).unwrap();
        assert!((hit.dst - 3.0).abs() < 1e-5);
        assert!((hit.point - vec3(0.5, 0.5, 0.0)).length() < 1e-5);
        assert!(hit.normal.dot(ray.direction) < 0.0);
    }

    #[test]
    fn misses_outside_edges() {
        let quad = unit_quad();
        let ray = Ray::new(vec3(1.5, 0.5, 3.0), vec3(0.0, 0.0, -1.0));
        assert!(quad.hit(&ray).is_none());
    }

    #[test]
    fn misses_parallel_ray() {
        let quad = unit_quad();
        let ray = Ray::new(vec3(0.5, 0.5, 3.0), vec3(1.0, 0.0, 0.0));
        assert!(quad.hit(&ray).is_none());
    }

    #[test]
    fn skewed_basis_interior_test() {
        // Non-rectangular parallelogram; the w projection handles the skew.
        let quad = Quad::new(
            Vec3::ZERO,
            vec3(1.0, 0.0, 0.0),
            vec3(1.0, 1.0, 0.0),
            MaterialCoord::default(),
        );

        let inside = Ray::new(vec3(1.0, 0.5, 3.0), vec3(0.0, 0.0, -1.0));
        assert!(quad.hit(&inside).is_some());

        // Inside the bounding rectangle but outside the parallelogram.
        let outside = Ray::new(vec3(0.1, 0.9, 3.0), vec3(0.0, 0.0, -1.0));
        assert!(quad.hit(&outside).is_none());
    }
}
