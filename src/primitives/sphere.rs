use crate::{material::MaterialCoord, HitInfo, Ray};
use glam::Vec3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
    pub material: MaterialCoord,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32, material: MaterialCoord) -> Self {
        Self {
            center,
            radius,
            material,
        }
    }

    /// Standard quadratic intersection. Only the near root is accepted, so a
    /// ray starting inside the sphere reports a miss.
    pub fn hit(&self, ray: &Ray) -> Option<HitInfo> {
        let oc = self.center - ray.origin;
        let a = ray.direction.dot(ray.direction);
        let b = -2.0 * ray.direction.dot(oc);
        let c = oc.dot(oc) - self.radius * self.radius;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }

        let t = (-b - discriminant.sqrt()) / (2.0 * a);
        if t < 0.0 {
            return None;
        }

        let point = ray.at(t);
        let normal = (point - self.center).normalize();
        Some(HitInfo {
            dst: (ray.origin - point).length(),
            point,
            normal,
            material: self.material,
            front_face: ray.direction.dot(normal) < 0.0,
        })
    }
}
