use crate::{material::MaterialCoord, scene::TraceStats, Bvh, HitInfo, Ray};
use glam::{Mat4, Vec3};

/// Builds the world-to-local matrix for an instance placed by translation,
/// intrinsic X-then-Y-then-Z rotation (degrees) and scale: the inverse of
/// `T * Rz * Ry * Rx * S`.
pub fn world_to_local(translation: Vec3, rotation_degrees: Vec3, scale: Vec3) -> Mat4 {
    let t = Mat4::from_translation(translation);
    let rx = Mat4::from_rotation_x(rotation_degrees.x.to_radians());
    let ry = Mat4::from_rotation_y(rotation_degrees.y.to_radians());
    let rz = Mat4::from_rotation_z(rotation_degrees.z.to_radians());
    let s = Mat4::from_scale(scale);

    (t * rz * ry * rx * s).inverse()
}

/// One placement of the shared compiled BVH: a world-to-local transform and
/// the material every hit on this instance reports.
#[derive(Clone, Copy, Debug)]
pub struct MeshInstance {
    pub world_to_local: Mat4,
    /// Cached inverse of `world_to_local`, used to map hits back out.
    pub local_to_world: Mat4,
    pub material: MaterialCoord,
}

impl MeshInstance {
    pub fn new(world_to_local: Mat4, material: MaterialCoord) -> Self {
        Self {
            world_to_local,
            local_to_world: world_to_local.inverse(),
            material,
        }
    }

    pub fn from_transform(
        translation: Vec3,
        rotation_degrees: Vec3,
        scale: Vec3,
        material: MaterialCoord,
    ) -> Self {
        Self::new(world_to_local(translation, rotation_degrees, scale), material)
    }

    /// Maps the world ray into local space. The direction is renormalized,
    /// so local hit distances are not world distances.
    fn transform_ray(&self, ray: &Ray) -> Ray {
        let origin = self.world_to_local.transform_point3(ray.origin);
        let direction = self
            .world_to_local
            .transform_vector3(ray.direction)
            .normalize();

        Ray::new(origin, direction)
    }

    /// Maps a local-space hit back to world space and recomputes the true
    /// world distance from the ray origin.
    fn transform_hit(&self, mut hit: HitInfo, ray: &Ray) -> HitInfo {
        let world_point = self.local_to_world.transform_point3(hit.point);
        let world_normal = self
            .world_to_local
            .transpose()
            .transform_vector3(hit.normal)
            .normalize();

        hit.point = world_point;
        hit.normal = world_normal;
        hit.dst = (world_point - ray.origin).length();
        hit
    }

    /// Nearest hit of the world-space `ray` against this instance.
    pub fn hit(&self, ray: &Ray, bvh: &Bvh, stats: &mut TraceStats) -> Option<HitInfo> {
        let local_ray = self.transform_ray(ray);

        bvh.hit_local(&local_ray, stats).map(|mut hit| {
            hit.material = self.material;
            self.transform_hit(hit, ray)
        })
    }
}
