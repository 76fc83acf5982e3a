use crate::material::MaterialCoord;
use glam::Vec3;

/// The ray data type. Directions are not required to be normalized;
/// everything that depends on unit length renormalizes explicitly.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + t * self.direction
    }
}

/// Result of a successful intersection, consumed by the integrator.
#[derive(Clone, Copy, Debug)]
pub struct HitInfo {
    /// Distance from the ray origin to the hit point. Spheres and quads
    /// report euclidean distance, triangles the ray parameter; mesh
    /// traversal normalizes its local direction and recomputes the world
    /// distance, so scene-level comparisons are uniformly euclidean.
    pub dst: f32,
    pub point: Vec3,
    pub normal: Vec3,
    pub material: MaterialCoord,
    /// Whether the ray arrived from the side the geometric normal points to.
    pub front_face: bool,
}
