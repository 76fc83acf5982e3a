use crate::{
    environment::Environment,
    material::MaterialSet,
    mesh::MeshInstance,
    primitives::{Quad, Sphere},
    Bvh, HitInfo, Ray,
};
use std::ops::AddAssign;

/// Intersection-test counters, kept for diagnostics and cost visualization.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TraceStats {
    pub triangle_tests: u64,
    pub box_tests: u64,
}

impl AddAssign for TraceStats {
    fn add_assign(&mut self, other: Self) {
        self.triangle_tests += other.triangle_tests;
        self.box_tests += other.box_tests;
    }
}

/// Everything a ray can hit, plus the material table and the environment.
/// Spheres and quads are tested brute force; triangle geometry goes through
/// the shared BVH, once per mesh instance.
pub struct Scene {
    pub spheres: Vec<Sphere>,
    pub quads: Vec<Quad>,
    pub meshes: Vec<MeshInstance>,
    pub bvh: Bvh,
    pub materials: MaterialSet,
    pub environment: Box<dyn Environment>,
    /// Number of trailing quads hidden from camera rays. Lets a light panel
    /// illuminate the scene without showing up in primary visibility.
    pub primary_hidden_quads: usize,
}

impl Scene {
    /// Globally closest hit. `primary` marks camera rays, which skip the
    /// configured trailing quads.
    pub fn hit(&self, ray: &Ray, primary: bool, stats: &mut TraceStats) -> Option<HitInfo> {
        let mut closest: Option<HitInfo> = None;
        let mut closest_dst = f32::INFINITY;

        for sphere in &self.spheres {
            if let Some(hit) = sphere.hit(ray) {
                if hit.dst < closest_dst {
                    closest_dst = hit.dst;
                    closest = Some(hit);
                }
            }
        }

        let visible_quads = if primary {
            self.quads.len().saturating_sub(self.primary_hidden_quads)
        } else {
            self.quads.len()
        };
        for quad in &self.quads[..visible_quads] {
            if let Some(hit) = quad.hit(ray) {
                if hit.dst < closest_dst {
                    closest_dst = hit.dst;
                    closest = Some(hit);
                }
            }
        }

        for mesh in &self.meshes {
            if let Some(hit) = mesh.hit(ray, &self.bvh, stats) {
                if hit.dst < closest_dst {
                    closest_dst = hit.dst;
                    closest = Some(hit);
                }
            }
        }

        closest
    }
}
