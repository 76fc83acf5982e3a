pub mod bvh;
pub mod camera;
pub mod config;
pub mod environment;
pub mod integrator;
pub mod material;
pub mod mesh;
pub mod persist;
pub mod primitives;
pub mod ray;
pub mod renderer;
pub mod scene;

pub use crate::{
    bvh::{Bvh, BvhBuilder, BvhNode},
    camera::Camera,
    environment::Environment,
    material::{Material, MaterialCoord, MaterialKind, MaterialSet, Scatter},
    mesh::MeshInstance,
    primitives::{Aabb, Quad, Sphere, Triangle},
    ray::{HitInfo, Ray},
    scene::{Scene, TraceStats},
};

/// Rejection threshold for near-zero determinants, plane denominators and
/// ray direction components.
pub const EPS: f32 = 1e-4;

pub type DefaultRng = rand_xoshiro::Xoshiro256Plus;
