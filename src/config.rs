//! TOML scene descriptions: camera, render settings, materials, primitive
//! lists and mesh instances, assembled into a ready-to-run `Renderer`.

use crate::{
    environment::{Black, Environment, Gradient, Hdri, SimpleSky},
    material::{Material, MaterialCoord, MaterialSet},
    mesh::MeshInstance,
    persist,
    primitives::{Quad, Sphere},
    renderer::Renderer,
    Bvh, BvhBuilder, Camera, Scene,
};
use anyhow::{bail, Context, Result};
use glam::Vec3;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

fn default_up() -> Vec3 {
    Vec3::Y
}

fn default_scale() -> Vec3 {
    Vec3::ONE
}

fn default_samples() -> u32 {
    32
}

fn default_max_bounce() -> u32 {
    8
}

fn default_gamma() -> f32 {
    2.2
}

fn default_output() -> PathBuf {
    PathBuf::from("render.png")
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CameraConfig {
    pub look_from: Vec3,
    pub look_at: Vec3,
    #[serde(default = "default_up")]
    pub up: Vec3,
    pub vfov: f32,
    pub aspect_ratio: f32,
    pub image_width: u32,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    #[serde(default = "default_samples")]
    pub samples: u32,
    #[serde(default = "default_max_bounce")]
    pub max_bounce: u32,
    #[serde(default = "default_gamma")]
    pub gamma: f32,
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// Trailing quads hidden from camera rays, see `Scene`.
    #[serde(default)]
    pub primary_hidden_quads: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples: default_samples(),
            max_bounce: default_max_bounce(),
            gamma: default_gamma(),
            output: default_output(),
            primary_hidden_quads: 0,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EnvironmentConfig {
    Black,
    Gradient,
    SimpleSky,
    Hdri { path: PathBuf },
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        EnvironmentConfig::Black
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LambertianConfig {
    pub albedo: Vec3,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetalConfig {
    pub albedo: Vec3,
    #[serde(default)]
    pub fuzz: f32,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiffuseLightConfig {
    pub emission: Vec3,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DielectricConfig {
    pub ir: f32,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MaterialsConfig {
    #[serde(default)]
    pub lambertian: Vec<LambertianConfig>,
    #[serde(default)]
    pub metal: Vec<MetalConfig>,
    #[serde(default)]
    pub diffuse_light: Vec<DiffuseLightConfig>,
    #[serde(default)]
    pub dielectric: Vec<DielectricConfig>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SphereConfig {
    pub center: Vec3,
    pub radius: f32,
    pub material: MaterialCoord,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuadConfig {
    pub q: Vec3,
    pub u: Vec3,
    pub v: Vec3,
    pub material: MaterialCoord,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MeshDataConfig {
    /// Persisted triangle stream.
    pub triangles: PathBuf,
    /// Persisted node stream. When absent the SAH builder runs at load time.
    #[serde(default)]
    pub nodes: Option<PathBuf>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MeshConfig {
    #[serde(default)]
    pub translation: Vec3,
    #[serde(default)]
    pub rotation_degrees: Vec3,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
    pub material: MaterialCoord,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneConfig {
    pub camera: CameraConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub environment: EnvironmentConfig,
    #[serde(default)]
    pub materials: MaterialsConfig,
    #[serde(default)]
    pub spheres: Vec<SphereConfig>,
    #[serde(default)]
    pub quads: Vec<QuadConfig>,
    #[serde(default)]
    pub mesh_data: Option<MeshDataConfig>,
    #[serde(default)]
    pub meshes: Vec<MeshConfig>,
}

impl SceneConfig {
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("failed to parse scene description")
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read scene file {}", path.display()))?;
        Self::parse(&text)
    }

    /// Assembles the renderer. Relative mesh and HDRI paths are resolved
    /// against `base_dir` (usually the scene file's directory).
    pub fn build(self, base_dir: &Path) -> Result<(Renderer, RenderConfig)> {
        let mut materials = MaterialSet::new();
        for lambertian in &self.materials.lambertian {
            materials.push(Material::Lambertian {
                albedo: lambertian.albedo,
            });
        }
        for metal in &self.materials.metal {
            materials.push(Material::Metal {
                albedo: metal.albedo,
                fuzz: metal.fuzz,
            });
        }
        for light in &self.materials.diffuse_light {
            materials.push(Material::DiffuseLight {
                emission: light.emission,
            });
        }
        for dielectric in &self.materials.dielectric {
            materials.push(Material::Dielectric { ir: dielectric.ir });
        }

        let check = |coord: MaterialCoord, what: &str, index: usize| -> Result<()> {
            if materials.get(coord).is_none() {
                bail!(
                    "{} {} references missing material {:?} #{}",
                    what,
                    index,
                    coord.kind,
                    coord.index
                );
            }
            Ok(())
        };

        let mut spheres = Vec::with_capacity(self.spheres.len());
        for (i, sphere) in self.spheres.iter().enumerate() {
            check(sphere.material, "sphere", i)?;
            spheres.push(Sphere::new(sphere.center, sphere.radius, sphere.material));
        }

        let mut quads = Vec::with_capacity(self.quads.len());
        for (i, quad) in self.quads.iter().enumerate() {
            check(quad.material, "quad", i)?;
            quads.push(Quad::new(quad.q, quad.u, quad.v, quad.material));
        }

        let mut meshes = Vec::with_capacity(self.meshes.len());
        for (i, mesh) in self.meshes.iter().enumerate() {
            check(mesh.material, "mesh", i)?;
            meshes.push(MeshInstance::from_transform(
                mesh.translation,
                mesh.rotation_degrees,
                mesh.scale,
                mesh.material,
            ));
        }

        let bvh = match &self.mesh_data {
            Some(data) => {
                let triangles = persist::load_triangles(base_dir.join(&data.triangles))?;
                match &data.nodes {
                    Some(nodes) => Bvh::new(triangles, persist::load_nodes(base_dir.join(nodes))?),
                    None => BvhBuilder::new(triangles).build(),
                }
            }
            None => {
                if !meshes.is_empty() {
                    bail!("scene places mesh instances but no mesh_data is configured");
                }
                Bvh::default()
            }
        };

        let environment: Box<dyn Environment> = match self.environment {
            EnvironmentConfig::Black => Box::new(Black),
            EnvironmentConfig::Gradient => Box::new(Gradient),
            EnvironmentConfig::SimpleSky => Box::new(SimpleSky::default()),
            EnvironmentConfig::Hdri { path } => {
                let path = base_dir.join(path);
                let image = image::open(&path)
                    .with_context(|| format!("failed to load HDRI {}", path.display()))?;
                Box::new(Hdri::new(image.to_rgb8()))
            }
        };

        let camera = Camera::new(
            self.camera.look_from,
            self.camera.look_at,
            self.camera.up,
            self.camera.vfov,
            self.camera.aspect_ratio,
            self.camera.image_width,
        );

        let scene = Scene {
            spheres,
            quads,
            meshes,
            bvh,
            materials,
            environment,
            primary_hidden_quads: self.render.primary_hidden_quads,
        };

        let render = self.render;
        Ok((
            Renderer {
                scene,
                camera,
                max_bounce: render.max_bounce,
            },
            render,
        ))
    }
}
