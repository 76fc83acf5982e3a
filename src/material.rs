use crate::{DefaultRng, HitInfo, Ray};
use glam::Vec3;
use rand::prelude::*;
use rand_distr::{Distribution, UnitSphere};
use serde::{Deserialize, Serialize};

/// Samples a uniformly distributed unit vector.
pub fn sample_unit_sphere(rng: &mut DefaultRng) -> Vec3 {
    Vec3::from(UnitSphere.sample(rng))
}

/// Samples a unit vector in the hemisphere around `normal`.
pub fn sample_hemisphere(normal: Vec3, rng: &mut DefaultRng) -> Vec3 {
    let dir = sample_unit_sphere(rng);
    if dir.dot(normal) < 0.0 {
        -dir
    } else {
        dir
    }
}

/// Reflect vector v around normal n.
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract unit vector uv through the surface with normal n.
pub fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.dot(r_out_perp)).abs().sqrt() * n;

    r_out_perp + r_out_parallel
}

/// Schlick's approximation for reflectance.
pub fn schlick(cosine: f32, ref_idx: f32) -> f32 {
    let r0 = (1.0 - ref_idx) / (1.0 + ref_idx);
    let r0 = r0 * r0;

    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

/// Material kinds, in the order the persisted format numbers them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialKind {
    Lambertian,
    Metal,
    DiffuseLight,
    Dielectric,
}

impl MaterialKind {
    pub const COUNT: usize = 4;

    pub fn id(self) -> u32 {
        self as u32
    }

    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            0 => Some(MaterialKind::Lambertian),
            1 => Some(MaterialKind::Metal),
            2 => Some(MaterialKind::DiffuseLight),
            3 => Some(MaterialKind::Dielectric),
            _ => None,
        }
    }
}

/// Tagged reference locating a material within its kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialCoord {
    pub kind: MaterialKind,
    pub index: u32,
}

impl MaterialCoord {
    pub fn new(kind: MaterialKind, index: u32) -> Self {
        Self { kind, index }
    }
}

impl Default for MaterialCoord {
    fn default() -> Self {
        Self {
            kind: MaterialKind::Lambertian,
            index: 0,
        }
    }
}

/// Data produced by a scattering material; `None` from `scatter` means the
/// path ends at this surface.
#[derive(Clone, Copy, Debug)]
pub struct Scatter {
    pub attenuation: Vec3,
    pub scattered: Ray,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Material {
    Lambertian { albedo: Vec3 },
    Metal { albedo: Vec3, fuzz: f32 },
    DiffuseLight { emission: Vec3 },
    Dielectric { ir: f32 },
}

impl Material {
    pub fn kind(&self) -> MaterialKind {
        match self {
            Material::Lambertian { .. } => MaterialKind::Lambertian,
            Material::Metal { .. } => MaterialKind::Metal,
            Material::DiffuseLight { .. } => MaterialKind::DiffuseLight,
            Material::Dielectric { .. } => MaterialKind::Dielectric,
        }
    }

    pub fn emitted(&self) -> Vec3 {
        match self {
            Material::DiffuseLight { emission } => *emission,
            _ => Vec3::ZERO,
        }
    }

    pub fn scatter(&self, ray: &Ray, hit: &HitInfo, rng: &mut DefaultRng) -> Option<Scatter> {
        match *self {
            Material::Lambertian { albedo } => {
                let direction = hit.normal * 0.25 + sample_hemisphere(hit.normal, rng);

                Some(Scatter {
                    attenuation: albedo,
                    scattered: Ray::new(hit.point, direction),
                })
            }
            Material::Metal { albedo, fuzz } => {
                let reflected =
                    reflect(ray.direction, hit.normal).normalize() + fuzz * sample_unit_sphere(rng);

                // A fuzzed reflection below the surface is absorbed.
                if reflected.dot(hit.normal) < 0.0 {
                    return None;
                }

                Some(Scatter {
                    attenuation: albedo,
                    scattered: Ray::new(hit.point, reflected),
                })
            }
            Material::DiffuseLight { .. } => None,
            Material::Dielectric { ir } => {
                let refraction_ratio = if hit.front_face { 1.0 / ir } else { ir };

                let unit_direction = ray.direction.normalize();
                let cos_theta = (-unit_direction).dot(hit.normal).min(1.0);
                let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

                let cannot_refract = refraction_ratio * sin_theta > 1.0;
                let direction = if cannot_refract
                    || schlick(cos_theta, refraction_ratio) > rng.gen::<f32>()
                {
                    reflect(unit_direction, hit.normal)
                } else {
                    refract(unit_direction, hit.normal, refraction_ratio)
                };

                Some(Scatter {
                    // Glass absorbs nothing.
                    attenuation: Vec3::ONE,
                    scattered: Ray::new(hit.point, direction),
                })
            }
        }
    }
}

/// All materials of a scene in one homogeneous array, addressed by
/// `(kind, index)` coordinates.
#[derive(Clone, Debug, Default)]
pub struct MaterialSet {
    materials: Vec<Material>,
    by_kind: [Vec<u32>; MaterialKind::COUNT],
}

impl MaterialSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a material, returning the coordinate that now addresses it.
    pub fn push(&mut self, material: Material) -> MaterialCoord {
        let kind = material.kind();
        let flat = self.materials.len() as u32;
        self.materials.push(material);

        let slots = &mut self.by_kind[kind.id() as usize];
        slots.push(flat);

        MaterialCoord::new(kind, slots.len() as u32 - 1)
    }

    pub fn get(&self, coord: MaterialCoord) -> Option<&Material> {
        self.by_kind[coord.kind.id() as usize]
            .get(coord.index as usize)
            .map(|&flat| &self.materials[flat as usize])
    }

    /// Infallible lookup for render-time use; coordinates are validated when
    /// the scene is assembled.
    pub fn resolve(&self, coord: MaterialCoord) -> &Material {
        let flat = self.by_kind[coord.kind.id() as usize][coord.index as usize];
        &self.materials[flat as usize]
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}
