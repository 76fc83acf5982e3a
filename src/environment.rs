use crate::Ray;
use glam::{vec3, Vec3};
use image::RgbImage;
use std::f32::consts::PI;

/// Radiance picked up by rays that leave the scene. Implementations must be
/// shareable across render threads.
pub trait Environment: Send + Sync {
    fn radiance(&self, ray: &Ray) -> Vec3;
}

/// No environment light at all (Cornell-box style scenes).
pub struct Black;

impl Environment for Black {
    fn radiance(&self, _ray: &Ray) -> Vec3 {
        Vec3::ZERO
    }
}

/// The classic vertical white-to-blue gradient.
pub struct Gradient;

impl Environment for Gradient {
    fn radiance(&self, ray: &Ray) -> Vec3 {
        let dir = ray.direction.normalize();
        let a = 0.5 * (dir.y + 1.0);

        (1.0 - a) * vec3(1.0, 1.0, 1.0) + a * vec3(0.5, 0.7, 1.0)
    }
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Analytic sky: horizon-to-zenith gradient over a ground color, plus a
/// directional sun visible above the horizon.
pub struct SimpleSky {
    pub horizon: Vec3,
    pub zenith: Vec3,
    pub ground: Vec3,
    pub sun_direction: Vec3,
    pub sun_focus: f32,
    pub sun_intensity: f32,
}

impl Default for SimpleSky {
    fn default() -> Self {
        Self {
            horizon: vec3(1.0, 0.5, 0.5),
            zenith: vec3(0.64, 0.7, 1.0),
            ground: vec3(0.5, 0.5, 0.5),
            sun_direction: vec3(-10.0, -100.0, -10.0),
            sun_focus: 5.0,
            sun_intensity: 10.0,
        }
    }
}

impl Environment for SimpleSky {
    fn radiance(&self, ray: &Ray) -> Vec3 {
        let sky_t = smoothstep(0.0, 0.4, ray.direction.y).powf(0.35);
        let sky = self.horizon.lerp(self.zenith, sky_t);

        let sun = ray.direction.dot(-self.sun_direction).max(0.0).powf(self.sun_focus)
            * self.sun_intensity;

        let ground_to_sky = smoothstep(-0.01, 0.0, ray.direction.y);
        let sun_mask = if ground_to_sky >= 1.0 { 1.0 } else { 0.0 };

        self.ground.lerp(sky, ground_to_sky) + sun * sun_mask * Vec3::ONE
    }
}

/// Equirectangular lookup into an LDR panorama.
pub struct Hdri {
    image: RgbImage,
}

impl Hdri {
    pub fn new(image: RgbImage) -> Self {
        Self { image }
    }
}

impl Environment for Hdri {
    fn radiance(&self, ray: &Ray) -> Vec3 {
        let dir = ray.direction.normalize();

        let phi = dir.z.atan2(dir.x);
        let theta = dir.y.clamp(-1.0, 1.0).acos();

        let u = (phi + PI) / (2.0 * PI);
        let v = theta / PI;

        let width = self.image.width();
        let height = self.image.height();

        let px = (u * width as f32) as u32 % width;
        let py = ((v * height as f32) as u32).min(height - 1);

        let [r, g, b] = self.image.get_pixel(px, py).0;
        vec3(r as f32, g as f32, b as f32) / 255.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_blends_with_height() {
        let up = Ray::new(Vec3::ZERO, vec3(0.0, 1.0, 0.0));
        let down = Ray::new(Vec3::ZERO, vec3(0.0, -1.0, 0.0));

        assert_eq!(Gradient.radiance(&up), vec3(0.5, 0.7, 1.0));
        assert_eq!(Gradient.radiance(&down), Vec3::ONE);
    }

    #[test]
    fn sky_is_ground_below_horizon() {
        let sky = SimpleSky::default();
        let down = Ray::new(Vec3::ZERO, vec3(0.0, -1.0, 0.0));
        assert_eq!(sky.radiance(&down), sky.ground);
    }

    #[test]
    fn hdri_maps_poles_to_image_rows() {
        let mut image = RgbImage::new(4, 2);
        for (_, y, pixel) in image.enumerate_pixels_mut() {
            *pixel = if y == 0 {
                image::Rgb([255, 0, 0])
            } else {
                image::Rgb([0, 0, 255])
            };
        }
        let env = Hdri::new(image);

        let up = Ray::new(Vec3::ZERO, vec3(0.0, 1.0, 0.0));
        let down = Ray::new(Vec3::ZERO, vec3(0.0, -1.0, 0.0));

        assert_eq!(env.radiance(&up), vec3(1.0, 0.0, 0.0));
        assert_eq!(env.radiance(&down), vec3(0.0, 0.0, 1.0));
    }
}
