use crate::{DefaultRng, Ray};
use glam::Vec3;
use rand::prelude::*;

/// Pinhole camera. Pixel (0, 0) is the bottom-left corner of the viewport;
/// `get_ray` jitters inside the pixel footprint for box-filter antialiasing.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    lookfrom: Vec3,
    pixel00: Vec3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
    image_width: u32,
    image_height: u32,
}

impl Camera {
    pub fn new(
        lookfrom: Vec3,
        lookat: Vec3,
        vup: Vec3,
        vfov: f32,
        aspect_ratio: f32,
        image_width: u32,
    ) -> Self {
        let image_height = (image_width as f32 / aspect_ratio) as u32;

        let focal_length = (lookfrom - lookat).length();
        let theta = vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h * focal_length;
        let viewport_width = viewport_height * (image_width as f32 / image_height as f32);

        let w = (lookfrom - lookat).normalize();
        let u = vup.cross(w).normalize();
        let v = w.cross(u);

        let viewport_u = viewport_width * u;
        let viewport_v = viewport_height * v;

        let pixel_delta_u = viewport_u / image_width as f32;
        let pixel_delta_v = viewport_v / image_height as f32;

        let bottom_left = lookfrom - focal_length * w - viewport_u / 2.0 - viewport_v / 2.0;
        let pixel00 = bottom_left + 0.5 * (pixel_delta_u + pixel_delta_v);

        Self {
            lookfrom,
            pixel00,
            pixel_delta_u,
            pixel_delta_v,
            image_width,
            image_height,
        }
    }

    pub fn image_width(&self) -> u32 {
        self.image_width
    }

    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    /// Primary ray through pixel (i, j), jittered by up to half a pixel on
    /// each axis.
    pub fn get_ray(&self, i: u32, j: u32, rng: &mut DefaultRng) -> Ray {
        let offset_x = rng.gen::<f32>() - 0.5;
        let offset_y = rng.gen::<f32>() - 0.5;

        let pixel_center = self.pixel00
            + (i as f32 + offset_x) * self.pixel_delta_u
            + (j as f32 + offset_y) * self.pixel_delta_v;

        Ray::new(self.lookfrom, pixel_center - self.lookfrom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec3;
    use rand::SeedableRng;

    fn test_camera() -> Camera {
        Camera::new(
            vec3(0.0, 0.0, 5.0),
            Vec3::ZERO,
            vec3(0.0, 1.0, 0.0),
            90.0,
            2.0,
            200,
        )
    }

    #[test]
    fn derives_image_height_from_aspect_ratio() {
        let camera = test_camera();
        assert_eq!(camera.image_width(), 200);
        assert_eq!(camera.image_height(), 100);
    }

    #[test]
    fn center_pixel_looks_at_the_target() {
        let camera = test_camera();
        let mut rng = DefaultRng::seed_from_u64(3);

        // The jitter is at most half a pixel, so the center ray direction
        // stays within about one pixel delta of the exact view axis.
        let ray = camera.get_ray(100, 50, &mut rng);
        let dir = ray.direction.normalize();
        let toward_target = (Vec3::ZERO - ray.origin).normalize();
        assert!((dir - toward_target).length() < 0.05);
    }

    #[test]
    fn pixel_origin_is_bottom_left() {
        let camera = test_camera();
        let mut rng = DefaultRng::seed_from_u64(3);

        let ray = camera.get_ray(0, 0, &mut rng);
        // Looking down -z from +z: bottom-left of the viewport has negative
        // x and y.
        assert!(ray.direction.x < 0.0);
        assert!(ray.direction.y < 0.0);
        assert!(ray.direction.z < 0.0);
    }

    #[test]
    fn rays_start_at_the_eye() {
        let camera = test_camera();
        let mut rng = DefaultRng::seed_from_u64(3);
        let ray = camera.get_ray(17, 42, &mut rng);
        assert_eq!(ray.origin, vec3(0.0, 0.0, 5.0));
    }
}
