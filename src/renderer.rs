use crate::{integrator, Camera, DefaultRng, Scene, TraceStats};
use glam::Vec3;
use rand::prelude::*;
use rayon::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};

/// Accumulated radiance per pixel. Dividing by the completed pass count at
/// any time yields a valid partial render.
pub struct Film {
    width: u32,
    height: u32,
    accum: Vec<Vec3>,
    passes: u32,
}

impl Film {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            accum: vec![Vec3::ZERO; (width * height) as usize],
            passes: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn passes(&self) -> u32 {
        self.passes
    }

    /// Averages, gamma corrects, clamps to [0, 1] and flips rows (the camera
    /// places pixel (0, 0) bottom-left, images start top-left).
    pub fn to_rgb8(&self, gamma: f32) -> Vec<u8> {
        let scale = 1.0 / self.passes.max(1) as f32;
        let inv_gamma = 1.0 / gamma;

        let mut buffer = Vec::with_capacity(self.accum.len() * 3);
        for row in (0..self.height).rev() {
            for col in 0..self.width {
                let color = self.accum[(row * self.width + col) as usize] * scale;
                for &channel in &[color.x, color.y, color.z] {
                    let corrected = channel.max(0.0).powf(inv_gamma).min(1.0);
                    buffer.push((255.99 * corrected) as u8);
                }
            }
        }

        buffer
    }
}

pub struct Renderer {
    pub scene: Scene,
    pub camera: Camera,
    pub max_bounce: u32,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("camera", &self.camera)
            .field("max_bounce", &self.max_bounce)
            .finish_non_exhaustive()
    }
}

impl Renderer {
    pub fn new_film(&self) -> Film {
        Film::new(self.camera.image_width(), self.camera.image_height())
    }

    /// Adds one sample to every pixel, rows in parallel, each row on its own
    /// entropy-seeded random stream. Returns the intersection counters of
    /// the pass.
    pub fn render_pass(&self, film: &mut Film) -> TraceStats {
        let width = film.width as usize;
        let triangle_tests = AtomicU64::new(0);
        let box_tests = AtomicU64::new(0);

        film.accum
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(j, row)| {
                let mut rng = DefaultRng::from_entropy();
                let mut row_stats = TraceStats::default();

                for (i, pixel) in row.iter_mut().enumerate() {
                    let ray = self.camera.get_ray(i as u32, j as u32, &mut rng);
                    let (radiance, stats) =
                        integrator::trace(ray, &self.scene, self.max_bounce, &mut rng);

                    *pixel += radiance;
                    row_stats += stats;
                }

                triangle_tests.fetch_add(row_stats.triangle_tests, Ordering::Relaxed);
                box_tests.fetch_add(row_stats.box_tests, Ordering::Relaxed);
            });

        film.passes += 1;

        TraceStats {
            triangle_tests: triangle_tests.load(Ordering::Relaxed),
            box_tests: box_tests.load(Ordering::Relaxed),
        }
    }

    /// Runs `samples` full passes. The loop can be restarted on the same
    /// film to refine further.
    pub fn render(&self, samples: u32, film: &mut Film) -> TraceStats {
        let mut total = TraceStats::default();
        for _ in 0..samples {
            total += self.render_pass(film);
        }
        total
    }
}
