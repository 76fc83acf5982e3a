use anyhow::{Context, Result};
use lumen::{config::SceneConfig, TraceStats};
use std::env;
use std::path::Path;
use std::time::Instant;

fn main() -> Result<()> {
    let arg = env::args().nth(1).context("usage: lumen <scene.toml>")?;
    let scene_path = Path::new(&arg);
    let base_dir = scene_path.parent().unwrap_or_else(|| Path::new("."));

    let config = SceneConfig::load(scene_path)?;
    let (renderer, render) = config.build(base_dir)?;

    let width = renderer.camera.image_width();
    let height = renderer.camera.image_height();
    println!(
        "Rendering {}x{}, {} samples, {} max bounces",
        width, height, render.samples, render.max_bounce
    );

    let mut film = renderer.new_film();
    let mut total = TraceStats::default();
    let start = Instant::now();

    for pass in 1..=render.samples {
        let stats = renderer.render_pass(&mut film);
        total += stats;
        println!(
            "pass {}/{}: {} triangle tests, {} box tests",
            pass, render.samples, stats.triangle_tests, stats.box_tests
        );
    }

    let duration = start.elapsed();
    let rays = f64::from(width) * f64::from(height) * f64::from(render.samples) / 1_000_000.0;
    let rays_per_second = rays / duration.as_secs_f64();
    println!(
        "Time elapsed: {:.2?}\nCamera rays: {:.2}M\nRays per second: {:.2}M\nTriangle tests: {}\nBox tests: {}",
        duration, rays, rays_per_second, total.triangle_tests, total.box_tests
    );

    let buffer = film.to_rgb8(render.gamma);
    image::save_buffer(
        &render.output,
        &buffer,
        width,
        height,
        image::ColorType::Rgb8,
    )
    .with_context(|| format!("failed to write {}", render.output.display()))?;
    println!("Saved {}", render.output.display());

    Ok(())
}
