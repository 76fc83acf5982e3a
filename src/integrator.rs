use crate::{DefaultRng, Ray, Scene, TraceStats};
use glam::Vec3;

/// Traces one path through the scene for at most `max_bounce` segments and
/// returns the gathered radiance together with the intersection counters.
pub fn trace(
    mut ray: Ray,
    scene: &Scene,
    max_bounce: u32,
    rng: &mut DefaultRng,
) -> (Vec3, TraceStats) {
    let mut attenuation = Vec3::ONE;
    let mut emission = Vec3::ZERO;
    let mut stats = TraceStats::default();

    for bounce in 0..max_bounce {
        let hit = match scene.hit(&ray, bounce == 0, &mut stats) {
            Some(hit) => hit,
            None => {
                emission += attenuation * scene.environment.radiance(&ray);
                break;
            }
        };

        let material = scene.materials.resolve(hit.material);
        emission += attenuation * material.emitted();

        match material.scatter(&ray, &hit, rng) {
            Some(scatter) => {
                attenuation *= scatter.attenuation;
                ray = scatter.scattered;
            }
            // Absorbed or emission-only surface: the path ends here.
            None => break,
        }
    }

    (emission, stats)
}
