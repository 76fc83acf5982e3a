//! Cross-module properties of the BVH: build invariants, determinism,
//! equivalence with brute force, and serialization round-trips.

use glam::{vec3, Vec3};
use lumen::{
    material::MaterialCoord, persist, Bvh, BvhBuilder, DefaultRng, HitInfo, Ray, TraceStats,
    Triangle,
};
use rand::prelude::*;
use std::io::Cursor;

fn random_point(rng: &mut DefaultRng, extent: f32) -> Vec3 {
    vec3(
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
    )
}

fn random_triangles(count: usize, rng: &mut DefaultRng) -> Vec<Triangle> {
    (0..count)
        .map(|_| {
            let center = random_point(rng, 10.0);
            Triangle::new(
                center + random_point(rng, 1.0),
                center + random_point(rng, 1.0),
                center + random_point(rng, 1.0),
                MaterialCoord::default(),
            )
        })
        .collect()
}

fn random_rays(count: usize, rng: &mut DefaultRng) -> Vec<Ray> {
    let mut rays: Vec<Ray> = (0..count)
        .map(|_| Ray::new(random_point(rng, 12.0), random_point(rng, 1.0)))
        .collect();

    // Degenerate cases: axis-parallel directions and origins inside the
    // triangle cloud.
    rays.push(Ray::new(vec3(0.0, 0.0, 30.0), vec3(0.0, 0.0, -1.0)));
    rays.push(Ray::new(vec3(0.5, 30.0, -0.5), vec3(0.0, -1.0, 0.0)));
    rays.push(Ray::new(vec3(-30.0, 0.1, 0.1), vec3(1.0, 0.0, 0.0)));
    rays.push(Ray::new(Vec3::ZERO, vec3(0.3, -0.2, 0.9)));
    rays.push(Ray::new(vec3(1.0, -2.0, 3.0), vec3(0.0, 1.0, 0.0)));

    rays
}

fn brute_force_hit(triangles: &[Triangle], ray: &Ray) -> Option<HitInfo> {
    let mut closest: Option<HitInfo> = None;
    let mut closest_dst = f32::INFINITY;

    for triangle in triangles {
        if let Some(hit) = triangle.hit(ray) {
            if hit.dst < closest_dst {
                closest_dst = hit.dst;
                closest = Some(hit);
            }
        }
    }

    closest
}

fn leaf_ranges(bvh: &Bvh) -> Vec<(u32, u32)> {
    let mut ranges: Vec<(u32, u32)> = bvh
        .nodes
        .iter()
        .filter(|node| node.is_leaf())
        .map(|node| (node.triangle_index, node.triangle_count))
        .collect();
    ranges.sort_unstable();
    ranges
}

#[test]
fn build_invariants_hold_across_sizes() {
    for &count in &[1usize, 2, 7, 64, 300] {
        let mut rng = DefaultRng::seed_from_u64(count as u64);
        let bvh = BvhBuilder::new(random_triangles(count, &mut rng)).build();

        assert!(
            bvh.nodes.len() <= 2 * count - 1,
            "{} triangles produced {} nodes",
            count,
            bvh.nodes.len()
        );

        // Leaf ranges partition [0, count) without gaps or overlaps.
        let mut next = 0u32;
        for (start, len) in leaf_ranges(&bvh) {
            assert_eq!(start, next, "gap or overlap at triangle {}", next);
            next += len;
        }
        assert_eq!(next as usize, count);

        // Both children of every interior node stay inside the node array.
        for node in &bvh.nodes {
            if !node.is_leaf() {
                assert!(node.child_index as usize + 1 < bvh.nodes.len());
            }
        }
    }
}

#[test]
fn builds_are_deterministic() {
    let mut rng = DefaultRng::seed_from_u64(99);
    let triangles = random_triangles(128, &mut rng);

    let first = BvhBuilder::new(triangles.clone()).build();
    let second = BvhBuilder::new(triangles).build();

    assert_eq!(first.nodes, second.nodes);
    assert_eq!(first.triangles, second.triangles);
}

#[test]
fn coincident_triangles_become_one_leaf() {
    let triangle = Triangle::new(
        vec3(0.0, 0.0, 0.0),
        vec3(1.0, 0.0, 0.0),
        vec3(0.0, 1.0, 0.0),
        MaterialCoord::default(),
    );
    let bvh = BvhBuilder::new(vec![triangle; 100]).build();

    // Every split candidate puts all centroids on one side, so the root
    // stays a leaf.
    assert_eq!(bvh.nodes.len(), 1);
    assert_eq!(bvh.nodes[0].triangle_count, 100);
}

#[test]
fn traversal_matches_brute_force() {
    let mut rng = DefaultRng::seed_from_u64(2024);
    let bvh = BvhBuilder::new(random_triangles(200, &mut rng)).build();

    for ray in random_rays(500, &mut rng) {
        let mut stats = TraceStats::default();
        let traversed = bvh.hit_local(&ray, &mut stats);
        let expected = brute_force_hit(&bvh.triangles, &ray);

        match (traversed, expected) {
            (None, None) => {}
            (Some(a), Some(b)) => {
                assert_eq!(a.dst, b.dst, "distance mismatch for {:?}", ray);
                assert_eq!(a.point, b.point);
                assert_eq!(a.normal, b.normal);
            }
            (a, b) => panic!(
                "hit disagreement for {:?}: bvh={:?} brute={:?}",
                ray,
                a.map(|h| h.dst),
                b.map(|h| h.dst)
            ),
        }
    }
}

#[test]
fn traversal_prunes_against_brute_force_test_count() {
    let mut rng = DefaultRng::seed_from_u64(5);
    let count = 400;
    let bvh = BvhBuilder::new(random_triangles(count, &mut rng)).build();

    let mut stats = TraceStats::default();
    let ray = Ray::new(vec3(0.0, 0.0, 30.0), vec3(0.0, 0.0, -1.0));
    bvh.hit_local(&ray, &mut stats);

    // The point of the tree: far fewer triangle tests than a linear scan.
    assert!(stats.triangle_tests < count as u64);
}

#[test]
fn persisted_bvh_round_trips_exactly() {
    let mut rng = DefaultRng::seed_from_u64(7);
    let bvh = BvhBuilder::new(random_triangles(150, &mut rng)).build();

    let mut triangle_stream = Vec::new();
    let mut node_stream = Vec::new();
    persist::write_triangles(&mut triangle_stream, &bvh.triangles).unwrap();
    persist::write_nodes(&mut node_stream, &bvh.nodes).unwrap();

    let loaded = Bvh::new(
        persist::read_triangles(&mut Cursor::new(triangle_stream)).unwrap(),
        persist::read_nodes(&mut Cursor::new(node_stream)).unwrap(),
    );

    assert_eq!(loaded.triangles, bvh.triangles);
    assert_eq!(loaded.nodes, bvh.nodes);

    for ray in random_rays(200, &mut rng) {
        let mut before = TraceStats::default();
        let mut after = TraceStats::default();

        let a = bvh.hit_local(&ray, &mut before);
        let b = loaded.hit_local(&ray, &mut after);

        assert_eq!(a.map(|h| h.dst), b.map(|h| h.dst));
        assert_eq!(before, after);
    }
}
