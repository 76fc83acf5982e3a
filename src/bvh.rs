use crate::{primitives::Aabb, primitives::Triangle, scene::TraceStats, HitInfo, Ray};
use itertools::iproduct;

/// Recursion limit for the builder; trees never get deeper than this.
pub const MAX_DEPTH: u32 = 32;
/// Interior candidate positions evaluated per axis when splitting.
const NUM_TESTS_PER_AXIS: usize = 5;
/// Traversal stack capacity. Ample for MAX_DEPTH-bounded trees; overflowing
/// it means the tree and the stack were sized inconsistently, which is fatal.
pub const STACK_SIZE: usize = 50;

/// Node of the flattened tree. `child_index` is the index of the first of
/// two contiguous children; 0 marks a leaf, since the root occupies slot 0
/// and can never be a child.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BvhNode {
    pub bounds: Aabb,
    pub triangle_index: u32,
    pub triangle_count: u32,
    pub child_index: u32,
}

impl BvhNode {
    pub fn is_leaf(&self) -> bool {
        self.child_index == 0
    }
}

/// A compiled BVH: the node array plus the triangle array it indexes into,
/// both strictly read-only after construction.
#[derive(Clone, Debug, Default)]
pub struct Bvh {
    pub triangles: Vec<Triangle>,
    pub nodes: Vec<BvhNode>,
}

impl Bvh {
    pub fn new(triangles: Vec<Triangle>, nodes: Vec<BvhNode>) -> Self {
        Self { triangles, nodes }
    }

    /// Nearest-hit query in the tree's local space. Counts one box test per
    /// node visited and one triangle test per intersection performed.
    pub fn hit_local(&self, ray: &Ray, stats: &mut TraceStats) -> Option<HitInfo> {
        if self.nodes.is_empty() {
            return None;
        }

        let mut closest: Option<HitInfo> = None;
        let mut closest_dst = f32::INFINITY;

        let mut stack = [0u32; STACK_SIZE];
        let mut top = 1;

        while top > 0 {
            top -= 1;
            let node = &self.nodes[stack[top] as usize];
            stats.box_tests += 1;

            if node.is_leaf() {
                let first = node.triangle_index as usize;
                let count = node.triangle_count as usize;

                for triangle in &self.triangles[first..first + count] {
                    stats.triangle_tests += 1;
                    if let Some(hit) = triangle.hit(ray) {
                        if hit.dst < closest_dst {
                            closest_dst = hit.dst;
                            closest = Some(hit);
                        }
                    }
                }
            } else {
                let left = node.child_index;
                let right = left + 1;

                let dst_left = self.nodes[left as usize].bounds.hit(ray);
                let dst_right = self.nodes[right as usize].bounds.hit(ray);

                // Push the far child first so the near one is tested first,
                // and skip children that cannot beat the current closest hit.
                if dst_left < dst_right {
                    if dst_right < closest_dst {
                        push(&mut stack, &mut top, right);
                    }
                    if dst_left < closest_dst {
                        push(&mut stack, &mut top, left);
                    }
                } else {
                    if dst_left < closest_dst {
                        push(&mut stack, &mut top, left);
                    }
                    if dst_right < closest_dst {
                        push(&mut stack, &mut top, right);
                    }
                }
            }
        }

        closest
    }
}

fn push(stack: &mut [u32; STACK_SIZE], top: &mut usize, index: u32) {
    assert!(
        *top < STACK_SIZE,
        "BVH traversal stack overflow (capacity {}): tree depth exceeds the configured bound",
        STACK_SIZE
    );
    stack[*top] = index;
    *top += 1;
}

/// SAH builder. Owns the triangle buffer, reorders it in place while
/// splitting, and hands both arrays over by value when done.
pub struct BvhBuilder {
    triangles: Vec<Triangle>,
    nodes: Vec<BvhNode>,
}

impl BvhBuilder {
    pub fn new(triangles: Vec<Triangle>) -> Self {
        let capacity = 2 * triangles.len().max(1);
        Self {
            triangles,
            nodes: Vec::with_capacity(capacity),
        }
    }

    pub fn build(mut self) -> Bvh {
        let mut root = BvhNode {
            bounds: Aabb::empty(),
            triangle_index: 0,
            triangle_count: self.triangles.len() as u32,
            child_index: 0,
        };
        for triangle in &self.triangles {
            root.bounds.grow_triangle(triangle);
        }
        self.nodes.push(root);

        self.split(0, 0);

        Bvh::new(self.triangles, self.nodes)
    }

    fn split(&mut self, node_index: usize, depth: u32) {
        let node = self.nodes[node_index];
        if depth >= MAX_DEPTH || node.triangle_count < 2 {
            return;
        }

        let parent_cost = node.triangle_count as f32 * node.bounds.surface_area();
        let (axis, pos, cost) = match self.best_split(&node) {
            Some(candidate) => candidate,
            None => return,
        };
        if cost >= parent_cost {
            return;
        }

        let first = node.triangle_index as usize;
        let count = node.triangle_count as usize;

        // Forward in-place partition: side-A triangles are swapped down into
        // a growing prefix of the node's range.
        let mut bounds_a = Aabb::empty();
        let mut bounds_b = Aabb::empty();
        let mut next_a = first;
        for i in first..first + count {
            let triangle = self.triangles[i];
            if triangle.center()[axis] < pos {
                bounds_a.grow_triangle(&triangle);
                self.triangles.swap(i, next_a);
                next_a += 1;
            } else {
                bounds_b.grow_triangle(&triangle);
            }
        }

        let count_a = (next_a - first) as u32;
        let count_b = count as u32 - count_a;

        let child_a = self.nodes.len() as u32;
        self.nodes[node_index].child_index = child_a;
        self.nodes.push(BvhNode {
            bounds: bounds_a,
            triangle_index: first as u32,
            triangle_count: count_a,
            child_index: 0,
        });
        self.nodes.push(BvhNode {
            bounds: bounds_b,
            triangle_index: next_a as u32,
            triangle_count: count_b,
            child_index: 0,
        });

        self.split(child_a as usize, depth + 1);
        self.split(child_a as usize + 1, depth + 1);
    }

    /// Evaluates 3 axes x NUM_TESTS_PER_AXIS evenly spaced interior
    /// positions and returns the cheapest candidate. Strict `<` keeps the
    /// first enumerated candidate on ties, which makes builds deterministic.
    fn best_split(&self, node: &BvhNode) -> Option<(usize, f32, f32)> {
        let mut best: Option<(usize, f32, f32)> = None;
        let mut best_cost = f32::INFINITY;

        for (axis, step) in iproduct!(0..3usize, 0..NUM_TESTS_PER_AXIS) {
            let start = node.bounds.min[axis];
            let end = node.bounds.max[axis];
            let t = (step + 1) as f32 / (NUM_TESTS_PER_AXIS + 1) as f32;
            let pos = start + (end - start) * t;

            let cost = self.evaluate_split(node, axis, pos);
            if cost < best_cost {
                best_cost = cost;
                best = Some((axis, pos, cost));
            }
        }

        best
    }

    fn evaluate_split(&self, node: &BvhNode, axis: usize, pos: f32) -> f32 {
        let mut bounds_a = Aabb::empty();
        let mut bounds_b = Aabb::empty();
        let mut count_a = 0u32;
        let mut count_b = 0u32;

        let first = node.triangle_index as usize;
        for triangle in &self.triangles[first..first + node.triangle_count as usize] {
            if triangle.center()[axis] < pos {
                bounds_a.grow_triangle(triangle);
                count_a += 1;
            } else {
                bounds_b.grow_triangle(triangle);
                count_b += 1;
            }
        }

        // One-sided candidates cannot improve on the parent.
        if count_a == 0 || count_b == 0 {
            return f32::INFINITY;
        }

        count_a as f32 * bounds_a.surface_area() + count_b as f32 * bounds_b.surface_area()
    }
}
