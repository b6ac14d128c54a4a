/// Bvh - bounding volume hierarchy over entities' bounding spheres.
///
/// Built once from a snapshot (rebuild when the entity set changes). Each
/// range of entities is sorted along the longest axis of its bounding box
/// and halved at the median index; a range of one entity becomes a leaf.
/// Splitting by index count means coincident entities still split, so the
/// build always terminates with exactly `2n - 1` nodes.
///
/// Interior bounds are the union of the sphere boxes below them. Besides
/// range and radius queries the hierarchy answers closest-hit ray casts.

use glam::Vec3;
use crate::primitives::{AABB, Entity, EntityId, QueryResult};
use crate::spatial_debug;
use crate::spatial_index::SpatialQuery;

const SOURCE: &str = "spatial::Bvh";

enum BvhContent {
    Leaf(Entity),
    Internal { left: u32, right: u32 },
}

struct BvhNode {
    bounds: AABB,
    content: BvhContent,
}

/// Static BVH. `Default` is the empty hierarchy.
#[derive(Default)]
pub struct Bvh {
    /// Children are pushed before their parent; the root is the last node
    nodes: Vec<BvhNode>,
    root: Option<u32>,
    len: usize,
}

impl Bvh {
    /// Build the hierarchy from `entities` (copied in).
    ///
    /// Entities whose position or radius is not finite are skipped.
    pub fn build(entities: &[Entity]) -> Self {
        let mut items: Vec<Entity> = entities
            .iter()
            .filter(|e| e.position.is_finite() && e.radius.is_finite())
            .copied()
            .collect();
        let skipped = entities.len() - items.len();
        if skipped > 0 {
            spatial_debug!(SOURCE, "Skipped {} entities with non-finite position or radius", skipped);
        }

        let mut bvh = Self {
            nodes: Vec::with_capacity(items.len().saturating_mul(2)),
            root: None,
            len: items.len(),
        };
        if !items.is_empty() {
            bvh.root = Some(bvh.build_recursive(&mut items));
        }

        spatial_debug!(SOURCE, "Built BVH: {} entities, {} nodes", bvh.len, bvh.nodes.len());
        bvh
    }

    fn build_recursive(&mut self, items: &mut [Entity]) -> u32 {
        let bounds = items
            .iter()
            .skip(1)
            .fold(items[0].bounds(), |acc, e| acc.union(&e.bounds()));

        let content = if items.len() == 1 {
            BvhContent::Leaf(items[0])
        } else {
            let axis = bounds.longest_axis();
            items.sort_unstable_by(|a, b| a.position[axis].total_cmp(&b.position[axis]));
            let (below, above) = items.split_at_mut(items.len() / 2);
            let left = self.build_recursive(below);
            let right = self.build_recursive(above);
            BvhContent::Internal { left, right }
        };

        self.nodes.push(BvhNode { bounds, content });
        (self.nodes.len() - 1) as u32
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Root bounds, `None` when empty
    pub fn bounds(&self) -> Option<AABB> {
        self.root.map(|root| self.nodes[root as usize].bounds)
    }

    // ===== REGION QUERIES =====

    /// Ids whose position lies inside `range`.
    pub fn query_range(&self, range: &AABB) -> Vec<EntityId> {
        let mut results = Vec::new();
        if let Some(root) = self.root {
            self.query_range_recursive(root, range, &mut results);
        }
        results
    }

    fn query_range_recursive(&self, index: u32, range: &AABB, results: &mut Vec<EntityId>) {
        let node = &self.nodes[index as usize];
        if !node.bounds.intersects(range) {
            return;
        }
        match node.content {
            BvhContent::Leaf(entity) => {
                if range.contains_point(entity.position) {
                    results.push(entity.id);
                }
            }
            BvhContent::Internal { left, right } => {
                self.query_range_recursive(left, range, results);
                self.query_range_recursive(right, range, results);
            }
        }
    }

    /// Ids whose position is within `radius` of `center`.
    pub fn query_radius(&self, center: Vec3, radius: f32) -> Vec<EntityId> {
        let mut results = Vec::new();
        let Some(root) = self.root else {
            return results;
        };
        if radius >= 0.0 {
            self.query_radius_recursive(root, center, radius, &mut results);
        }
        results
    }

    fn query_radius_recursive(
        &self,
        index: u32,
        center: Vec3,
        radius: f32,
        results: &mut Vec<EntityId>,
    ) {
        let node = &self.nodes[index as usize];
        if !node.bounds.intersects_sphere(center, radius) {
            return;
        }
        match node.content {
            BvhContent::Leaf(entity) => {
                if entity.distance_squared_to(center) <= radius * radius {
                    results.push(entity.id);
                }
            }
            BvhContent::Internal { left, right } => {
                self.query_radius_recursive(left, center, radius, results);
                self.query_radius_recursive(right, center, radius, results);
            }
        }
    }

    // ===== RAY CAST =====

    /// Closest sphere hit along a ray.
    ///
    /// `direction` need not be normalised; `distance` in the result is
    /// measured along the normalised direction and `position` is the hit
    /// point. Returns [`QueryResult::NONE`] on a miss, for a zero direction,
    /// or when the closest hit is farther than `max_distance`.
    ///
    /// A ray whose origin lies inside a sphere reports that sphere at its
    /// exit point (the far root), not as a miss. Only the near surface
    /// counts when the origin is outside.
    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> QueryResult {
        let mut best = QueryResult::NONE;
        let Some(root) = self.root else {
            return best;
        };
        let dir = direction.normalize_or_zero();
        if dir == Vec3::ZERO || max_distance.is_nan() || max_distance < 0.0 {
            return best;
        }

        let ray = Ray { origin, dir, inv_dir: dir.recip() };
        self.raycast_recursive(root, &ray, max_distance, &mut best);
        best
    }

    fn raycast_recursive(&self, index: u32, ray: &Ray, max_distance: f32, best: &mut QueryResult) {
        let node = &self.nodes[index as usize];
        // The limit shrinks to the best hit found so far
        let limit = best.distance.min(max_distance);
        match node.bounds.ray_entry(ray.origin, ray.inv_dir) {
            Some(entry) if entry <= limit => {}
            _ => return,
        }

        match node.content {
            BvhContent::Leaf(entity) => {
                if let Some(t) = ray.hit_sphere(&entity) {
                    if t <= max_distance && t < best.distance {
                        *best = QueryResult::new(entity.id, t, ray.origin + ray.dir * t);
                    }
                }
            }
            BvhContent::Internal { left, right } => {
                self.raycast_recursive(left, ray, max_distance, best);
                self.raycast_recursive(right, ray, max_distance, best);
            }
        }
    }
}

struct Ray {
    origin: Vec3,
    /// Unit length
    dir: Vec3,
    inv_dir: Vec3,
}

impl Ray {
    /// Smallest non-negative `t` with `|origin + t * dir - center| = radius`.
    ///
    /// Falls back to the far root when the near one is behind the origin,
    /// which is the origin-inside-sphere case.
    fn hit_sphere(&self, entity: &Entity) -> Option<f32> {
        let oc = self.origin - entity.position;
        // |dir| = 1, so the quadratic reduces to t² + 2bt + c = 0
        let b = oc.dot(self.dir);
        let c = oc.length_squared() - entity.radius * entity.radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }

        let root = discriminant.sqrt();
        let near = -b - root;
        if near >= 0.0 {
            return Some(near);
        }
        let far = -b + root;
        (far >= 0.0).then_some(far)
    }
}

impl SpatialQuery for Bvh {
    fn query_range(&self, range: &AABB) -> Vec<EntityId> {
        Bvh::query_range(self, range)
    }

    fn query_radius(&self, center: Vec3, radius: f32) -> Vec<EntityId> {
        Bvh::query_radius(self, center, radius)
    }

    fn len(&self) -> usize {
        Bvh::len(self)
    }
}

#[cfg(test)]
#[path = "bvh_tests.rs"]
mod tests;
