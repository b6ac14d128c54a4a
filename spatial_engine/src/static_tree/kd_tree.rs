/// KdTree - static median-split k-d tree over entity positions.
///
/// Built once from a snapshot and never mutated: when the entity set
/// changes, call [`KdTree::build`] again. Each node holds one entity; the
/// split axis cycles x, y, z with depth, and the median of the range (after
/// sorting along that axis) becomes the node. Subtrees on either side are
/// balanced to within one entity.
///
/// Nodes live in a flat `Vec` and refer to their children by index.

use glam::Vec3;
use crate::primitives::{AABB, Entity, EntityId, KNearest, QueryResult};
use crate::spatial_debug;
use crate::spatial_index::SpatialQuery;

const SOURCE: &str = "spatial::KdTree";

struct KdNode {
    entity: Entity,
    /// 0 = x, 1 = y, 2 = z
    axis: usize,
    left: Option<u32>,
    right: Option<u32>,
}

impl KdNode {
    /// Signed distance from `point` to this node's splitting plane.
    fn plane_offset(&self, point: Vec3) -> f32 {
        point[self.axis] - self.entity.position[self.axis]
    }
}

/// Balanced k-d tree. `Default` is the empty tree.
#[derive(Default)]
pub struct KdTree {
    nodes: Vec<KdNode>,
    root: Option<u32>,
    depth: u32,
}

impl KdTree {
    /// Build a balanced tree from `entities` (copied in).
    ///
    /// Ids are expected to be unique; duplicates are stored as-is. Entities
    /// with a non-finite position are skipped: they have no side of a
    /// splitting plane.
    pub fn build(entities: &[Entity]) -> Self {
        let mut items: Vec<Entity> = entities
            .iter()
            .filter(|e| e.position.is_finite())
            .copied()
            .collect();
        let skipped = entities.len() - items.len();
        if skipped > 0 {
            spatial_debug!(SOURCE, "Skipped {} entities with non-finite positions", skipped);
        }

        let mut tree = Self {
            nodes: Vec::with_capacity(items.len()),
            root: None,
            depth: 0,
        };
        tree.root = tree.build_recursive(&mut items, 0);

        spatial_debug!(SOURCE, "Built k-d tree: {} nodes, depth {}", tree.nodes.len(), tree.depth);
        tree
    }

    fn build_recursive(&mut self, items: &mut [Entity], depth: u32) -> Option<u32> {
        if items.is_empty() {
            return None;
        }
        self.depth = self.depth.max(depth + 1);

        let axis = depth as usize % 3;
        items.sort_unstable_by(|a, b| a.position[axis].total_cmp(&b.position[axis]));
        let median = items.len() / 2;

        let index = self.nodes.len() as u32;
        self.nodes.push(KdNode {
            entity: items[median],
            axis,
            left: None,
            right: None,
        });

        let (below, rest) = items.split_at_mut(median);
        let left = self.build_recursive(below, depth + 1);
        let right = self.build_recursive(&mut rest[1..], depth + 1);

        let node = &mut self.nodes[index as usize];
        node.left = left;
        node.right = right;
        Some(index)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of levels (0 for an empty tree, 1 for a single entity)
    pub fn depth(&self) -> u32 {
        self.depth
    }

    // ===== NEAREST =====

    /// Closest entity to `point`, or [`QueryResult::NONE`] when empty.
    pub fn query_nearest(&self, point: Vec3) -> QueryResult {
        let mut best = QueryResult::NONE;
        self.query_nearest_recursive(self.root, point, &mut best);
        best
    }

    fn query_nearest_recursive(&self, node: Option<u32>, point: Vec3, best: &mut QueryResult) {
        let Some(index) = node else {
            return;
        };
        let node = &self.nodes[index as usize];

        let distance = node.entity.position.distance(point);
        if distance < best.distance {
            *best = QueryResult::new(node.entity.id, distance, node.entity.position);
        }

        let offset = node.plane_offset(point);
        let (near, far) = if offset < 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        self.query_nearest_recursive(near, point, best);
        if offset.abs() < best.distance {
            self.query_nearest_recursive(far, point, best);
        }
    }

    /// The `k` closest entities in ascending distance (fewer if the tree is smaller).
    pub fn query_k_nearest(&self, point: Vec3, k: usize) -> Vec<QueryResult> {
        if k == 0 {
            return Vec::new();
        }
        let mut heap = KNearest::new(k);
        self.query_k_nearest_recursive(self.root, point, &mut heap);
        heap.into_sorted_vec()
    }

    fn query_k_nearest_recursive(&self, node: Option<u32>, point: Vec3, heap: &mut KNearest) {
        let Some(index) = node else {
            return;
        };
        let node = &self.nodes[index as usize];
        heap.offer(QueryResult::from_entity(&node.entity, point));

        let offset = node.plane_offset(point);
        let (near, far) = if offset < 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        self.query_k_nearest_recursive(near, point, heap);
        // <= keeps equal-distance candidates reachable for the id tie-break
        if offset.abs() <= heap.bound() {
            self.query_k_nearest_recursive(far, point, heap);
        }
    }

    // ===== REGION =====

    /// Ids within `radius` of `center`. A negative or NaN radius matches nothing.
    pub fn query_radius(&self, center: Vec3, radius: f32) -> Vec<EntityId> {
        let mut results = Vec::new();
        if radius >= 0.0 {
            self.query_radius_recursive(self.root, center, radius, &mut results);
        }
        results
    }

    fn query_radius_recursive(
        &self,
        node: Option<u32>,
        center: Vec3,
        radius: f32,
        results: &mut Vec<EntityId>,
    ) {
        let Some(index) = node else {
            return;
        };
        let node = &self.nodes[index as usize];

        if node.entity.distance_squared_to(center) <= radius * radius {
            results.push(node.entity.id);
        }

        let offset = node.plane_offset(center);
        if offset - radius <= 0.0 {
            self.query_radius_recursive(node.left, center, radius, results);
        }
        if offset + radius >= 0.0 {
            self.query_radius_recursive(node.right, center, radius, results);
        }
    }

    /// Ids whose position lies inside `range`.
    pub fn query_range(&self, range: &AABB) -> Vec<EntityId> {
        let mut results = Vec::new();
        self.query_range_recursive(self.root, range, &mut results);
        results
    }

    fn query_range_recursive(&self, node: Option<u32>, range: &AABB, results: &mut Vec<EntityId>) {
        let Some(index) = node else {
            return;
        };
        let node = &self.nodes[index as usize];

        if range.contains_point(node.entity.position) {
            results.push(node.entity.id);
        }

        let split = node.entity.position[node.axis];
        if range.min[node.axis] <= split {
            self.query_range_recursive(node.left, range, results);
        }
        if range.max[node.axis] >= split {
            self.query_range_recursive(node.right, range, results);
        }
    }
}

impl SpatialQuery for KdTree {
    fn query_range(&self, range: &AABB) -> Vec<EntityId> {
        KdTree::query_range(self, range)
    }

    fn query_radius(&self, center: Vec3, radius: f32) -> Vec<EntityId> {
        KdTree::query_radius(self, center, radius)
    }

    fn len(&self) -> usize {
        KdTree::len(self)
    }
}

#[cfg(test)]
#[path = "kd_tree_tests.rs"]
mod tests;
