/// Octree - adaptive point octree over fixed outer bounds.
///
/// Entities live in leaves. A leaf splits into 8 children once it holds more
/// than `max_entities_per_leaf` entities and is shallower than `max_depth`;
/// its entities are then redistributed by octant. Nodes are never merged back.
///
/// Nodes are kept in a `SlotMap` arena and addressed by stable keys, so the
/// tree owns no recursive boxes and drops in one pass.
///
/// No id → node index is kept: `remove` scans every node, O(total entities).
/// Use [`crate::spatial::LooseOctree`] when entities move every tick.

use glam::Vec3;
use slotmap::{new_key_type, SlotMap};
use crate::config::{validate_bounds, OctreeConfig};
use crate::error::Result;
use crate::primitives::{AABB, Entity, EntityId, KNearest, QueryResult};
use crate::spatial_index::{SpatialIndex, SpatialQuery};
use crate::{spatial_bail, spatial_debug, spatial_trace};

const SOURCE: &str = "spatial::Octree";

new_key_type! {
    /// Stable handle of a node inside one Octree's arena.
    struct NodeKey;
}

/// A single node in the octree.
struct OctreeNode {
    /// Tight region covered by this node
    bounds: AABB,
    /// Root = 0
    depth: u32,
    /// Entities stored here (only leaves hold entities)
    entities: Vec<Entity>,
    /// Children indexed by octant, `None` for a leaf
    children: Option<[NodeKey; 8]>,
}

impl OctreeNode {
    fn leaf(bounds: AABB, depth: u32) -> Self {
        Self {
            bounds,
            depth,
            entities: Vec::new(),
            children: None,
        }
    }
}

/// Adaptive octree.
///
/// # Example
///
/// ```
/// use spatial_engine::glam::Vec3;
/// use spatial_engine::spatial::{Octree, OctreeConfig, AABB, Entity};
///
/// let bounds = AABB::new(Vec3::splat(-50.0), Vec3::splat(50.0));
/// let mut octree = Octree::new(bounds, OctreeConfig::default())?;
/// octree.insert(Entity::point(1, Vec3::new(1.0, 2.0, 3.0)));
///
/// let nearest = octree.query_nearest(Vec3::ZERO);
/// assert_eq!(nearest.id, 1);
/// # Ok::<(), spatial_engine::spatial::Error>(())
/// ```
pub struct Octree {
    nodes: SlotMap<NodeKey, OctreeNode>,
    root: NodeKey,
    bounds: AABB,
    config: OctreeConfig,
    len: usize,
}

impl Octree {
    /// Create an empty octree covering `bounds`.
    ///
    /// # Errors
    ///
    /// `InvalidBounds` for degenerate bounds, `InvalidConfig` for a zero
    /// entity budget or an excessive depth.
    pub fn new(bounds: AABB, config: OctreeConfig) -> Result<Self> {
        if let Err(err) = validate_bounds(&bounds).and_then(|_| config.validate()) {
            spatial_bail!(SOURCE, err);
        }

        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(OctreeNode::leaf(bounds, 0));

        spatial_debug!(SOURCE,
            "Created octree over {:?}..{:?} (max_depth {}, max_entities_per_leaf {})",
            bounds.min, bounds.max, config.max_depth, config.max_entities_per_leaf);

        Ok(Self {
            nodes,
            root,
            bounds,
            config,
            len: 0,
        })
    }

    /// Create an octree with [`OctreeConfig::default`].
    pub fn with_defaults(bounds: AABB) -> Result<Self> {
        Self::new(bounds, OctreeConfig::default())
    }

    pub fn bounds(&self) -> AABB {
        self.bounds
    }

    pub fn config(&self) -> OctreeConfig {
        self.config
    }

    /// Number of stored entities
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of allocated nodes (root included)
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Deepest allocated node depth (0 when only the root exists)
    pub fn depth(&self) -> u32 {
        self.nodes.values().map(|n| n.depth).max().unwrap_or(0)
    }

    // ===== MUTATION =====

    /// Insert a copy of `entity` into the leaf containing its position.
    ///
    /// Returns false (nothing stored) when the position is outside the
    /// outer bounds. Ids must be unique; inserting an id twice stores it twice.
    pub fn insert(&mut self, entity: Entity) -> bool {
        if !self.bounds.contains_point(entity.position) {
            spatial_debug!(SOURCE, "Rejected entity {} at {:?}: outside bounds",
                entity.id, entity.position);
            return false;
        }

        let leaf = self.find_leaf(entity.position);
        self.nodes[leaf].entities.push(entity);
        self.len += 1;
        self.split_if_needed(leaf);
        true
    }

    /// Remove an entity by id. Scans every node.
    pub fn remove(&mut self, id: EntityId) -> bool {
        for node in self.nodes.values_mut() {
            if let Some(pos) = node.entities.iter().position(|e| e.id == id) {
                node.entities.swap_remove(pos);
                self.len -= 1;
                return true;
            }
        }
        false
    }

    /// Remove then reinsert. Returns the result of the reinsert.
    pub fn update(&mut self, entity: Entity) -> bool {
        self.remove(entity.id);
        self.insert(entity)
    }

    /// Drop every node and entity, keeping bounds and config.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = self.nodes.insert(OctreeNode::leaf(self.bounds, 0));
        self.len = 0;
    }

    fn find_leaf(&self, position: Vec3) -> NodeKey {
        let mut key = self.root;
        while let Some(children) = self.nodes[key].children {
            let octant = self.nodes[key].bounds.point_octant(position);
            key = children[octant as usize];
        }
        key
    }

    /// Split `key` (and any child that ends up over budget) while depth allows.
    fn split_if_needed(&mut self, key: NodeKey) {
        let mut pending = vec![key];

        while let Some(key) = pending.pop() {
            let node = &self.nodes[key];
            if node.entities.len() <= self.config.max_entities_per_leaf
                || node.depth >= self.config.max_depth
            {
                continue;
            }

            let children = self.subdivide(key);
            pending.extend_from_slice(&children);
        }
    }

    /// Create 8 children under a leaf and move its entities into them.
    fn subdivide(&mut self, key: NodeKey) -> [NodeKey; 8] {
        let bounds = self.nodes[key].bounds;
        let depth = self.nodes[key].depth + 1;

        let children: [NodeKey; 8] = std::array::from_fn(|octant| {
            self.nodes.insert(OctreeNode::leaf(bounds.octant(octant as u8), depth))
        });

        let entities = std::mem::take(&mut self.nodes[key].entities);
        for entity in entities {
            let octant = bounds.point_octant(entity.position);
            self.nodes[children[octant as usize]].entities.push(entity);
        }
        self.nodes[key].children = Some(children);

        spatial_trace!(SOURCE, "Subdivided node at depth {} ({:?}..{:?})",
            depth - 1, bounds.min, bounds.max);
        children
    }

    // ===== QUERIES =====

    /// Ids whose position lies inside `range`.
    pub fn query_range(&self, range: &AABB) -> Vec<EntityId> {
        let mut results = Vec::new();
        self.query_range_recursive(self.root, range, &mut results);
        results
    }

    fn query_range_recursive(&self, key: NodeKey, range: &AABB, results: &mut Vec<EntityId>) {
        let node = &self.nodes[key];
        if !node.bounds.intersects(range) {
            return;
        }
        results.extend(
            node.entities
                .iter()
                .filter(|e| range.contains_point(e.position))
                .map(|e| e.id),
        );
        if let Some(children) = node.children {
            for child in children {
                self.query_range_recursive(child, range, results);
            }
        }
    }

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
        key: NodeKey,
        center: Vec3,
        radius: f32,
        results: &mut Vec<EntityId>,
    ) {
        let node = &self.nodes[key];
        if !node.bounds.intersects_sphere(center, radius) {
            return;
        }
        let radius_sq = radius * radius;
        results.extend(
            node.entities
                .iter()
                .filter(|e| e.distance_squared_to(center) <= radius_sq)
                .map(|e| e.id),
        );
        if let Some(children) = node.children {
            for child in children {
                self.query_radius_recursive(child, center, radius, results);
            }
        }
    }

    /// Closest entity to `point`, or [`QueryResult::NONE`] when empty.
    pub fn query_nearest(&self, point: Vec3) -> QueryResult {
        let mut best = QueryResult::NONE;
        self.query_nearest_recursive(self.root, point, &mut best);
        best
    }

    fn query_nearest_recursive(&self, key: NodeKey, point: Vec3, best: &mut QueryResult) {
        let node = &self.nodes[key];
        for entity in &node.entities {
            let distance = entity.position.distance(point);
            if distance < best.distance {
                *best = QueryResult::new(entity.id, distance, entity.position);
            }
        }
        if let Some(children) = node.children {
            for child in self.children_nearest_first(&children, point) {
                // Re-tested per child: `best` shrinks while siblings are visited
                if self.nodes[child].bounds.intersects_sphere(point, best.distance) {
                    self.query_nearest_recursive(child, point, best);
                }
            }
        }
    }

    /// The `k` closest entities in ascending distance (fewer if the tree is smaller).
    ///
    /// Branch-and-bound: a node is entered only if its bounds overlap the
    /// sphere reaching the current k-th best distance.
    pub fn query_k_nearest(&self, point: Vec3, k: usize) -> Vec<QueryResult> {
        if k == 0 {
            return Vec::new();
        }
        let mut heap = KNearest::new(k);
        self.query_k_nearest_recursive(self.root, point, &mut heap);
        heap.into_sorted_vec()
    }

    fn query_k_nearest_recursive(&self, key: NodeKey, point: Vec3, heap: &mut KNearest) {
        let node = &self.nodes[key];
        for entity in &node.entities {
            heap.offer(QueryResult::from_entity(entity, point));
        }
        if let Some(children) = node.children {
            for child in self.children_nearest_first(&children, point) {
                if self.nodes[child].bounds.intersects_sphere(point, heap.bound()) {
                    self.query_k_nearest_recursive(child, point, heap);
                }
            }
        }
    }

    fn children_nearest_first(&self, children: &[NodeKey; 8], point: Vec3) -> [NodeKey; 8] {
        let mut ordered = *children;
        ordered.sort_by(|a, b| {
            let da = self.nodes[*a].bounds.distance_squared_to_point(point);
            let db = self.nodes[*b].bounds.distance_squared_to_point(point);
            da.total_cmp(&db)
        });
        ordered
    }

    /// Entity count by walking every node (cross-check for `len`).
    #[cfg(test)]
    fn count_entities(&self) -> usize {
        self.nodes.values().map(|n| n.entities.len()).sum()
    }
}

// ===== SPATIAL INDEX TRAITS =====

impl SpatialQuery for Octree {
    fn query_range(&self, range: &AABB) -> Vec<EntityId> {
        Octree::query_range(self, range)
    }

    fn query_radius(&self, center: Vec3, radius: f32) -> Vec<EntityId> {
        Octree::query_radius(self, center, radius)
    }

    fn len(&self) -> usize {
        Octree::len(self)
    }
}

impl SpatialIndex for Octree {
    fn insert(&mut self, entity: Entity) -> bool {
        Octree::insert(self, entity)
    }

    fn remove(&mut self, id: EntityId) -> bool {
        Octree::remove(self, id)
    }

    fn update(&mut self, entity: Entity) -> bool {
        Octree::update(self, entity)
    }

    fn clear(&mut self) {
        Octree::clear(self)
    }
}

#[cfg(test)]
#[path = "adaptive_octree_tests.rs"]
mod tests;
