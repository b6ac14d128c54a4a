/// LooseOctree - octree for entities that move every tick.
///
/// Every node has tight bounds (the regular octant split) and loose bounds:
/// the tight bounds scaled by `looseness` around the same center. An entity
/// descends into a child only while that child's loose bounds contain its
/// position; the radius plays no part in placement. Positions inside the root's
/// loose bounds but outside its tight bounds can stop at interior nodes.
///
/// A reverse map id → node gives O(1) `remove` and `update`. `update`
/// leaves an entity where it is as long as its node's loose bounds still
/// contain the new position, which is what absorbs small per-tick movements.
///
/// Children are created lazily, the first time an entity descends, and a
/// group of eight empty leaf siblings is dropped again when `remove` empties it.

use glam::Vec3;
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use crate::config::{validate_bounds, LooseOctreeConfig};
use crate::error::Result;
use crate::primitives::{AABB, Entity, EntityId};
use crate::spatial_index::{SpatialIndex, SpatialQuery};
use crate::{spatial_bail, spatial_debug, spatial_trace};

const SOURCE: &str = "spatial::LooseOctree";

new_key_type! {
    /// Stable handle of a node inside one LooseOctree's arena.
    struct NodeKey;
}

struct LooseNode {
    /// Tight octant region, used to pick the child octant
    bounds: AABB,
    /// Tight region scaled by looseness; bounds every entity stored here
    loose_bounds: AABB,
    /// Root = 0
    depth: u32,
    /// `None` for the root
    parent: Option<NodeKey>,
    /// Entities that stopped descending at this node
    entities: Vec<Entity>,
    /// Children indexed by octant, `None` until first needed
    children: Option<[NodeKey; 8]>,
}

impl LooseNode {
    fn new(bounds: AABB, looseness: f32, depth: u32, parent: Option<NodeKey>) -> Self {
        Self {
            bounds,
            loose_bounds: bounds.expanded(looseness),
            depth,
            parent,
            entities: Vec::new(),
            children: None,
        }
    }
}

/// Loose octree with O(1) removal.
pub struct LooseOctree {
    nodes: SlotMap<NodeKey, LooseNode>,
    root: NodeKey,
    bounds: AABB,
    config: LooseOctreeConfig,
    /// Reverse lookup: entity id → node holding it
    entity_nodes: FxHashMap<EntityId, NodeKey>,
}

impl LooseOctree {
    /// Create an empty loose octree whose root tight bounds are `bounds`.
    ///
    /// # Errors
    ///
    /// `InvalidBounds` for degenerate bounds, `InvalidConfig` for a
    /// looseness below 1 (or non-finite) or an excessive depth.
    pub fn new(bounds: AABB, config: LooseOctreeConfig) -> Result<Self> {
        if let Err(err) = validate_bounds(&bounds).and_then(|_| config.validate()) {
            spatial_bail!(SOURCE, err);
        }

        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(LooseNode::new(bounds, config.looseness, 0, None));

        spatial_debug!(SOURCE,
            "Created loose octree over {:?}..{:?} (max_depth {}, looseness {})",
            bounds.min, bounds.max, config.max_depth, config.looseness);

        Ok(Self {
            nodes,
            root,
            bounds,
            config,
            entity_nodes: FxHashMap::default(),
        })
    }

    /// Create a loose octree with [`LooseOctreeConfig::default`].
    pub fn with_defaults(bounds: AABB) -> Result<Self> {
        Self::new(bounds, LooseOctreeConfig::default())
    }

    pub fn bounds(&self) -> AABB {
        self.bounds
    }

    pub fn looseness(&self) -> f32 {
        self.config.looseness
    }

    pub fn config(&self) -> LooseOctreeConfig {
        self.config
    }

    pub fn len(&self) -> usize {
        self.entity_nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entity_nodes.is_empty()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entity_nodes.contains_key(&id)
    }

    /// Number of allocated nodes (root included)
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Depth of the node currently holding `id`
    pub fn depth_of(&self, id: EntityId) -> Option<u32> {
        self.entity_nodes.get(&id).map(|&key| self.nodes[key].depth)
    }

    // ===== MUTATION =====

    /// Insert a copy of `entity` at the deepest node whose loose bounds hold its position.
    ///
    /// An id already present is updated instead. Returns false (nothing
    /// stored) when the position lies outside the root's loose bounds.
    pub fn insert(&mut self, entity: Entity) -> bool {
        if self.entity_nodes.contains_key(&entity.id) {
            return self.update(entity);
        }
        if !self.nodes[self.root].loose_bounds.contains_point(entity.position) {
            spatial_debug!(SOURCE, "Rejected entity {} at {:?}: outside loose bounds",
                entity.id, entity.position);
            return false;
        }

        let key = self.descend(&entity);
        self.nodes[key].entities.push(entity);
        self.entity_nodes.insert(entity.id, key);
        true
    }

    /// Remove an entity through the reverse map, then prune emptied branches.
    pub fn remove(&mut self, id: EntityId) -> bool {
        let Some(key) = self.entity_nodes.remove(&id) else {
            return false;
        };
        let entities = &mut self.nodes[key].entities;
        if let Some(pos) = entities.iter().position(|e| e.id == id) {
            entities.swap_remove(pos);
        }
        self.prune_from(key);
        true
    }

    /// Move or resize an entity.
    ///
    /// If the node currently holding it still contains the new position in
    /// its loose bounds the stored copy is replaced in place; otherwise
    /// remove + insert.
    pub fn update(&mut self, entity: Entity) -> bool {
        if let Some(&key) = self.entity_nodes.get(&entity.id) {
            if self.nodes[key].loose_bounds.contains_point(entity.position) {
                let node = &mut self.nodes[key];
                if let Some(slot) = node.entities.iter_mut().find(|e| e.id == entity.id) {
                    *slot = entity;
                    return true;
                }
            }
            self.remove(entity.id);
        }
        self.insert(entity)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = self.nodes.insert(LooseNode::new(self.bounds, self.config.looseness, 0, None));
        self.entity_nodes.clear();
    }

    /// Walk down while the child octant's loose bounds contain the entity's position.
    fn descend(&mut self, entity: &Entity) -> NodeKey {
        let mut key = self.root;
        loop {
            let node = &self.nodes[key];
            if node.depth >= self.config.max_depth {
                return key;
            }

            let octant = node.bounds.point_octant(entity.position) as usize;
            let child_loose = node.bounds.octant(octant as u8).expanded(self.config.looseness);
            if !child_loose.contains_point(entity.position) {
                return key;
            }

            let children = match node.children {
                Some(children) => children,
                None => self.subdivide(key),
            };
            key = children[octant];
        }
    }

    fn subdivide(&mut self, key: NodeKey) -> [NodeKey; 8] {
        let bounds = self.nodes[key].bounds;
        let depth = self.nodes[key].depth + 1;
        let looseness = self.config.looseness;

        let children: [NodeKey; 8] = std::array::from_fn(|octant| {
            self.nodes.insert(LooseNode::new(bounds.octant(octant as u8), looseness, depth, Some(key)))
        });
        self.nodes[key].children = Some(children);

        spatial_trace!(SOURCE, "Created children at depth {}", depth);
        children
    }

    /// Walk up from `key`, dropping each sibling group that holds no entities
    /// and has no children of its own.
    fn prune_from(&mut self, key: NodeKey) {
        let mut current = self.nodes[key].parent;
        while let Some(parent) = current {
            let Some(children) = self.nodes[parent].children else {
                return;
            };
            let all_empty = children.iter().all(|&child| {
                let node = &self.nodes[child];
                node.entities.is_empty() && node.children.is_none()
            });
            if !all_empty {
                return;
            }

            for child in children {
                self.nodes.remove(child);
            }
            let node = &mut self.nodes[parent];
            node.children = None;
            spatial_trace!(SOURCE, "Pruned empty children at depth {}", node.depth + 1);
            current = node.parent;
        }
    }

    // ===== QUERIES =====

    /// Ids whose position is within `radius` of `center`.
    ///
    /// Nodes are pruned by their loose bounds, then each entity is checked exactly.
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
        if !node.loose_bounds.intersects_sphere(center, radius) {
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

    /// Ids whose position lies inside `range`.
    pub fn query_range(&self, range: &AABB) -> Vec<EntityId> {
        let mut results = Vec::new();
        self.query_range_recursive(self.root, range, &mut results);
        results
    }

    fn query_range_recursive(&self, key: NodeKey, range: &AABB, results: &mut Vec<EntityId>) {
        let node = &self.nodes[key];
        if !node.loose_bounds.intersects(range) {
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

    /// Overlapping sphere pairs, tested only among entities stored in the same node.
    ///
    /// Pairs split across a parent and child, or across siblings, are not
    /// reported. Each pair appears once, as (earlier-stored, later-stored).
    pub fn find_collisions(&self) -> Vec<(EntityId, EntityId)> {
        let mut collisions = Vec::new();
        self.find_collisions_recursive(self.root, &mut collisions);
        collisions
    }

    fn find_collisions_recursive(&self, key: NodeKey, collisions: &mut Vec<(EntityId, EntityId)>) {
        let node = &self.nodes[key];
        for (i, a) in node.entities.iter().enumerate() {
            for b in &node.entities[i + 1..] {
                if a.overlaps(b) {
                    collisions.push((a.id, b.id));
                }
            }
        }
        if let Some(children) = node.children {
            for child in children {
                self.find_collisions_recursive(child, collisions);
            }
        }
    }
}

// ===== SPATIAL INDEX TRAITS =====

impl SpatialQuery for LooseOctree {
    fn query_range(&self, range: &AABB) -> Vec<EntityId> {
        LooseOctree::query_range(self, range)
    }

    fn query_radius(&self, center: Vec3, radius: f32) -> Vec<EntityId> {
        LooseOctree::query_radius(self, center, radius)
    }

    fn len(&self) -> usize {
        LooseOctree::len(self)
    }
}

impl SpatialIndex for LooseOctree {
    fn insert(&mut self, entity: Entity) -> bool {
        LooseOctree::insert(self, entity)
    }

    fn remove(&mut self, id: EntityId) -> bool {
        LooseOctree::remove(self, id)
    }

    fn update(&mut self, entity: Entity) -> bool {
        LooseOctree::update(self, entity)
    }

    fn clear(&mut self) {
        LooseOctree::clear(self)
    }
}

#[cfg(test)]
#[path = "loose_octree_tests.rs"]
mod tests;
