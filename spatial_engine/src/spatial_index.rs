/// Shared seams over the 3-D structures.
///
/// A caller picks the structure matching its entity dynamics and drives it
/// once per tick: mutate (or rebuild), then query. These traits let that
/// caller hold any structure behind one interface.
///
/// Ownership: the caller creates and owns every structure and remains the
/// owner of the canonical entity data. Structures copy entities in.

use glam::Vec3;
use crate::primitives::{AABB, Entity, EntityId};

/// Read-only queries every 3-D structure answers.
pub trait SpatialQuery {
    /// Ids whose position lies inside `range` (inclusive on both corners).
    fn query_range(&self, range: &AABB) -> Vec<EntityId>;

    /// Ids whose position is within `radius` of `center` (inclusive).
    fn query_radius(&self, center: Vec3, radius: f32) -> Vec<EntityId>;

    /// Number of stored entities
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Incremental mutation for the live structures (Octree, SpatialHash, LooseOctree).
///
/// KdTree and Bvh deliberately do not implement this: they are rebuilt
/// wholesale from a snapshot.
pub trait SpatialIndex: SpatialQuery {
    /// Insert a copy of `entity`. Returns false if the structure rejected it
    /// (e.g. its position lies outside fixed outer bounds).
    fn insert(&mut self, entity: Entity) -> bool;

    /// Remove an entity. Returns false (and does nothing) if the id is unknown.
    fn remove(&mut self, id: EntityId) -> bool;

    /// Replace the stored copy of `entity.id` with `entity`.
    ///
    /// Same observable result as `remove` followed by `insert`.
    fn update(&mut self, entity: Entity) -> bool;

    /// Remove all entities.
    fn clear(&mut self);
}
