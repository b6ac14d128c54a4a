/// SpatialHash - unbounded uniform grid keyed by integer cell coordinates.
///
/// Cell of a position = `floor(position / cell_size)` per axis. Buckets are
/// created on demand and dropped when they become empty, so memory follows
/// the number of occupied cells, not the extent of the world.
///
/// An id → cell map makes `remove` and `update` O(bucket size).

use glam::{IVec3, Vec3};
use rustc_hash::FxHashMap;
use crate::config::validate_cell_size;
use crate::error::Result;
use crate::primitives::{AABB, Entity, EntityId};
use crate::spatial_index::{SpatialIndex, SpatialQuery};
use crate::{spatial_bail, spatial_debug};

const SOURCE: &str = "spatial::SpatialHash";

pub struct SpatialHash {
    cell_size: f32,
    /// Occupied cells only
    cells: FxHashMap<IVec3, Vec<Entity>>,
    /// Reverse lookup: entity id → cell holding it
    entity_cells: FxHashMap<EntityId, IVec3>,
}

impl SpatialHash {
    /// Create an empty hash with cubic cells of edge `cell_size`.
    ///
    /// For `find_collisions` to act as a correct broad phase, pick a cell
    /// size of at least twice the largest entity diameter.
    pub fn new(cell_size: f32) -> Result<Self> {
        if let Err(err) = validate_cell_size(cell_size) {
            spatial_bail!(SOURCE, err);
        }
        spatial_debug!(SOURCE, "Created spatial hash (cell size {})", cell_size);

        Ok(Self {
            cell_size,
            cells: FxHashMap::default(),
            entity_cells: FxHashMap::default(),
        })
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Cell coordinates of `position`
    pub fn cell_of(&self, position: Vec3) -> IVec3 {
        (position / self.cell_size).floor().as_ivec3()
    }

    pub fn len(&self) -> usize {
        self.entity_cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entity_cells.is_empty()
    }

    /// Number of occupied cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entity_cells.contains_key(&id)
    }

    // ===== MUTATION =====

    /// Insert a copy of `entity` into the bucket of its cell.
    ///
    /// An id already present is updated instead. Non-finite positions are
    /// rejected (returns false).
    pub fn insert(&mut self, entity: Entity) -> bool {
        if self.entity_cells.contains_key(&entity.id) {
            return self.update(entity);
        }
        if !entity.position.is_finite() {
            spatial_debug!(SOURCE, "Rejected entity {}: non-finite position {:?}",
                entity.id, entity.position);
            return false;
        }

        let cell = self.cell_of(entity.position);
        self.cells.entry(cell).or_default().push(entity);
        self.entity_cells.insert(entity.id, cell);
        true
    }

    pub fn remove(&mut self, id: EntityId) -> bool {
        let Some(cell) = self.entity_cells.remove(&id) else {
            return false;
        };
        if let Some(bucket) = self.cells.get_mut(&cell) {
            if let Some(pos) = bucket.iter().position(|e| e.id == id) {
                bucket.swap_remove(pos);
            }
            if bucket.is_empty() {
                self.cells.remove(&cell);
            }
        }
        true
    }

    /// Move or resize an entity. Stays in its bucket when the cell is unchanged.
    pub fn update(&mut self, entity: Entity) -> bool {
        if let Some(&cell) = self.entity_cells.get(&entity.id) {
            if entity.position.is_finite() && self.cell_of(entity.position) == cell {
                let stored = self
                    .cells
                    .get_mut(&cell)
                    .and_then(|bucket| bucket.iter_mut().find(|e| e.id == entity.id));
                if let Some(stored) = stored {
                    *stored = entity;
                    return true;
                }
            }
            self.remove(entity.id);
        }
        self.insert(entity)
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.entity_cells.clear();
    }

    // ===== QUERIES =====

    /// Ids stored in one cell.
    pub fn query_cell(&self, cell: IVec3) -> Vec<EntityId> {
        self.cells
            .get(&cell)
            .map(|bucket| bucket.iter().map(|e| e.id).collect())
            .unwrap_or_default()
    }

    /// Ids within `radius` of `center`, scanning the cells under the sphere's bounding cube.
    pub fn query_radius(&self, center: Vec3, radius: f32) -> Vec<EntityId> {
        let mut results = Vec::new();
        if radius.is_nan() || radius < 0.0 {
            return results;
        }

        let radius_sq = radius * radius;
        let lo = self.cell_of(center - Vec3::splat(radius));
        let hi = self.cell_of(center + Vec3::splat(radius));
        self.for_each_candidate(lo, hi, |entity| {
            if entity.distance_squared_to(center) <= radius_sq {
                results.push(entity.id);
            }
        });
        results
    }

    /// Ids whose position lies inside `range`.
    pub fn query_range(&self, range: &AABB) -> Vec<EntityId> {
        let mut results = Vec::new();
        let lo = self.cell_of(range.min);
        let hi = self.cell_of(range.max);
        self.for_each_candidate(lo, hi, |entity| {
            if range.contains_point(entity.position) {
                results.push(entity.id);
            }
        });
        results
    }

    /// Overlapping sphere pairs among entities sharing a cell.
    ///
    /// Neighbouring cells are not compared: two spheres overlapping across a
    /// cell face are missed. Each pair is reported once.
    pub fn find_collisions(&self) -> Vec<(EntityId, EntityId)> {
        let mut collisions = Vec::new();
        for bucket in self.cells.values() {
            for (i, a) in bucket.iter().enumerate() {
                for b in &bucket[i + 1..] {
                    if a.overlaps(b) {
                        collisions.push((a.id, b.id));
                    }
                }
            }
        }
        collisions
    }

    /// Visit every entity in cells `lo..=hi`.
    ///
    /// Walks the occupied cells instead when the range spans more cells than
    /// are occupied (huge or infinite query extents).
    fn for_each_candidate<F: FnMut(&Entity)>(&self, lo: IVec3, hi: IVec3, mut visit: F) {
        let span: u128 = (0..3)
            .map(|axis| (hi[axis] as i64 - lo[axis] as i64 + 1).max(0) as u128)
            .product();
        if span == 0 {
            return;
        }

        if span > self.cells.len() as u128 {
            for (cell, bucket) in &self.cells {
                if cell.cmpge(lo).all() && cell.cmple(hi).all() {
                    bucket.iter().for_each(&mut visit);
                }
            }
            return;
        }

        for x in lo.x..=hi.x {
            for y in lo.y..=hi.y {
                for z in lo.z..=hi.z {
                    if let Some(bucket) = self.cells.get(&IVec3::new(x, y, z)) {
                        bucket.iter().for_each(&mut visit);
                    }
                }
            }
        }
    }
}

// ===== SPATIAL INDEX TRAITS =====

impl SpatialQuery for SpatialHash {
    fn query_range(&self, range: &AABB) -> Vec<EntityId> {
        SpatialHash::query_range(self, range)
    }

    fn query_radius(&self, center: Vec3, radius: f32) -> Vec<EntityId> {
        SpatialHash::query_radius(self, center, radius)
    }

    fn len(&self) -> usize {
        SpatialHash::len(self)
    }
}

impl SpatialIndex for SpatialHash {
    fn insert(&mut self, entity: Entity) -> bool {
        SpatialHash::insert(self, entity)
    }

    fn remove(&mut self, id: EntityId) -> bool {
        SpatialHash::remove(self, id)
    }

    fn update(&mut self, entity: Entity) -> bool {
        SpatialHash::update(self, entity)
    }

    fn clear(&mut self) {
        SpatialHash::clear(self)
    }
}

#[cfg(test)]
#[path = "spatial_hash_tests.rs"]
mod tests;
