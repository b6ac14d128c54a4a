/// Entity and query result records shared by every structure.
///
/// Structures store entities by value. Changing a caller-side copy has no
/// effect on an index until the caller pushes it back with `update`.

use glam::Vec3;
use super::aabb::AABB;

/// Caller-assigned entity identifier, unique within one structure instance.
pub type EntityId = i64;

/// A point or sphere stored in a spatial structure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub position: Vec3,
    /// Bounding-sphere radius (>= 0). Zero for pure points.
    pub radius: f32,
}

impl Entity {
    pub fn new(id: EntityId, position: Vec3, radius: f32) -> Self {
        Self { id, position, radius }
    }

    /// Zero-radius entity
    pub fn point(id: EntityId, position: Vec3) -> Self {
        Self::new(id, position, 0.0)
    }

    /// Box around the entity's bounding sphere
    pub fn bounds(&self) -> AABB {
        AABB::from_sphere(self.position, self.radius)
    }

    pub fn distance_squared_to(&self, point: Vec3) -> f32 {
        self.position.distance_squared(point)
    }

    /// Sphere/sphere overlap: center distance strictly below the radius sum.
    pub fn overlaps(&self, other: &Entity) -> bool {
        let reach = self.radius + other.radius;
        self.position.distance_squared(other.position) < reach * reach
    }
}

/// Answer of a nearest / k-nearest / raycast query.
///
/// "Nothing found" is [`QueryResult::NONE`]: id -1, infinite distance.
/// It is a normal outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryResult {
    pub id: EntityId,
    /// Euclidean distance from the query point (or along the ray)
    pub distance: f32,
    /// Entity position, or the hit point for raycasts
    pub position: Vec3,
}

impl QueryResult {
    /// Sentinel for "no match"
    pub const NONE: QueryResult = QueryResult {
        id: -1,
        distance: f32::INFINITY,
        position: Vec3::ZERO,
    };

    pub fn new(id: EntityId, distance: f32, position: Vec3) -> Self {
        Self { id, distance, position }
    }

    /// Result for `entity` measured from `point`
    pub fn from_entity(entity: &Entity, point: Vec3) -> Self {
        Self::new(entity.id, entity.position.distance(point), entity.position)
    }

    /// Whether this result refers to an actual entity
    pub fn is_hit(&self) -> bool {
        self.id != -1
    }
}

impl Default for QueryResult {
    fn default() -> Self {
        Self::NONE
    }
}

#[cfg(test)]
#[path = "entity_tests.rs"]
mod tests;
