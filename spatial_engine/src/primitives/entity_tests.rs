use glam::Vec3;
use super::*;

#[test]
fn test_none_sentinel() {
    let none = QueryResult::NONE;
    assert_eq!(none.id, -1);
    assert!(none.distance.is_infinite());
    assert!(!none.is_hit());
    assert_eq!(QueryResult::default(), QueryResult::NONE);
}

#[test]
fn test_from_entity_measures_distance() {
    let entity = Entity::point(7, Vec3::new(3.0, 4.0, 0.0));
    let result = QueryResult::from_entity(&entity, Vec3::ZERO);
    assert_eq!(result.id, 7);
    assert_eq!(result.distance, 5.0);
    assert_eq!(result.position, entity.position);
    assert!(result.is_hit());
}

#[test]
fn test_entity_bounds_cover_sphere() {
    let entity = Entity::new(1, Vec3::new(1.0, 2.0, 3.0), 0.5);
    let bounds = entity.bounds();
    assert_eq!(bounds.min, Vec3::new(0.5, 1.5, 2.5));
    assert_eq!(bounds.max, Vec3::new(1.5, 2.5, 3.5));
}

#[test]
fn test_overlaps_is_strict() {
    let a = Entity::new(1, Vec3::ZERO, 1.0);
    let touching = Entity::new(2, Vec3::new(2.0, 0.0, 0.0), 1.0);
    let overlapping = Entity::new(3, Vec3::new(1.5, 0.0, 0.0), 1.0);

    assert!(!a.overlaps(&touching));
    assert!(a.overlaps(&overlapping));
    assert!(overlapping.overlaps(&a));
}
