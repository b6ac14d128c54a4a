use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use crate::error::Error;
use super::*;

fn world() -> AABB {
    AABB::new(Vec3::splat(-100.0), Vec3::splat(100.0))
}

fn small_leaf_config() -> OctreeConfig {
    OctreeConfig { max_depth: 4, max_entities_per_leaf: 2 }
}

fn random_entities(count: usize, seed: u64) -> Vec<Entity> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            Entity::new(
                i as EntityId,
                Vec3::new(
                    rng.random_range(-100.0..100.0),
                    rng.random_range(-100.0..100.0),
                    rng.random_range(-100.0..100.0),
                ),
                rng.random_range(0.0..2.0),
            )
        })
        .collect()
}

fn sorted(mut ids: Vec<EntityId>) -> Vec<EntityId> {
    ids.sort_unstable();
    ids
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_new_rejects_inverted_bounds() {
    let bounds = AABB::new(Vec3::splat(1.0), Vec3::splat(-1.0));
    assert!(matches!(
        Octree::new(bounds, OctreeConfig::default()),
        Err(Error::InvalidBounds(_))
    ));
}

#[test]
fn test_new_rejects_zero_budget() {
    let config = OctreeConfig { max_entities_per_leaf: 0, ..Default::default() };
    assert!(matches!(Octree::new(world(), config), Err(Error::InvalidConfig(_))));
}

#[test]
fn test_new_is_single_empty_leaf() {
    let octree = Octree::with_defaults(world()).unwrap();
    assert_eq!(octree.node_count(), 1);
    assert_eq!(octree.depth(), 0);
    assert!(octree.is_empty());
    assert_eq!(octree.config(), OctreeConfig::default());
}

// ============================================================================
// Insert / subdivide
// ============================================================================

#[test]
fn test_insert_outside_bounds_is_rejected() {
    let mut octree = Octree::with_defaults(world()).unwrap();
    assert!(!octree.insert(Entity::point(1, Vec3::splat(150.0))));
    assert!(!octree.insert(Entity::point(2, Vec3::splat(f32::NAN))));
    assert_eq!(octree.len(), 0);
}

#[test]
fn test_insert_on_outer_boundary_is_accepted() {
    let mut octree = Octree::new(world(), small_leaf_config()).unwrap();
    for (i, corner) in [Vec3::splat(100.0), Vec3::splat(-100.0), Vec3::new(100.0, -100.0, 0.0)]
        .into_iter()
        .enumerate()
    {
        assert!(octree.insert(Entity::point(i as EntityId, corner)));
    }
    assert_eq!(octree.len(), 3);
    assert_eq!(sorted(octree.query_range(&world())), vec![0, 1, 2]);
}

#[test]
fn test_leaf_splits_once_over_budget() {
    let mut octree = Octree::new(world(), small_leaf_config()).unwrap();
    octree.insert(Entity::point(1, Vec3::new(-50.0, -50.0, -50.0)));
    octree.insert(Entity::point(2, Vec3::new(50.0, 50.0, 50.0)));
    assert_eq!(octree.node_count(), 1);

    octree.insert(Entity::point(3, Vec3::new(50.0, -50.0, 50.0)));
    assert_eq!(octree.node_count(), 9);
    assert_eq!(octree.depth(), 1);
    assert_eq!(octree.count_entities(), 3);
}

#[test]
fn test_clustered_entities_split_to_max_depth_only() {
    let mut octree = Octree::new(world(), small_leaf_config()).unwrap();
    for i in 0..10 {
        octree.insert(Entity::point(i, Vec3::splat(1.0)));
    }
    assert_eq!(octree.depth(), small_leaf_config().max_depth);
    assert_eq!(octree.len(), 10);
    assert_eq!(octree.count_entities(), 10);
}

// ============================================================================
// Remove / update / clear
// ============================================================================

#[test]
fn test_remove_existing_and_missing() {
    let mut octree = Octree::new(world(), small_leaf_config()).unwrap();
    for e in random_entities(50, 1) {
        octree.insert(e);
    }

    assert!(octree.remove(10));
    assert!(!octree.remove(10));
    assert!(!octree.remove(999));
    assert_eq!(octree.len(), 49);
    assert_eq!(octree.count_entities(), 49);
    assert!(!octree.query_range(&world()).contains(&10));
}

#[test]
fn test_removed_nearest_is_no_longer_found() {
    let mut octree = Octree::new(world(), small_leaf_config()).unwrap();
    let entities = random_entities(60, 4);
    for e in &entities {
        octree.insert(*e);
    }

    let query_point = entities[7].position + Vec3::splat(0.01);
    let nearest = octree.query_nearest(query_point);
    assert_eq!(nearest.id, 7);
    let k_before = octree.query_k_nearest(query_point, 5);
    assert_eq!(k_before[0].id, 7);

    assert!(octree.remove(7));
    assert_ne!(octree.query_nearest(query_point).id, 7);
    let k_after = octree.query_k_nearest(query_point, 5);
    assert_eq!(k_after.len(), 5);
    assert!(k_after.iter().all(|r| r.id != 7));
    // The next four survivors keep their order
    let before_ids: Vec<EntityId> = k_before[1..].iter().map(|r| r.id).collect();
    let after_ids: Vec<EntityId> = k_after[..4].iter().map(|r| r.id).collect();
    assert_eq!(after_ids, before_ids);
}

#[test]
fn test_remove_last_entity_leaves_nearest_empty() {
    let mut octree = Octree::with_defaults(world()).unwrap();
    octree.insert(Entity::point(3, Vec3::ONE));
    assert!(octree.remove(3));

    assert_eq!(octree.query_nearest(Vec3::ONE), QueryResult::NONE);
    assert!(octree.query_k_nearest(Vec3::ONE, 4).is_empty());
}

#[test]
fn test_update_moves_entity() {
    let mut octree = Octree::new(world(), small_leaf_config()).unwrap();
    for e in random_entities(30, 2) {
        octree.insert(e);
    }
    let moved = Entity::point(5, Vec3::new(99.0, 99.0, 99.0));
    assert!(octree.update(moved));

    assert_eq!(octree.len(), 30);
    let near_corner = octree.query_radius(Vec3::splat(99.0), 0.01);
    assert_eq!(near_corner, vec![5]);
}

#[test]
fn test_update_out_of_bounds_drops_entity() {
    let mut octree = Octree::with_defaults(world()).unwrap();
    octree.insert(Entity::point(1, Vec3::ZERO));
    assert!(!octree.update(Entity::point(1, Vec3::splat(500.0))));
    assert!(octree.is_empty());
}

#[test]
fn test_clear_resets_tree() {
    let mut octree = Octree::new(world(), small_leaf_config()).unwrap();
    for e in random_entities(100, 3) {
        octree.insert(e);
    }
    octree.clear();

    assert!(octree.is_empty());
    assert_eq!(octree.node_count(), 1);
    assert!(octree.query_range(&world()).is_empty());
    assert!(octree.insert(Entity::point(1, Vec3::ZERO)));
}

// ============================================================================
// Queries
// ============================================================================

#[test]
fn test_query_radius_matches_brute_force() {
    let entities = random_entities(400, 4);
    let mut octree = Octree::new(world(), small_leaf_config()).unwrap();
    for e in &entities {
        octree.insert(*e);
    }

    let center = Vec3::new(10.0, -20.0, 5.0);
    for radius in [0.0, 5.0, 30.0, 80.0, 500.0] {
        let expected: Vec<EntityId> = entities
            .iter()
            .filter(|e| e.position.distance_squared(center) <= radius * radius)
            .map(|e| e.id)
            .collect();
        assert_eq!(sorted(octree.query_radius(center, radius)), sorted(expected));
    }
}

#[test]
fn test_query_radius_negative_is_empty() {
    let mut octree = Octree::with_defaults(world()).unwrap();
    octree.insert(Entity::point(1, Vec3::ZERO));
    assert!(octree.query_radius(Vec3::ZERO, -1.0).is_empty());
    assert_eq!(octree.query_radius(Vec3::ZERO, 0.0), vec![1]);
}

#[test]
fn test_query_range_is_inclusive() {
    let mut octree = Octree::with_defaults(world()).unwrap();
    octree.insert(Entity::point(1, Vec3::new(10.0, 10.0, 10.0)));
    octree.insert(Entity::point(2, Vec3::new(10.1, 10.0, 10.0)));

    let range = AABB::new(Vec3::ZERO, Vec3::splat(10.0));
    assert_eq!(octree.query_range(&range), vec![1]);
}

#[test]
fn test_query_nearest_matches_brute_force() {
    let entities = random_entities(300, 5);
    let mut octree = Octree::new(world(), small_leaf_config()).unwrap();
    for e in &entities {
        octree.insert(*e);
    }

    let mut rng = StdRng::seed_from_u64(55);
    for _ in 0..25 {
        let point = Vec3::new(
            rng.random_range(-120.0..120.0),
            rng.random_range(-120.0..120.0),
            rng.random_range(-120.0..120.0),
        );
        let expected = entities
            .iter()
            .min_by(|a, b| a.position.distance(point).total_cmp(&b.position.distance(point)))
            .unwrap();
        let found = octree.query_nearest(point);
        assert_eq!(found.id, expected.id);
        assert!((found.distance - expected.position.distance(point)).abs() < 1e-4);
    }
}

#[test]
fn test_query_nearest_empty_is_none() {
    let octree = Octree::with_defaults(world()).unwrap();
    assert_eq!(octree.query_nearest(Vec3::ZERO), QueryResult::NONE);
}

#[test]
fn test_query_k_nearest_sorted_and_bounded() {
    let entities = random_entities(200, 6);
    let mut octree = Octree::new(world(), small_leaf_config()).unwrap();
    for e in &entities {
        octree.insert(*e);
    }

    let point = Vec3::new(-5.0, 3.0, 40.0);
    let results = octree.query_k_nearest(point, 12);
    assert_eq!(results.len(), 12);
    assert!(results.windows(2).all(|w| w[0].distance <= w[1].distance));

    let mut brute: Vec<f32> = entities.iter().map(|e| e.position.distance(point)).collect();
    brute.sort_by(f32::total_cmp);
    for (result, expected) in results.iter().zip(&brute) {
        assert!((result.distance - expected).abs() < 1e-4);
    }
}

#[test]
fn test_query_k_nearest_edge_cases() {
    let mut octree = Octree::with_defaults(world()).unwrap();
    assert!(octree.query_k_nearest(Vec3::ZERO, 5).is_empty());

    octree.insert(Entity::point(1, Vec3::ONE));
    octree.insert(Entity::point(2, Vec3::splat(2.0)));
    assert!(octree.query_k_nearest(Vec3::ZERO, 0).is_empty());

    let all = octree.query_k_nearest(Vec3::ZERO, 10);
    assert_eq!(all.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
}

#[test]
fn test_trait_object_dispatch() {
    let mut index: Box<dyn SpatialIndex> = Box::new(Octree::with_defaults(world()).unwrap());
    index.insert(Entity::point(3, Vec3::ZERO));
    assert_eq!(index.len(), 1);
    assert_eq!(index.query_radius(Vec3::ZERO, 1.0), vec![3]);
    index.clear();
    assert!(index.is_empty());
}
