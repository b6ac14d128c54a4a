use glam::Vec3;
use super::*;

// ============================================================================
// Defaults
// ============================================================================

#[test]
fn test_defaults_are_valid() {
    assert!(OctreeConfig::default().validate().is_ok());
    assert!(LooseOctreeConfig::default().validate().is_ok());

    let octree = OctreeConfig::default();
    assert_eq!(octree.max_depth, 8);
    assert_eq!(octree.max_entities_per_leaf, 8);

    let loose = LooseOctreeConfig::default();
    assert_eq!(loose.max_depth, 6);
    assert_eq!(loose.looseness, 2.0);
}

// ============================================================================
// Rejections
// ============================================================================

#[test]
fn test_octree_rejects_zero_budget() {
    let config = OctreeConfig { max_entities_per_leaf: 0, ..Default::default() };
    assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
}

#[test]
fn test_octree_rejects_excessive_depth() {
    let config = OctreeConfig { max_depth: MAX_TREE_DEPTH + 1, ..Default::default() };
    assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
}

#[test]
fn test_loose_rejects_tight_or_nan_looseness() {
    for looseness in [0.5, f32::NAN, f32::INFINITY] {
        let config = LooseOctreeConfig { looseness, ..Default::default() };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }
    let exact = LooseOctreeConfig { looseness: 1.0, ..Default::default() };
    assert!(exact.validate().is_ok());
}

#[test]
fn test_grid_rejects_bad_dimensions_and_cell_size() {
    let ok = Grid2dConfig { width: 4, height: 3, cell_size: 1.0 };
    assert!(ok.validate().is_ok());

    let zero_width = Grid2dConfig { width: 0, ..ok };
    assert!(matches!(zero_width.validate(), Err(Error::InvalidConfig(_))));

    let bad_cell = Grid2dConfig { cell_size: 0.0, ..ok };
    assert!(matches!(bad_cell.validate(), Err(Error::InvalidCellSize(_))));
}

#[test]
fn test_validate_cell_size() {
    assert!(validate_cell_size(0.25).is_ok());
    assert!(validate_cell_size(-1.0).is_err());
    assert!(validate_cell_size(f32::NAN).is_err());
    assert!(validate_cell_size(f32::INFINITY).is_err());
}

#[test]
fn test_validate_bounds() {
    assert!(validate_bounds(&AABB::new(Vec3::ZERO, Vec3::ONE)).is_ok());
    assert!(validate_bounds(&AABB::new(Vec3::ZERO, Vec3::ZERO)).is_ok());
    let inverted = AABB::new(Vec3::new(0.0, 2.0, 0.0), Vec3::ONE);
    assert!(matches!(validate_bounds(&inverted), Err(Error::InvalidBounds(_))));
}
