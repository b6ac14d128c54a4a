//! Construction parameters for the live structures.
//!
//! Descriptors are plain values; each structure validates its descriptor in
//! its constructor and refuses to build from a bad one.

use crate::error::{Error, Result};
use crate::primitives::AABB;

// ===== OCTREE =====

/// Octree subdivision budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OctreeConfig {
    /// Maximum subdivision depth (root = 0)
    pub max_depth: u32,
    /// A leaf splits once it holds more than this many entities
    pub max_entities_per_leaf: usize,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 8,
            max_entities_per_leaf: 8,
        }
    }
}

impl OctreeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_entities_per_leaf == 0 {
            return Err(Error::InvalidConfig(
                "max_entities_per_leaf must be at least 1".to_string(),
            ));
        }
        if self.max_depth > MAX_TREE_DEPTH {
            return Err(Error::InvalidConfig(format!(
                "max_depth {} exceeds {}",
                self.max_depth, MAX_TREE_DEPTH
            )));
        }
        Ok(())
    }
}

// ===== LOOSE OCTREE =====

/// Loose octree parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LooseOctreeConfig {
    /// Maximum subdivision depth (root = 0)
    pub max_depth: u32,
    /// Loose bounds = tight bounds scaled by this factor around the same center (>= 1)
    pub looseness: f32,
}

impl Default for LooseOctreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 6,
            looseness: 2.0,
        }
    }
}

impl LooseOctreeConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.looseness.is_finite() || self.looseness < 1.0 {
            return Err(Error::InvalidConfig(format!(
                "looseness {} must be finite and >= 1",
                self.looseness
            )));
        }
        if self.max_depth > MAX_TREE_DEPTH {
            return Err(Error::InvalidConfig(format!(
                "max_depth {} exceeds {}",
                self.max_depth, MAX_TREE_DEPTH
            )));
        }
        Ok(())
    }
}

// ===== GRID 2D =====

/// Dense 2-D grid dimensions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid2dConfig {
    /// Number of columns
    pub width: u32,
    /// Number of rows
    pub height: u32,
    /// Side length of one square cell
    pub cell_size: f32,
}

impl Grid2dConfig {
    pub fn validate(&self) -> Result<()> {
        validate_cell_size(self.cell_size)?;
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidConfig(format!(
                "grid dimensions {}x{} must be non-zero",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

// ===== SHARED CHECKS =====

/// Deepest subdivision accepted. Past this, f32 cell extents stop halving cleanly.
pub const MAX_TREE_DEPTH: u32 = 21;

pub(crate) fn validate_bounds(bounds: &AABB) -> Result<()> {
    if bounds.is_valid() {
        Ok(())
    } else {
        Err(Error::InvalidBounds(format!(
            "min {:?} / max {:?} must be finite with min <= max",
            bounds.min, bounds.max
        )))
    }
}

pub(crate) fn validate_cell_size(cell_size: f32) -> Result<()> {
    if cell_size.is_finite() && cell_size > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidCellSize(format!(
            "{} (must be finite and > 0)",
            cell_size
        )))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
