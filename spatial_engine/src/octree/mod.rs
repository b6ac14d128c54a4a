//! Octrees: the adaptive point octree and the loose octree for moving entities.

mod adaptive_octree;
mod loose_octree;

pub use adaptive_octree::Octree;
pub use loose_octree::LooseOctree;
