/*!
# Spatial Engine

In-memory spatial indexing for games and simulations.

The caller owns the canonical entity data and drives each structure once per
tick: mutate (or rebuild), then query. Structures copy entities in and hold
no global state; the only process-wide piece is the logger.

## Structures

- **Octree**: adaptive point octree over fixed bounds, for largely static scenery
- **LooseOctree**: octree with enlarged node bounds and O(1) removal, for entities that move every tick
- **SpatialHash**: unbounded uniform grid keyed by integer cells
- **KdTree**: static median-split tree with exact nearest / k-nearest queries
- **Bvh**: static bounding volume hierarchy with ray casting
- **Grid2D**: fixed dense 2-D grid for screen-space queries

The live structures implement [`spatial::SpatialIndex`]; every 3-D structure
implements [`spatial::SpatialQuery`].
*/

// Internal modules
mod error;
mod engine;
mod config;
mod primitives;
mod spatial_index;
mod octree;
mod grid;
mod static_tree;
pub mod log;

// Main spatial namespace module
pub mod spatial {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging hub
    pub use crate::engine::Engine;

    // Primitives
    pub use crate::primitives::{AABB, Entity, EntityId, QueryResult};

    // Configuration descriptors
    pub use crate::config::{OctreeConfig, LooseOctreeConfig, Grid2dConfig, MAX_TREE_DEPTH};

    // Shared traits
    pub use crate::spatial_index::{SpatialQuery, SpatialIndex};

    // Structures
    pub use crate::octree::{Octree, LooseOctree};
    pub use crate::grid::{SpatialHash, Grid2D, Rect};
    pub use crate::static_tree::{KdTree, Bvh};

    // Logging sub-module (types only, macros are exported at the crate root)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }
}

// Re-export math library at crate root
pub use glam;
