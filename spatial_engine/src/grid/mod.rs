//! Uniform grids: the unbounded 3-D hash and the fixed 2-D grid.

mod spatial_hash;
mod grid2d;

pub use spatial_hash::SpatialHash;
pub use grid2d::{Grid2D, Rect};
