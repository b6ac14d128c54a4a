//! Rebuild-only hierarchies. Both are values produced by `build(&[Entity])`
//! and expose no mutation.

mod kd_tree;
mod bvh;

pub use kd_tree::KdTree;
pub use bvh::Bvh;
