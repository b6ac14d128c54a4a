//! Primitive layer - vector/box math and the records every structure stores.
//!
//! The vector type is `glam::Vec3` (re-exported at the crate root).

mod aabb;
mod entity;
mod knn;

pub use aabb::AABB;
pub use entity::{Entity, EntityId, QueryResult};
pub(crate) use knn::KNearest;
