//! Spatial primitives: bounding boxes, the collision capability and grids

pub mod bounds;
pub mod collidable;
pub mod grid;

pub use bounds::{bounds_colliding, Axis, Bounds, Collision, COLLISION_EPSILON};
pub use collidable::{occupied_tiles, Collidable, ColliderId, CollisionLayer};
pub use grid::Grid;
