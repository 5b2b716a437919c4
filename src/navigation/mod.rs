//! Grid path planning and path following

pub mod follower;
pub mod pathfinding;

pub use follower::{Follower, FollowerState, ReplanOutcome};
pub use pathfinding::{find_path, random_free_tile, search, WalkabilityGrid};
