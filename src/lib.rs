//! Overworld - tile-world movement, collision, pathfinding, camera and streaming

pub mod core;
pub mod movement;
pub mod navigation;
pub mod render;
pub mod simulation;
pub mod spatial;
pub mod world;
