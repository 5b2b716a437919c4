pub mod config;
pub mod error;
pub mod types;

pub use config::SimulationConfig;
pub use error::{OverworldError, Result};
pub use types::{EntityId, TileCoord, Vector2};
