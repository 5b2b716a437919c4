use thiserror::Error;

use crate::core::types::{EntityId, TileCoord};

#[derive(Error, Debug)]
pub enum OverworldError {
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    #[error("Invalid world grid: {0}")]
    InvalidGrid(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Spawn tile {0} is outside the world or blocked")]
    InvalidSpawn(TileCoord),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, OverworldError>;
