//! Static world: the tile grid and the tiles built from it

pub mod grid;
pub mod tile;

pub use grid::WorldGrid;
pub use tile::{Tile, TileKind};
