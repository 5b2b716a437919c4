//! Static world tiles

use serde::{Deserialize, Serialize};

use crate::core::types::{TileCoord, Vector2};
use crate::spatial::bounds::Bounds;
use crate::spatial::collidable::{Collidable, ColliderId, CollisionLayer};

/// What occupies a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TileKind {
    #[default]
    Free,
    Rock,
}

impl TileKind {
    /// Grid code 0 is free ground, anything else blocks
    pub fn from_code(code: u8) -> Self {
        if code == 0 {
            TileKind::Free
        } else {
            TileKind::Rock
        }
    }

    pub fn is_solid(&self) -> bool {
        matches!(self, TileKind::Rock)
    }
}

/// A unit square of the world centred on its integer coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub coord: TileCoord,
    pub kind: TileKind,
}

impl Tile {
    pub fn new(coord: TileCoord, kind: TileKind) -> Self {
        Self { coord, kind }
    }
}

impl Collidable for Tile {
    fn collider_id(&self) -> ColliderId {
        ColliderId::Tile(self.coord)
    }

    fn collision_layer(&self) -> CollisionLayer {
        CollisionLayer::World
    }

    fn should_collide(&self) -> bool {
        self.kind.is_solid()
    }

    fn bounds_at(&self, position: Option<Vector2>) -> Bounds {
        let center = position.unwrap_or_else(|| self.coord.center());
        Bounds::from_center(center, Vector2::new(1.0, 1.0))
    }

    fn occupied_tiles(&self) -> Vec<TileCoord> {
        vec![self.coord]
    }
}
