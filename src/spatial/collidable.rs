//! Collision capability shared by moving entities and static tiles

use serde::{Deserialize, Serialize};

use crate::core::types::{EntityId, TileCoord, Vector2};
use crate::spatial::bounds::Bounds;

/// Tag partitioning collidables into groups that can be tested selectively
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollisionLayer {
    None,
    Entity,
    World,
    Player,
}

/// Identity of a collidable, used to keep a mover from colliding with itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColliderId {
    Entity(EntityId),
    Tile(TileCoord),
}

/// Anything that takes part in collision and occupies tiles
pub trait Collidable {
    fn collider_id(&self) -> ColliderId;

    fn collision_layer(&self) -> CollisionLayer;

    /// Whether this collidable currently blocks others
    fn should_collide(&self) -> bool;

    /// Bounds at the current position, or at `position` if given
    fn bounds_at(&self, position: Option<Vector2>) -> Bounds;

    fn bounds(&self) -> Bounds {
        self.bounds_at(None)
    }

    /// Integer tiles overlapped by the current bounds
    fn occupied_tiles(&self) -> Vec<TileCoord> {
        occupied_tiles(&self.bounds())
    }
}

/// Tiles covered by `bounds`, rounded outward
///
/// Tile `k` spans `[k - 0.5, k + 0.5)` on each axis. A box whose edge lies
/// exactly on a tile boundary does not occupy the tile beyond it.
pub fn occupied_tiles(bounds: &Bounds) -> Vec<TileCoord> {
    let start_x = (bounds.left() + 0.5).floor() as i32;
    let start_y = (bounds.top() + 0.5).floor() as i32;
    let end_x = ((bounds.right() - 0.5).ceil() as i32).max(start_x);
    let end_y = ((bounds.bottom() - 0.5).ceil() as i32).max(start_y);

    let mut tiles = Vec::with_capacity(((end_x - start_x + 1) * (end_y - start_y + 1)) as usize);
    for y in start_y..=end_y {
        for x in start_x..=end_x {
            tiles.push(TileCoord::new(x, y));
        }
    }
    tiles
}

/// True if `layer` is one of `layers`
pub fn layer_in(layer: CollisionLayer, layers: &[CollisionLayer]) -> bool {
    layer != CollisionLayer::None && layers.contains(&layer)
}
