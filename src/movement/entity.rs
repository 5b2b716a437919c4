//! Moving entities: the player and autonomous agents
//!
//! There is a single entity type. What differs between the player and an
//! agent is its `EntityBehavior`: where steering comes from, the hitbox shape,
//! speed limits and collision layers.

use crate::core::config::{MovementConfig, NavigationConfig};
use crate::core::types::{EntityId, TileCoord, Vector2};
use crate::movement::collision::ResolvedMovement;
use crate::movement::steering::SteeringIntent;
use crate::navigation::follower::Follower;
use crate::spatial::bounds::Bounds;
use crate::spatial::collidable::{Collidable, ColliderId, CollisionLayer};

/// Hitbox relative to the character's sprite footprint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hitbox {
    /// Fraction of the footprint covered on each axis
    pub scale: Vector2,
    /// Offset of the hitbox centre from the entity position (tiles)
    pub displacement: Vector2,
}

impl Hitbox {
    /// Hitbox equal to the footprint, centred on the position
    pub const FULL: Self = Self {
        scale: Vector2::new(1.0, 1.0),
        displacement: Vector2::ZERO,
    };

    pub fn player() -> Self {
        Self {
            scale: Vector2::new(2.0 / 3.0, 2.0 / 3.0),
            displacement: Vector2::new(0.0, 0.5),
        }
    }

    pub fn agent() -> Self {
        Self {
            scale: Vector2::new(1.0 / 3.0, 1.0 / 3.0),
            displacement: Vector2::new(0.0, 0.25),
        }
    }
}

/// Acceleration and speed caps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementProfile {
    /// Tiles/s² gained under intent and lost to friction without it
    pub acceleration: f32,
    /// Per-axis speed cap (tiles/s)
    pub max_velocity: Vector2,
}

/// Where an entity's steering intent comes from
#[derive(Debug, Clone, PartialEq)]
pub enum SteeringSource {
    /// Supplied each frame by the input layer
    Input,
    /// Derived from a cached path
    Follower(Follower),
}

/// Everything that distinguishes one kind of mover from another
#[derive(Debug, Clone, PartialEq)]
pub struct EntityBehavior {
    pub steering: SteeringSource,
    pub hitbox: Hitbox,
    pub profile: MovementProfile,
    pub layer: CollisionLayer,
    /// Layers this entity cannot move through
    pub collides_with: Vec<CollisionLayer>,
}

/// A character moving continuously over the tile world
#[derive(Debug, Clone, PartialEq)]
pub struct MovingEntity {
    pub id: EntityId,
    /// Logical anchor in tile space
    pub position: Vector2,
    /// Tiles per second
    pub velocity: Vector2,
    /// Sprite footprint in tiles
    pub size: Vector2,
    pub behavior: EntityBehavior,
    /// Intent applied on the last velocity update
    pub intent: SteeringIntent,
}

impl MovingEntity {
    pub fn new(id: EntityId, position: Vector2, size: Vector2, behavior: EntityBehavior) -> Self {
        Self {
            id,
            position,
            velocity: Vector2::ZERO,
            size,
            behavior,
            intent: SteeringIntent::IDLE,
        }
    }

    /// Anchor position for a character standing on `tile`
    pub fn spawn_position(tile: TileCoord, size: Vector2) -> Vector2 {
        Vector2::new(tile.x as f32, tile.y as f32 - size.y / 2.0)
    }

    /// Input-driven player standing on `tile`
    pub fn player(id: EntityId, tile: TileCoord, config: &MovementConfig) -> Self {
        let behavior = EntityBehavior {
            steering: SteeringSource::Input,
            hitbox: Hitbox::player(),
            profile: MovementProfile {
                acceleration: config.acceleration,
                max_velocity: Vector2::new(config.player_max_speed, config.player_max_speed),
            },
            layer: CollisionLayer::Player,
            collides_with: vec![CollisionLayer::World, CollisionLayer::Entity],
        };
        let size = config.character_size;
        Self::new(id, Self::spawn_position(tile, size), size, behavior)
    }

    /// Path-following agent standing on `tile`
    pub fn agent(
        id: EntityId,
        tile: TileCoord,
        movement: &MovementConfig,
        navigation: &NavigationConfig,
    ) -> Self {
        let behavior = EntityBehavior {
            steering: SteeringSource::Follower(Follower::new(navigation)),
            hitbox: Hitbox::agent(),
            profile: MovementProfile {
                acceleration: movement.acceleration,
                max_velocity: Vector2::new(movement.agent_max_speed, movement.agent_max_speed),
            },
            layer: CollisionLayer::Entity,
            collides_with: vec![CollisionLayer::World, CollisionLayer::Entity, CollisionLayer::Player],
        };
        let size = movement.character_size;
        Self::new(id, Self::spawn_position(tile, size), size, behavior)
    }

    pub fn follower(&self) -> Option<&Follower> {
        match &self.behavior.steering {
            SteeringSource::Follower(follower) => Some(follower),
            SteeringSource::Input => None,
        }
    }

    pub fn follower_mut(&mut self) -> Option<&mut Follower> {
        match &mut self.behavior.steering {
            SteeringSource::Follower(follower) => Some(follower),
            SteeringSource::Input => None,
        }
    }

    pub fn is_player_controlled(&self) -> bool {
        matches!(self.behavior.steering, SteeringSource::Input)
    }

    /// Centre of the hitbox, the point used for planning and steering
    pub fn hitbox_center(&self) -> Vector2 {
        self.position + self.behavior.hitbox.displacement
    }

    /// Tile the hitbox centre stands on
    pub fn tile(&self) -> TileCoord {
        self.hitbox_center().tile()
    }

    /// Accelerate along `intent`, apply friction on idle axes, clamp to the
    /// speed cap
    pub fn update_velocity(&mut self, intent: SteeringIntent, dt: f32) {
        let step = self.behavior.profile.acceleration * dt;
        let max = self.behavior.profile.max_velocity;
        let mut v = self.velocity;

        if intent.left {
            v.x -= step;
        }
        if intent.right {
            v.x += step;
        }
        if intent.up {
            v.y -= step;
        }
        if intent.down {
            v.y += step;
        }

        if !intent.horizontal() {
            v.x = toward_zero(v.x, step);
        }
        if !intent.vertical() {
            v.y = toward_zero(v.y, step);
        }

        v.x = v.x.clamp(-max.x, max.x);
        v.y = v.y.clamp(-max.y, max.y);

        self.velocity = v;
        self.intent = intent;
    }

    /// Take the result of collision resolution
    pub fn apply(&mut self, resolved: &ResolvedMovement) {
        self.position = resolved.position;
        self.velocity = resolved.velocity;
    }
}

/// Reduce magnitude by `step` without crossing zero
fn toward_zero(value: f32, step: f32) -> f32 {
    if value > 0.0 {
        (value - step).max(0.0)
    } else if value < 0.0 {
        (value + step).min(0.0)
    } else {
        0.0
    }
}

impl Collidable for MovingEntity {
    fn collider_id(&self) -> ColliderId {
        ColliderId::Entity(self.id)
    }

    fn collision_layer(&self) -> CollisionLayer {
        self.behavior.layer
    }

    fn should_collide(&self) -> bool {
        true
    }

    fn bounds_at(&self, position: Option<Vector2>) -> Bounds {
        let anchor = position.unwrap_or(self.position);
        let hitbox = self.behavior.hitbox;
        let size = Vector2::new(self.size.x * hitbox.scale.x, self.size.y * hitbox.scale.y);
        Bounds::from_center(anchor + hitbox.displacement, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> MovingEntity {
        MovingEntity::player(EntityId::new(0), TileCoord::new(5, 5), &MovementConfig::default())
    }

    #[test]
    fn test_spawn_stands_on_tile() {
        let entity = player();
        assert_eq!(entity.position, Vector2::new(5.0, 4.0));
    }

    #[test]
    fn test_acceleration_is_clamped() {
        let mut entity = player();
        entity.update_velocity(SteeringIntent::new(false, true, true, false), 1.0);
        assert_eq!(entity.velocity, Vector2::new(10.0, -10.0));
    }

    #[test]
    fn test_friction_stops_at_zero() {
        let mut entity = player();
        entity.velocity = Vector2::new(3.0, -1.0);
        entity.update_velocity(SteeringIntent::IDLE, 0.01);
        assert_eq!(entity.velocity, Vector2::new(1.0, 0.0));
        entity.update_velocity(SteeringIntent::IDLE, 0.01);
        assert_eq!(entity.velocity, Vector2::ZERO);
    }

    #[test]
    fn test_opposing_intents_cancel() {
        let mut entity = player();
        entity.velocity = Vector2::new(2.0, 0.0);
        entity.update_velocity(SteeringIntent::new(true, true, false, false), 0.01);
        assert_eq!(entity.velocity.x, 2.0);
    }

    #[test]
    fn test_hitbox_bounds_are_scaled_and_displaced() {
        let entity = player();
        let bounds = entity.bounds();
        assert!((bounds.width - 4.0 / 3.0).abs() < 1e-6);
        assert!((bounds.center().y - 4.5).abs() < 1e-6);
        assert_eq!(bounds.center().x, 5.0);
    }

    #[test]
    fn test_only_agents_have_followers() {
        let config = MovementConfig::default();
        let agent = MovingEntity::agent(
            EntityId::new(1),
            TileCoord::new(0, 0),
            &config,
            &NavigationConfig::default(),
        );
        assert!(agent.follower().is_some());
        assert!(player().follower().is_none());
        assert!(player().is_player_controlled());
    }
}
