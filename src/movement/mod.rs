//! Character movement: steering intent, kinematics and collision resolution

pub mod collision;
pub mod entity;
pub mod steering;

pub use collision::{resolve, resolve_against, Movement, ResolvedMovement, COLLISION_STEP};
pub use entity::{EntityBehavior, Hitbox, MovementProfile, MovingEntity, SteeringSource};
pub use steering::SteeringIntent;
