//! Swept, axis-separated collision resolution
//!
//! Movement is resolved vertically first, then horizontally. Each axis is
//! swept in `COLLISION_STEP` increments so fast movers cannot skip over thin
//! obstacles. On the first overlap the mover is snapped to just outside the
//! obstacle and its velocity on that axis is zeroed.

use crate::core::types::Vector2;
use crate::spatial::bounds::{bounds_colliding, Axis, Bounds};
use crate::spatial::collidable::{layer_in, Collidable, CollisionLayer};

/// Sweep increment (tiles)
pub const COLLISION_STEP: f32 = 0.01;

/// Position and velocity of a mover
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Movement {
    pub position: Vector2,
    pub velocity: Vector2,
}

/// Outcome of resolving one frame of movement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedMovement {
    pub position: Vector2,
    pub velocity: Vector2,
    pub blocked_horizontal: bool,
    pub blocked_vertical: bool,
}

impl ResolvedMovement {
    pub fn collided(&self) -> bool {
        self.blocked_horizontal || self.blocked_vertical
    }
}

/// Bounds of every collidable that can block `mover` on `layers`
pub fn collect_obstacles<'a, I>(mover: &dyn Collidable, layers: &[CollisionLayer], others: I) -> Vec<Bounds>
where
    I: IntoIterator<Item = &'a dyn Collidable>,
{
    let own_id = mover.collider_id();
    others
        .into_iter()
        .filter(|other| other.collider_id() != own_id)
        .filter(|other| other.should_collide() && layer_in(other.collision_layer(), layers))
        .map(|other| other.bounds())
        .collect()
}

/// Move `mover` from `position` by `velocity * dt` without entering any
/// collidable of `layers` among `others`
pub fn resolve<'a, I>(
    mover: &dyn Collidable,
    position: Vector2,
    velocity: Vector2,
    layers: &[CollisionLayer],
    dt: f32,
    others: I,
) -> ResolvedMovement
where
    I: IntoIterator<Item = &'a dyn Collidable>,
{
    let obstacles = collect_obstacles(mover, layers, others);
    resolve_against(mover, Movement { position, velocity }, &obstacles, dt)
}

/// Resolve against pre-collected obstacle bounds
pub fn resolve_against(
    mover: &dyn Collidable,
    movement: Movement,
    obstacles: &[Bounds],
    dt: f32,
) -> ResolvedMovement {
    if !(dt > 0.0) {
        return ResolvedMovement {
            position: movement.position,
            velocity: movement.velocity,
            blocked_horizontal: false,
            blocked_vertical: false,
        };
    }

    let (after_vertical, blocked_vertical) = sweep_axis(mover, movement, Axis::Vertical, obstacles, dt);
    let (after_horizontal, blocked_horizontal) =
        sweep_axis(mover, after_vertical, Axis::Horizontal, obstacles, dt);

    ResolvedMovement {
        position: after_horizontal.position,
        velocity: after_horizontal.velocity,
        blocked_horizontal,
        blocked_vertical,
    }
}

fn component(v: Vector2, axis: Axis) -> f32 {
    match axis {
        Axis::Horizontal => v.x,
        Axis::Vertical => v.y,
    }
}

fn with_component(v: Vector2, axis: Axis, value: f32) -> Vector2 {
    match axis {
        Axis::Horizontal => Vector2::new(value, v.y),
        Axis::Vertical => Vector2::new(v.x, value),
    }
}

fn sweep_axis(
    mover: &dyn Collidable,
    movement: Movement,
    axis: Axis,
    obstacles: &[Bounds],
    dt: f32,
) -> (Movement, bool) {
    let Movement { position, velocity } = movement;
    let speed = component(velocity, axis);
    if speed == 0.0 {
        return (movement, false);
    }

    let sign = speed.signum();
    let start = component(position, axis);
    let total = (speed * dt).abs();
    let steps = (total / COLLISION_STEP).ceil() as usize;

    for i in 1..=steps {
        let travelled = (i as f32 * COLLISION_STEP).min(total);
        let candidate = with_component(position, axis, start + sign * travelled);
        let bounds = mover.bounds_at(Some(candidate));

        // Of everything hit on this step, keep the correction that stops earliest
        let corrected_center = obstacles
            .iter()
            .filter_map(|obstacle| bounds_colliding(&bounds, obstacle))
            .map(|hit| hit.corrected(axis))
            .reduce(|a, b| if sign > 0.0 { a.min(b) } else { a.max(b) });

        if let Some(center) = corrected_center {
            // Hitboxes may be displaced from the anchor position
            let anchor_offset = component(bounds.center(), axis) - component(candidate, axis);
            let snapped = Movement {
                position: with_component(position, axis, center - anchor_offset),
                velocity: with_component(velocity, axis, 0.0),
            };
            return (snapped, true);
        }
    }

    let moved = Movement {
        position: with_component(position, axis, start + speed * dt),
        velocity,
    };
    (moved, false)
}
