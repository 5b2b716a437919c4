//! Axis-aligned bounding boxes and the overlap test
//!
//! Bounds are stored by their top-left corner. The overlap test reports which
//! side of the other box was hit and where the first box has to be moved to
//! stop touching it.

use serde::{Deserialize, Serialize};

use crate::core::types::Vector2;

/// Distance kept between two boxes after a correction (tiles)
pub const COLLISION_EPSILON: f32 = 0.001;

/// Axis-aligned box in tile space, `x`/`y` is the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Box of `size` centred on `center`
    pub fn from_center(center: Vector2, size: Vector2) -> Self {
        Self::new(
            center.x - size.x / 2.0,
            center.y - size.y / 2.0,
            size.x,
            size.y,
        )
    }

    pub fn center(&self) -> Vector2 {
        Vector2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn half_extents(&self) -> Vector2 {
        Vector2::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Same box moved by `delta`
    pub fn translated(&self, delta: Vector2) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y, self.width, self.height)
    }

    /// Strict intersection; touching edges do not intersect
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Overlap depth on each axis, zero when apart
    pub fn overlap(&self, other: &Bounds) -> Vector2 {
        let x = (self.right().min(other.right()) - self.left().max(other.left())).max(0.0);
        let y = (self.bottom().min(other.bottom()) - self.top().max(other.top())).max(0.0);
        Vector2::new(x, y)
    }

    /// Smallest box containing both
    pub fn union(&self, other: &Bounds) -> Bounds {
        let left = self.left().min(other.left());
        let top = self.top().min(other.top());
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Bounds::new(left, top, right - left, bottom - top)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Result of a positive overlap test between a moving box and an obstacle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    /// The moving box lies left of the obstacle
    pub left: bool,
    /// The moving box lies right of the obstacle
    pub right: bool,
    /// The moving box lies above the obstacle
    pub top: bool,
    /// The moving box lies below the obstacle
    pub bottom: bool,
    /// Centre coordinates per axis at which the moving box sits just outside
    /// the obstacle, `COLLISION_EPSILON` away from its boundary
    pub correction: Vector2,
    /// Axis with the shallower penetration
    ///
    /// The sweep resolver ignores this and always corrects along the axis it
    /// is stepping. It is for callers pushing apart boxes that already
    /// overlap with no motion to go by.
    pub axis: Axis,
    /// Signed displacement along `axis` that separates the boxes; translate
    /// the moving box by it to resolve a static overlap
    pub delta: Vector2,
}

impl Collision {
    /// Corrected centre coordinate on the given axis
    pub fn corrected(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.correction.x,
            Axis::Vertical => self.correction.y,
        }
    }
}

/// Test whether `moving` overlaps `obstacle`
///
/// Returns `None` when the boxes are apart or only touch. Ties in centre
/// position resolve toward the right/bottom side.
pub fn bounds_colliding(moving: &Bounds, obstacle: &Bounds) -> Option<Collision> {
    if !moving.intersects(obstacle) {
        return None;
    }

    let a = moving.center();
    let b = obstacle.center();
    let half_a = moving.half_extents();
    let half_b = obstacle.half_extents();

    let horizontal = a.x - b.x;
    let vertical = a.y - b.y;

    let left = horizontal < 0.0;
    let right = horizontal > 0.0;
    let top = vertical < 0.0;
    let bottom = vertical > 0.0;

    let correction_x = if left {
        b.x - half_b.x - half_a.x - COLLISION_EPSILON
    } else {
        b.x + half_b.x + half_a.x + COLLISION_EPSILON
    };
    let correction_y = if top {
        b.y - half_b.y - half_a.y - COLLISION_EPSILON
    } else {
        b.y + half_b.y + half_a.y + COLLISION_EPSILON
    };

    let overlap = moving.overlap(obstacle);
    let axis = if overlap.x <= overlap.y {
        Axis::Horizontal
    } else {
        Axis::Vertical
    };
    let delta = match axis {
        Axis::Horizontal => Vector2::new(correction_x - a.x, 0.0),
        Axis::Vertical => Vector2::new(0.0, correction_y - a.y),
    };

    Some(Collision {
        left,
        right,
        top,
        bottom,
        correction: Vector2::new(correction_x, correction_y),
        axis,
        delta,
    })
}
