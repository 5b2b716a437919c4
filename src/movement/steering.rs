//! Steering intent: the four-direction signal every mover consumes

use serde::{Deserialize, Serialize};

use crate::core::types::Vector2;

/// Which cardinal directions are active this frame
///
/// Produced either by the input layer (player) or by a follower (agents).
/// `up` is toward negative y.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SteeringIntent {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl SteeringIntent {
    pub const IDLE: Self = Self {
        left: false,
        right: false,
        up: false,
        down: false,
    };

    pub fn new(left: bool, right: bool, up: bool, down: bool) -> Self {
        Self { left, right, up, down }
    }

    /// Intent that moves along the sign of `delta`, ignoring components
    /// within `dead_zone`
    pub fn toward(delta: Vector2, dead_zone: f32) -> Self {
        Self {
            left: delta.x < -dead_zone,
            right: delta.x > dead_zone,
            up: delta.y < -dead_zone,
            down: delta.y > dead_zone,
        }
    }

    pub fn is_idle(&self) -> bool {
        !(self.left || self.right || self.up || self.down)
    }

    pub fn horizontal(&self) -> bool {
        self.left || self.right
    }

    pub fn vertical(&self) -> bool {
        self.up || self.down
    }
}
