//! Core type definitions used throughout the codebase

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Identifier for a moving entity, unique within one simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize)]
#[display(fmt = "entity#{}", _0)]
pub struct EntityId(pub u32);

impl EntityId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

/// 2D vector in tile space
///
/// Operations return new values and never mutate their operands.
/// Equality is exact float equality.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    pub fn scale(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn inverted(self) -> Self {
        Self::new(-self.x, -self.y)
    }

    pub fn sqr_magnitude(self) -> f32 {
        self.dot(self)
    }

    pub fn magnitude(self) -> f32 {
        self.sqr_magnitude().sqrt()
    }

    /// Unit vector in the same direction. The zero vector normalizes to zero.
    pub fn normalize(self) -> Self {
        let len = self.magnitude();
        if len > 0.0 {
            Self::new(self.x / len, self.y / len)
        } else {
            Self::ZERO
        }
    }

    /// Unit vector pointing from `from` to `to`
    pub fn direction(from: Self, to: Self) -> Self {
        to.sub(from).normalize()
    }

    pub fn distance(self, other: Self) -> f32 {
        other.sub(self).magnitude()
    }

    /// Rounds each component to the nearest integer, halves rounding up.
    ///
    /// Tiles are unit squares centred on integer coordinates, so this is the
    /// tile a point falls in.
    pub fn rounded(self) -> Self {
        Self::new((self.x + 0.5).floor(), (self.y + 0.5).floor())
    }

    /// The tile containing this point
    pub fn tile(self) -> TileCoord {
        let r = self.rounded();
        TileCoord::new(r.x as i32, r.y as i32)
    }

    /// Component-wise comparison within `epsilon`
    pub fn approx_eq(self, other: Self, epsilon: f32) -> bool {
        (self.x - other.x).abs() <= epsilon && (self.y - other.y).abs() <= epsilon
    }
}

impl std::ops::Add for Vector2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Vector2::add(self, rhs)
    }
}

impl std::ops::Sub for Vector2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Vector2::sub(self, rhs)
    }
}

impl std::ops::Mul<f32> for Vector2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        self.scale(rhs)
    }
}

impl std::ops::Neg for Vector2 {
    type Output = Self;
    fn neg(self) -> Self {
        self.inverted()
    }
}

impl From<glam::Vec2> for Vector2 {
    fn from(v: glam::Vec2) -> Self {
        Self::new(v.x, v.y)
    }
}

impl From<Vector2> for glam::Vec2 {
    fn from(v: Vector2) -> Self {
        glam::Vec2::new(v.x, v.y)
    }
}

/// Integer tile coordinate
///
/// Displays as `x-y`, the key format of the tile registry.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize,
)]
#[display(fmt = "{}-{}", x, y)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Tile centre in tile space
    pub fn center(self) -> Vector2 {
        Vector2::new(self.x as f32, self.y as f32)
    }

    /// 4-connected neighbours: up, right, down, left
    pub fn neighbors(self) -> [TileCoord; 4] {
        [
            TileCoord::new(self.x, self.y - 1),
            TileCoord::new(self.x + 1, self.y),
            TileCoord::new(self.x, self.y + 1),
            TileCoord::new(self.x - 1, self.y),
        ]
    }

    pub fn manhattan(self, other: TileCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Straight-line distance between tile centres
    pub fn euclidean(self, other: TileCoord) -> f32 {
        self.center().distance(other.center())
    }
}

impl From<(i32, i32)> for TileCoord {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}
