//! Camera pursuit and screen/tile coordinate transforms
//!
//! The camera keeps its own smoothed position in tile space and chases a
//! target (normally the player). Screen-space quantities are pixels and use
//! `glam::Vec2`; tile-space quantities use `Vector2`.

use glam::Vec2;

use crate::core::config::CameraConfig;
use crate::core::types::Vector2;

/// Screen dimensions and tile scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Screen size in pixels
    pub screen: Vec2,
    /// Pixels per tile
    pub tile_size: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, tile_size: f32) -> Self {
        Self {
            screen: Vec2::new(width, height),
            tile_size,
        }
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        Self::new(config.screen_width, config.screen_height, config.tile_size)
    }

    /// Finite, non-negative screen and a finite, positive tile size
    pub fn is_valid(&self) -> bool {
        self.screen.is_finite()
            && self.screen.x >= 0.0
            && self.screen.y >= 0.0
            && self.tile_size.is_finite()
            && self.tile_size > 0.0
    }

    /// Number of whole or partial tiles covering the screen on each axis
    pub fn tiles_visible(&self) -> (i32, i32) {
        (
            (self.screen.x / self.tile_size).ceil() as i32,
            (self.screen.y / self.tile_size).ceil() as i32,
        )
    }
}

/// Smoothly pursuing viewport centre
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Current centre in tile space
    pub position: Vector2,
    /// Last pursued target
    pub target: Vector2,
    /// Floor pursuit speed (tiles/s)
    pub min_speed: f32,
    /// Absent until the presentation layer reports its size
    pub viewport: Option<Viewport>,
}

impl Camera {
    /// Camera at the origin with no viewport yet
    pub fn new(min_speed: f32) -> Self {
        Self {
            position: Vector2::ZERO,
            target: Vector2::ZERO,
            min_speed,
            viewport: None,
        }
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        let mut camera = Self::new(config.min_speed);
        camera.set_viewport(Viewport::from_config(config));
        camera
    }

    /// Attach or resize the viewport
    ///
    /// An invalid viewport is ignored and the previous one kept. Returns
    /// whether `viewport` was applied.
    pub fn set_viewport(&mut self, viewport: Viewport) -> bool {
        if !viewport.is_valid() {
            tracing::warn!("ignoring viewport {:?}", viewport);
            return false;
        }
        self.viewport = Some(viewport);
        true
    }

    /// Jump straight to `position`
    pub fn move_to(&mut self, position: Vector2) {
        self.position = position;
        self.target = position;
    }

    /// Step toward `target`
    ///
    /// The step is `distance² · dt`, never less than `min_speed · dt`, and
    /// never past the target. Returns whether the camera moved.
    pub fn pursue(&mut self, target: Vector2, dt: f32) -> bool {
        self.target = target;
        if self.position == target || !(dt > 0.0) {
            return false;
        }

        let distance = self.position.distance(target);
        let step = (distance * distance * dt).max(self.min_speed * dt);

        if distance <= step {
            self.position = target;
        } else {
            let direction = Vector2::direction(self.position, target);
            self.position = self.position + direction * step;
        }
        true
    }

    /// World tile position under a screen point
    pub fn screen_to_tiles(&self, screen_point: Vec2) -> Option<Vector2> {
        let viewport = self.viewport?;
        let centered = (screen_point - viewport.screen / 2.0) / viewport.tile_size;
        Some(self.position + Vector2::from(centered))
    }

    /// Screen point of a world tile position
    pub fn tiles_to_screen(&self, tile_position: Vector2) -> Option<Vec2> {
        let viewport = self.viewport?;
        let relative: Vec2 = (tile_position - self.position).into();
        Some(relative * viewport.tile_size + viewport.screen / 2.0)
    }

    /// Pixel translation that puts the camera position at the screen centre
    pub fn stage_offset(&self) -> Option<Vec2> {
        let viewport = self.viewport?;
        let position: Vec2 = self.position.into();
        Some(-position * viewport.tile_size + viewport.screen / 2.0)
    }
}
