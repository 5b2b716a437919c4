//! Viewport tracking and world streaming
//!
//! Neither system owns entity state. The camera follows a target and the
//! streamer mirrors the static grid into a bounded set of live tiles.

pub mod camera;
pub mod streamer;

pub use camera::{Camera, Viewport};
pub use streamer::{NullPresenter, RenderArea, StreamDelta, TilePresenter, WorldStreamer};
