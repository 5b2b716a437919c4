//! Simulation context and the per-frame update

pub mod context;
pub mod tick;

pub use context::Simulation;
pub use tick::{run_frame, FrameReport};
