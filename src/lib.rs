//! Sparse, chunked Conway's Game of Life engine (B3/S23) on an unbounded plane.

pub mod chunklife;
pub mod driver;
pub mod error;
pub mod logging;
pub mod pattern;
pub mod render;

pub use chunklife::{Coordinate, SharedWorld, World, WorldConfig};
pub use driver::{Driver, LoopConfig};
pub use error::{LifeError, PatternError};
pub use render::{AsciiRenderer, RenderOptions, Renderer, Viewport};
