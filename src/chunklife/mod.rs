//! Chunked engine internals and public API.

mod arena;
mod cell;
mod chunk;
mod coord;
mod shared;
mod world;

pub use arena::ChunkIdx;
pub use cell::{Cell, CellState, is_isolated, is_overpopulated, transition};
pub use chunk::{CellRef, Chunk, ChunkMut, ChunkRef};
pub use coord::{CHUNK_SIZE, Coordinate, GridKey, GridMap, INFLUENCE_OFFSETS};
pub use shared::{SharedWorld, WorldSnapshot};
pub use world::{THREADS_ENV, World, WorldConfig};
