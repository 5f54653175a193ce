//! Fixed-size tiles of the plane and world-aware views over them.
//!
//! `Chunk` owns a sparse map of cells keyed by chunk-relative position and
//! knows nothing about its neighbors. Operations that may cross a chunk
//! boundary live on the views (`ChunkRef`, `ChunkMut`), which pair a chunk
//! handle with a borrow of the owning `World`.

use super::arena::ChunkIdx;
use super::cell::{self, Cell, CellState};
use super::coord::{Coordinate, GridKey, GridMap};
use super::world::World;

/// Handle value of a chunk that is not stored in an arena yet.
pub const DETACHED: ChunkIdx = ChunkIdx(u32::MAX);

pub struct Chunk {
    idx: ChunkIdx,
    origin: Coordinate,
    cells: GridMap<Cell>,
}

impl Chunk {
    /// An empty, detached chunk for the chunk containing `coordinate`.
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            idx: DETACHED,
            origin: coordinate.chunk_origin(),
            cells: GridMap::default(),
        }
    }

    /// Bind this chunk (and every cell it holds) to an arena slot.
    pub(crate) fn attach(&mut self, idx: ChunkIdx) {
        self.idx = idx;
        for cell in self.cells.values_mut() {
            cell.rebind(idx);
        }
    }

    #[inline]
    pub fn idx(&self) -> ChunkIdx {
        self.idx
    }

    /// Absolute coordinate of the lower-left corner.
    #[inline]
    pub fn origin(&self) -> Coordinate {
        self.origin
    }

    #[inline]
    pub fn key(&self) -> GridKey {
        self.origin.chunk_key()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether `coordinate` falls inside this chunk's square.
    #[inline]
    pub fn owns(&self, coordinate: Coordinate) -> bool {
        self.origin.is_in_same_chunk(coordinate)
    }

    /// Local lookup. Foreign coordinates are never present here.
    #[inline]
    pub fn get(&self, coordinate: Coordinate) -> Option<&Cell> {
        if !self.owns(coordinate) {
            return None;
        }
        self.cells.get(&coordinate.relative_key())
    }

    #[inline]
    pub(crate) fn get_by_key_mut(&mut self, key: GridKey) -> Option<&mut Cell> {
        self.cells.get_mut(&key)
    }

    /// Store a fresh `Empty` cell at `coordinate`, replacing any previous entry.
    /// The coordinate must belong to this chunk.
    pub(crate) fn put_empty(&mut self, coordinate: Coordinate) {
        debug_assert!(self.owns(coordinate));
        self.cells
            .insert(coordinate.relative_key(), Cell::new(self.idx, coordinate));
    }

    #[inline]
    pub(crate) fn remove_key(&mut self, key: GridKey) -> Option<Cell> {
        self.cells.remove(&key)
    }

    pub(crate) fn keys(&self) -> Vec<GridKey> {
        self.cells.keys().copied().collect()
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.cells.values()
    }
}

/// Read-only view of a stored chunk.
#[derive(Clone, Copy)]
pub struct ChunkRef<'w> {
    world: &'w World,
    chunk: &'w Chunk,
}

impl<'w> ChunkRef<'w> {
    pub(crate) fn new(world: &'w World, chunk: &'w Chunk) -> Self {
        Self { world, chunk }
    }

    #[inline]
    pub fn idx(&self) -> ChunkIdx {
        self.chunk.idx()
    }

    #[inline]
    pub fn origin(&self) -> Coordinate {
        self.chunk.origin()
    }

    #[inline]
    pub fn key(&self) -> GridKey {
        self.chunk.key()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.chunk.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chunk.is_empty()
    }

    /// Total: answers through the world for coordinates outside this chunk.
    pub fn has_cell_at(&self, coordinate: Coordinate) -> bool {
        if self.chunk.owns(coordinate) {
            self.chunk.get(coordinate).is_some()
        } else {
            self.world.has_cell_at(coordinate)
        }
    }

    pub fn cell_at(&self, coordinate: Coordinate) -> Option<CellRef<'w>> {
        if self.chunk.owns(coordinate) {
            self.chunk
                .get(coordinate)
                .map(|cell| CellRef::new(self.world, cell))
        } else {
            self.world.cell_at(coordinate)
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = CellRef<'w>> + 'w {
        let world = self.world;
        self.chunk.cells().map(move |cell| CellRef::new(world, cell))
    }

    pub fn chunk(&self) -> &'w Chunk {
        self.chunk
    }
}

/// Mutable view of a stored chunk. Holds the whole world borrow because
/// activation may spill into neighboring chunks.
pub struct ChunkMut<'w> {
    world: &'w mut World,
    idx: ChunkIdx,
}

impl<'w> ChunkMut<'w> {
    /// `idx` must name an occupied slot of `world`.
    pub(crate) fn new(world: &'w mut World, idx: ChunkIdx) -> Self {
        debug_assert!(world.arena.get(idx).is_some());
        Self { world, idx }
    }

    #[inline]
    pub fn idx(&self) -> ChunkIdx {
        self.idx
    }

    pub fn view(&self) -> Option<ChunkRef<'_>> {
        self.world.chunk(self.idx)
    }

    pub fn origin(&self) -> Option<Coordinate> {
        self.world.arena.get(self.idx).map(Chunk::origin)
    }

    pub fn is_empty(&self) -> bool {
        self.world.arena.get(self.idx).is_none_or(Chunk::is_empty)
    }

    pub fn len(&self) -> usize {
        self.world.arena.get(self.idx).map_or(0, Chunk::len)
    }

    pub fn has_cell_at(&self, coordinate: Coordinate) -> bool {
        self.world.has_cell_at(coordinate)
    }

    pub fn cell_at(&self, coordinate: Coordinate) -> Option<CellRef<'_>> {
        self.world.cell_at(coordinate)
    }

    /// Create a fresh cell at `coordinate`, replacing whatever was there.
    ///
    /// Coordinates outside this chunk are forwarded to the owning chunk,
    /// which is created on demand. With `appear`, the new cell becomes alive
    /// and its influence ring is populated.
    pub fn activate(&mut self, coordinate: Coordinate, appear: bool) {
        self.world.activate_in(self.idx, coordinate, appear);
    }

    /// Seed an inert cell at the cell's coordinate, without ring maintenance.
    pub fn register(&mut self, cell: &Cell) {
        self.activate(cell.coordinate(), false);
    }

    /// Remove the cell at `coordinate`. Foreign coordinates resolve through the world.
    pub fn remove(&mut self, coordinate: Coordinate) -> Option<Cell> {
        self.world.remove_cell(coordinate)
    }

    /// Compute pass restricted to this chunk.
    pub fn update_next_state(&mut self) {
        let counts = self.world.neighbor_counts(self.idx);
        self.world.apply_neighbor_counts(self.idx, &counts);
    }

    /// Commit pass restricted to this chunk. Does not release the chunk when
    /// it ends up empty; `World::update` does that.
    pub fn update_state(&mut self) {
        self.world.commit_chunk(self.idx);
    }
}

/// A stored cell together with the world it lives in, so neighbor-derived
/// predicates can be answered.
#[derive(Clone, Copy)]
pub struct CellRef<'w> {
    world: &'w World,
    cell: &'w Cell,
}

impl<'w> CellRef<'w> {
    pub(crate) fn new(world: &'w World, cell: &'w Cell) -> Self {
        Self { world, cell }
    }

    #[inline]
    pub fn cell(&self) -> &'w Cell {
        self.cell
    }

    #[inline]
    pub fn coordinate(&self) -> Coordinate {
        self.cell.coordinate()
    }

    #[inline]
    pub fn chunk(&self) -> ChunkIdx {
        self.cell.chunk()
    }

    #[inline]
    pub fn state(&self) -> CellState {
        self.cell.state()
    }

    #[inline]
    pub fn next_state(&self) -> CellState {
        self.cell.next_state()
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.cell.is_alive()
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.cell.is_dead()
    }

    /// Living cells among the 8 surrounding positions. Missing cells and
    /// missing chunks count as not alive.
    pub fn neighbor_count(&self) -> u8 {
        self.world.neighbor_count(self.cell.coordinate())
    }

    pub fn is_isolated(&self) -> bool {
        cell::is_isolated(self.neighbor_count())
    }

    pub fn is_overpopulated(&self) -> bool {
        cell::is_overpopulated(self.neighbor_count())
    }
}
