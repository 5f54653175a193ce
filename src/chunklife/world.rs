use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, trace};

use super::arena::{ChunkArena, ChunkIdx};
use super::cell::{Cell, CellState};
use super::chunk::{CellRef, Chunk, ChunkMut, ChunkRef};
use super::coord::{Coordinate, GridKey};

/// Below this many chunks the compute pass stays on the calling thread.
const PARALLEL_MIN_CHUNKS: usize = 64;

/// Environment override for the default compute pool size.
pub const THREADS_ENV: &str = "CHUNK_LIFE_THREADS";

/// Configuration for a `World` instance.
///
/// Use `WorldConfig::default()` for auto-detected defaults, or customise
/// individual knobs via the builder methods.
#[derive(Clone, Debug, Default)]
pub struct WorldConfig {
    /// Threads for the compute pass.
    /// `None` means `CHUNK_LIFE_THREADS` if set, else the physical core count.
    pub thread_count: Option<usize>,
    /// Hard upper bound on threads regardless of auto-detection.
    pub max_threads: Option<usize>,
    /// Minimum snapshot size, in chunks, before the compute pass goes parallel.
    /// `None` means `PARALLEL_MIN_CHUNKS`.
    pub parallel_min_chunks: Option<usize>,
}

impl WorldConfig {
    /// Set an explicit thread count for the compute pool.
    pub fn thread_count(mut self, n: usize) -> Self {
        self.thread_count = Some(n.max(1));
        self
    }

    /// Set a hard upper bound on threads.
    pub fn max_threads(mut self, n: usize) -> Self {
        self.max_threads = Some(n.max(1));
        self
    }

    pub fn parallel_min_chunks(mut self, n: usize) -> Self {
        self.parallel_min_chunks = Some(n);
        self
    }
}

fn env_thread_count() -> Option<usize> {
    std::env::var(THREADS_ENV)
        .ok()
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
}

/// Resolve the thread count from a config, falling back to auto-detect.
fn resolve_thread_count(config: &WorldConfig) -> usize {
    let mut threads = config
        .thread_count
        .or_else(env_thread_count)
        .unwrap_or_else(num_cpus::get_physical);
    if let Some(cap) = config.max_threads {
        threads = threads.min(cap);
    }
    threads.max(1)
}

/// The unbounded plane: a sparse map of chunks plus the generation clock.
///
/// All mutation and queries from outside the engine go through here.
pub struct World {
    pub(crate) arena: ChunkArena,
    generation: u64,
    pool: rayon::ThreadPool,
    parallel_min_chunks: usize,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Create a world with explicit configuration.
    pub fn with_config(config: WorldConfig) -> Self {
        let threads = resolve_thread_count(&config);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("chunk-life-{i}"))
            .build()
            .expect("failed to build chunk-life rayon thread pool");

        Self {
            arena: ChunkArena::new(),
            generation: 0,
            pool,
            parallel_min_chunks: config.parallel_min_chunks.unwrap_or(PARALLEL_MIN_CHUNKS),
        }
    }

    pub fn thread_count(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    // ── Chunk table ─────────────────────────────────────────────────────

    pub fn has_chunk_at(&self, coordinate: Coordinate) -> bool {
        self.arena.idx_at(coordinate.chunk_key()).is_some()
    }

    /// Chunk containing `coordinate`, if one exists. Never creates.
    pub fn chunk_at(&self, coordinate: Coordinate) -> Option<ChunkRef<'_>> {
        self.arena
            .chunk_at(coordinate.chunk_key())
            .map(|chunk| ChunkRef::new(self, chunk))
    }

    /// Chunk containing `coordinate`; with `force`, an empty one is created
    /// when absent. A missing chunk without `force` is `None`, not an error.
    pub fn get_chunk_at(&mut self, coordinate: Coordinate, force: bool) -> Option<ChunkMut<'_>> {
        let idx = if force {
            self.force_chunk(coordinate)
        } else {
            self.arena.idx_at(coordinate.chunk_key())?
        };
        Some(ChunkMut::new(self, idx))
    }

    pub fn chunk(&self, idx: ChunkIdx) -> Option<ChunkRef<'_>> {
        self.arena.get(idx).map(|chunk| ChunkRef::new(self, chunk))
    }

    pub fn chunk_mut(&mut self, idx: ChunkIdx) -> Option<ChunkMut<'_>> {
        self.arena.get(idx)?;
        Some(ChunkMut::new(self, idx))
    }

    /// Stored chunks, in slot order.
    pub fn chunks(&self) -> impl Iterator<Item = ChunkRef<'_>> + '_ {
        self.arena.iter().map(move |(_, chunk)| ChunkRef::new(self, chunk))
    }

    /// Store `chunk` under its own key. If the key is already mapped the
    /// existing chunk wins and `chunk` is dropped.
    pub fn register(&mut self, chunk: Chunk) -> ChunkIdx {
        if let Some(existing) = self.arena.idx_at(chunk.key()) {
            return existing;
        }
        let origin = chunk.origin();
        let idx = self.arena.insert_absent(chunk);
        trace!(x = origin.x, y = origin.y, slot = idx.0, "chunk registered");
        idx
    }

    /// Drop a chunk and every cell in it.
    pub fn remove(&mut self, idx: ChunkIdx) -> Option<Chunk> {
        let chunk = self.arena.release(idx)?;
        trace!(
            x = chunk.origin().x,
            y = chunk.origin().y,
            slot = idx.0,
            "chunk released"
        );
        Some(chunk)
    }

    pub fn clear(&mut self) {
        debug!(chunks = self.arena.len(), "world cleared");
        self.arena.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn chunk_count(&self) -> usize {
        self.arena.len()
    }

    #[inline]
    fn force_chunk(&mut self, coordinate: Coordinate) -> ChunkIdx {
        let before = self.arena.len();
        let idx = self.arena.allocate(coordinate);
        if self.arena.len() > before {
            let origin = coordinate.chunk_origin();
            trace!(x = origin.x, y = origin.y, slot = idx.0, "chunk allocated");
        }
        idx
    }

    // ── Cell queries ────────────────────────────────────────────────────

    #[inline]
    fn raw_cell_at(&self, coordinate: Coordinate) -> Option<&Cell> {
        self.arena
            .chunk_at(coordinate.chunk_key())
            .and_then(|chunk| chunk.get(coordinate))
    }

    pub fn has_cell_at(&self, coordinate: Coordinate) -> bool {
        self.raw_cell_at(coordinate).is_some()
    }

    pub fn cell_at(&self, coordinate: Coordinate) -> Option<CellRef<'_>> {
        self.raw_cell_at(coordinate).map(|cell| CellRef::new(self, cell))
    }

    #[inline]
    pub fn is_alive(&self, coordinate: Coordinate) -> bool {
        self.raw_cell_at(coordinate).is_some_and(Cell::is_alive)
    }

    /// Living cells among the 8 positions around `coordinate`.
    pub fn neighbor_count(&self, coordinate: Coordinate) -> u8 {
        coordinate
            .influence_area()
            .into_iter()
            .filter(|&n| self.is_alive(n))
            .count() as u8
    }

    pub fn population(&self) -> u64 {
        self.arena
            .iter()
            .map(|(_, chunk)| chunk.cells().filter(|cell| cell.is_alive()).count() as u64)
            .sum()
    }

    /// Stored cells of any state, placeholders included.
    pub fn cell_count(&self) -> usize {
        self.arena.iter().map(|(_, chunk)| chunk.len()).sum()
    }

    pub fn for_each_live<F: FnMut(i64, i64)>(&self, mut f: F) {
        for (_, chunk) in self.arena.iter() {
            for cell in chunk.cells().filter(|cell| cell.is_alive()) {
                let c = cell.coordinate();
                f(c.x, c.y);
            }
        }
    }

    /// Living cells, sorted by `(x, y)`.
    pub fn live_cells(&self) -> Vec<Coordinate> {
        let mut out = Vec::new();
        self.for_each_live(|x, y| out.push(Coordinate::new(x, y)));
        out.sort_unstable();
        out
    }

    /// `(min_x, min_y, max_x, max_y)` over living cells.
    pub fn bounds(&self) -> Option<(i64, i64, i64, i64)> {
        let mut min_x = i64::MAX;
        let mut min_y = i64::MAX;
        let mut max_x = i64::MIN;
        let mut max_y = i64::MIN;
        let mut seen = false;

        self.for_each_live(|x, y| {
            seen = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        });

        seen.then_some((min_x, min_y, max_x, max_y))
    }

    // ── Mutation ────────────────────────────────────────────────────────

    /// Make the cell at `coordinate` alive and populate its influence ring.
    pub fn activate(&mut self, coordinate: Coordinate) {
        let idx = self.force_chunk(coordinate);
        self.activate_in(idx, coordinate, true);
    }

    pub fn activate_all<I>(&mut self, coordinates: I)
    where
        I: IntoIterator<Item = Coordinate>,
    {
        for coordinate in coordinates {
            self.activate(coordinate);
        }
    }

    /// Flip a single position.
    ///
    /// A living cell is removed outright. Anything else (nothing, a
    /// placeholder) is replaced by a freshly activated living cell.
    pub fn toggle(&mut self, coordinate: Coordinate) {
        match self.raw_cell_at(coordinate).map(Cell::is_alive) {
            None => self.activate(coordinate),
            Some(false) => {
                self.remove_cell(coordinate);
                self.activate(coordinate);
            }
            Some(true) => {
                self.remove_cell(coordinate);
            }
        }
    }

    /// Delete the cell at `coordinate`. Leaves the chunk in place even if it
    /// becomes empty; the next `update` sweeps it.
    pub fn remove_cell(&mut self, coordinate: Coordinate) -> Option<Cell> {
        let idx = self.arena.idx_at(coordinate.chunk_key())?;
        self.arena.get_mut(idx)?.remove_key(coordinate.relative_key())
    }

    /// Chunk activation starting from chunk `from`. Foreign coordinates are
    /// forwarded to their own chunk, which is created on demand.
    pub(crate) fn activate_in(&mut self, from: ChunkIdx, coordinate: Coordinate, appear: bool) {
        let local = self.arena.get(from).is_some_and(|c| c.owns(coordinate));
        let owner = if local {
            from
        } else {
            self.force_chunk(coordinate)
        };
        let Some(chunk) = self.arena.get_mut(owner) else {
            return;
        };
        chunk.put_empty(coordinate);
        if appear {
            self.appear(owner, coordinate);
        }
    }

    /// Turn the stored cell alive and make sure each of its 8 neighbors holds
    /// a cell that is not about to be swept.
    fn appear(&mut self, owner: ChunkIdx, coordinate: Coordinate) {
        let key = coordinate.relative_key();
        match self.arena.get_mut(owner).and_then(|c| c.get_by_key_mut(key)) {
            Some(cell) => cell.state = CellState::Alive,
            None => return,
        }

        for neighbor in coordinate.influence_area() {
            let keep = self
                .raw_cell_at(neighbor)
                .is_some_and(|cell| cell.next_state() != CellState::Dying);
            if !keep {
                self.activate_in(owner, neighbor, false);
            }
        }
    }

    // ── Generation update ───────────────────────────────────────────────

    /// Neighbor counts for every cell of one chunk. Reads only.
    pub(crate) fn neighbor_counts(&self, idx: ChunkIdx) -> Vec<(GridKey, u8)> {
        let Some(chunk) = self.arena.get(idx) else {
            return Vec::new();
        };
        chunk
            .cells()
            .map(|cell| {
                let c = cell.coordinate();
                (c.relative_key(), self.neighbor_count(c))
            })
            .collect()
    }

    pub(crate) fn apply_neighbor_counts(&mut self, idx: ChunkIdx, counts: &[(GridKey, u8)]) {
        let Some(chunk) = self.arena.get_mut(idx) else {
            return;
        };
        for &(key, neighbors) in counts {
            if let Some(cell) = chunk.get_by_key_mut(key) {
                cell.update(neighbors);
            }
        }
    }

    /// Commit every cell of one chunk: living cells re-run ring maintenance,
    /// dying cells are swept.
    ///
    /// Keys are snapshotted first. Each cell is looked up again at commit
    /// time, since ring maintenance from an earlier cell may have replaced it
    /// with a fresh placeholder.
    pub(crate) fn commit_chunk(&mut self, idx: ChunkIdx) {
        let Some(keys) = self.arena.get(idx).map(Chunk::keys) else {
            return;
        };
        for key in keys {
            let Some(chunk) = self.arena.get_mut(idx) else {
                return;
            };
            let Some(cell) = chunk.get_by_key_mut(key) else {
                continue;
            };
            match cell.commit() {
                CellState::Alive => {
                    let coordinate = cell.coordinate();
                    self.appear(idx, coordinate);
                }
                CellState::Dying => {
                    chunk.remove_key(key);
                }
                CellState::Empty => {}
            }
        }
    }

    /// Advance exactly one generation.
    ///
    /// Two passes over the chunks that exist at tick start: compute every
    /// `next_state` from the current generation, then commit. Chunks created
    /// by ring maintenance during the commit are not visited until the next
    /// tick. Chunks left empty by their commit are released.
    pub fn update(&mut self) {
        let start = Instant::now();
        let snapshot = self.arena.occupied_indices();

        let counts = self.compute_neighbor_counts(&snapshot);
        for (&idx, chunk_counts) in snapshot.iter().zip(&counts) {
            self.apply_neighbor_counts(idx, chunk_counts);
        }
        drop(counts);

        let mut released = 0usize;
        for &idx in &snapshot {
            self.commit_chunk(idx);
            if self.arena.get(idx).is_some_and(Chunk::is_empty) {
                self.remove(idx);
                released += 1;
            }
        }

        self.generation += 1;
        debug!(
            generation = self.generation,
            visited = snapshot.len(),
            released,
            chunks = self.arena.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "generation committed"
        );
    }

    pub fn update_n(&mut self, n: u64) {
        for _ in 0..n {
            self.update();
        }
    }

    fn compute_neighbor_counts(&self, snapshot: &[ChunkIdx]) -> Vec<Vec<(GridKey, u8)>> {
        let run_parallel =
            snapshot.len() >= self.parallel_min_chunks && self.pool.current_num_threads() > 1;
        if run_parallel {
            self.pool.install(|| {
                snapshot
                    .par_iter()
                    .map(|&idx| self.neighbor_counts(idx))
                    .collect()
            })
        } else {
            snapshot.iter().map(|&idx| self.neighbor_counts(idx)).collect()
        }
    }
}
