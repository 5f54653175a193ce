//! Chunk arena: slot storage plus a key index.
//!
//! Chunks are addressed by `ChunkIdx`, a plain slot number. Cells refer to
//! their owner through this index instead of a pointer, so releasing a chunk
//! is a slot write and never a cycle to break. Released slots are recycled
//! through a free list.

use super::chunk::Chunk;
use super::coord::{Coordinate, GridKey, GridMap};

const INITIAL_CHUNK_CAPACITY: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkIdx(pub u32);

impl ChunkIdx {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

pub struct ChunkArena {
    slots: Vec<Option<Chunk>>,
    key_to_idx: GridMap<ChunkIdx>,
    free_list: Vec<ChunkIdx>,
}

impl Default for ChunkArena {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkArena {
    pub fn new() -> Self {
        let mut key_to_idx = GridMap::default();
        key_to_idx.reserve(INITIAL_CHUNK_CAPACITY);
        Self {
            slots: Vec::with_capacity(INITIAL_CHUNK_CAPACITY),
            key_to_idx,
            free_list: Vec::new(),
        }
    }

    /// Number of live chunks.
    #[inline]
    pub fn len(&self) -> usize {
        self.key_to_idx.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.key_to_idx.is_empty()
    }

    #[inline(always)]
    pub fn idx_at(&self, key: GridKey) -> Option<ChunkIdx> {
        self.key_to_idx.get(&key).copied()
    }

    #[inline(always)]
    pub fn get(&self, idx: ChunkIdx) -> Option<&Chunk> {
        self.slots.get(idx.index()).and_then(Option::as_ref)
    }

    #[inline(always)]
    pub fn get_mut(&mut self, idx: ChunkIdx) -> Option<&mut Chunk> {
        self.slots.get_mut(idx.index()).and_then(Option::as_mut)
    }

    #[inline]
    pub fn chunk_at(&self, key: GridKey) -> Option<&Chunk> {
        self.idx_at(key).and_then(|idx| self.get(idx))
    }

    #[inline]
    fn allocate_slot(&mut self) -> ChunkIdx {
        if let Some(recycled) = self.free_list.pop() {
            recycled
        } else {
            let idx = ChunkIdx(self.slots.len() as u32);
            self.slots.push(None);
            idx
        }
    }

    /// Store `chunk` under its own key. The key must not be mapped yet.
    pub(crate) fn insert_absent(&mut self, mut chunk: Chunk) -> ChunkIdx {
        let key = chunk.key();
        debug_assert!(self.idx_at(key).is_none());
        let idx = self.allocate_slot();
        chunk.attach(idx);
        self.slots[idx.index()] = Some(chunk);
        self.key_to_idx.insert(key, idx);
        idx
    }

    /// Allocate an empty chunk for the chunk containing `coordinate`.
    pub(crate) fn allocate_absent(&mut self, coordinate: Coordinate) -> ChunkIdx {
        self.insert_absent(Chunk::new(coordinate.chunk_origin()))
    }

    /// Existing chunk containing `coordinate`, or a fresh empty one.
    pub fn allocate(&mut self, coordinate: Coordinate) -> ChunkIdx {
        match self.idx_at(coordinate.chunk_key()) {
            Some(existing) => existing,
            None => self.allocate_absent(coordinate),
        }
    }

    /// Drop the chunk in `idx`, returning it. Releasing a free slot is a no-op.
    pub fn release(&mut self, idx: ChunkIdx) -> Option<Chunk> {
        let chunk = self.slots.get_mut(idx.index())?.take()?;
        self.key_to_idx.remove(&chunk.key());
        self.free_list.push(idx);
        Some(chunk)
    }

    /// Occupied slots in slot order. Owned, so callers may mutate the arena
    /// while walking it.
    pub fn occupied_indices(&self) -> Vec<ChunkIdx> {
        self.iter().map(|(idx, _)| idx).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ChunkIdx, &Chunk)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|chunk| (ChunkIdx(i as u32), chunk)))
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.key_to_idx.clear();
        self.free_list.clear();
    }
}
