//! Single-position automaton unit and the B3/S23 transition table.

use super::arena::ChunkIdx;
use super::coord::Coordinate;

/// Tri-state cell value.
///
/// `Empty` is the inert placeholder state kept around living cells so their
/// neighbor counts stay well defined. `Dying` marks a placeholder for removal
/// at the next commit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CellState {
    #[default]
    Empty,
    Alive,
    Dying,
}

/// A cell stored in a chunk's map.
///
/// A map entry exists only for living cells, cells pending removal, or
/// placeholders inside the influence ring of a living cell.
#[derive(Clone, Debug)]
pub struct Cell {
    coordinate: Coordinate,
    chunk: ChunkIdx,
    pub(crate) state: CellState,
    pub(crate) next_state: CellState,
}

impl Cell {
    pub fn new(chunk: ChunkIdx, coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            chunk,
            state: CellState::Empty,
            next_state: CellState::Empty,
        }
    }

    #[inline]
    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    /// Slot of the owning chunk in the world arena.
    #[inline]
    pub fn chunk(&self) -> ChunkIdx {
        self.chunk
    }

    #[inline]
    pub(crate) fn rebind(&mut self, chunk: ChunkIdx) {
        self.chunk = chunk;
    }

    #[inline]
    pub fn state(&self) -> CellState {
        self.state
    }

    #[inline]
    pub fn next_state(&self) -> CellState {
        self.next_state
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.state == CellState::Alive
    }

    /// True once the committed state is `Dying`; such a cell is swept by the commit.
    #[inline]
    pub fn is_dead(&self) -> bool {
        self.state == CellState::Dying
    }

    /// Compute pass for this cell given the number of living neighbors.
    ///
    /// Rules are applied in order; the first match wins. When none applies
    /// (a non-living cell with one neighbor, or four and more), `next_state`
    /// keeps whatever it held before.
    pub fn update(&mut self, neighbors: u8) {
        if let Some(next) = transition(self.state, neighbors) {
            self.next_state = next;
        }
    }

    /// Commit pass: promote `next_state` and report what the commit requires.
    pub(crate) fn commit(&mut self) -> CellState {
        self.state = self.next_state;
        self.state
    }
}

#[inline]
pub fn is_isolated(neighbors: u8) -> bool {
    neighbors < 2
}

#[inline]
pub fn is_overpopulated(neighbors: u8) -> bool {
    neighbors > 3
}

/// Ordered rule table. `None` leaves the pending state untouched.
#[inline]
pub fn transition(state: CellState, neighbors: u8) -> Option<CellState> {
    let alive = state == CellState::Alive;
    if alive && is_isolated(neighbors) {
        Some(CellState::Empty)
    } else if alive && is_overpopulated(neighbors) {
        Some(CellState::Empty)
    } else if neighbors == 3 {
        Some(CellState::Alive)
    } else if neighbors == 2 {
        Some(state)
    } else if !alive && neighbors == 0 {
        Some(CellState::Dying)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{Cell, CellState, is_isolated, is_overpopulated, transition};
    use crate::chunklife::arena::ChunkIdx;
    use crate::chunklife::coord::Coordinate;

    fn cell_with(state: CellState, next_state: CellState) -> Cell {
        let mut cell = Cell::new(ChunkIdx(1), Coordinate::new(0, 0));
        cell.state = state;
        cell.next_state = next_state;
        cell
    }

    #[test]
    fn living_cell_follows_survival_rule() {
        for n in 0..=8u8 {
            let mut cell = cell_with(CellState::Alive, CellState::Alive);
            cell.update(n);
            let expected = if n == 2 || n == 3 {
                CellState::Alive
            } else {
                CellState::Empty
            };
            assert_eq!(cell.next_state(), expected, "alive with {n} neighbors");
        }
    }

    #[test]
    fn placeholder_is_born_kept_or_marked() {
        let mut born = cell_with(CellState::Empty, CellState::Empty);
        born.update(3);
        assert_eq!(born.next_state(), CellState::Alive);

        let mut stasis = cell_with(CellState::Empty, CellState::Alive);
        stasis.update(2);
        assert_eq!(stasis.next_state(), CellState::Empty);

        let mut lonely = cell_with(CellState::Empty, CellState::Empty);
        lonely.update(0);
        assert_eq!(lonely.next_state(), CellState::Dying);
    }

    // Non-living cells with 1 or >= 4 neighbors match no rule and keep the
    // previous pending state, even when it disagrees with plain B3/S23.
    #[test]
    fn unmatched_counts_keep_stale_next_state() {
        for n in [1u8, 4, 5, 6, 7, 8] {
            assert_eq!(transition(CellState::Empty, n), None);
            let mut cell = cell_with(CellState::Empty, CellState::Alive);
            cell.update(n);
            assert_eq!(cell.next_state(), CellState::Alive, "stale kept for n={n}");
        }
    }

    #[test]
    fn commit_promotes_next_state() {
        let mut cell = cell_with(CellState::Alive, CellState::Dying);
        assert_eq!(cell.commit(), CellState::Dying);
        assert!(cell.is_dead());
        assert!(!cell.is_alive());
    }

    #[test]
    fn isolation_and_overpopulation_thresholds() {
        assert!(is_isolated(0));
        assert!(is_isolated(1));
        assert!(!is_isolated(2));
        assert!(!is_overpopulated(3));
        assert!(is_overpopulated(4));
        assert!(is_overpopulated(8));
    }
}
