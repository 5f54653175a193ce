//! Plane addressing for the chunked engine.
//!
//! Two value types with deliberately different roles:
//! - `Coordinate`: an absolute position on the plane, used for arithmetic.
//! - `GridKey`: an opaque map key, derived from a `Coordinate` through one of
//!   three projections (absolute, chunk-relative, chunk index).
//!
//! Chunk derivation uses floor semantics (`div_euclid` / `rem_euclid`) so that
//! negative coordinates land in the mathematically consistent chunk.

use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasherDefault, Hash, Hasher};

/// Side length of a chunk, in cells.
pub const CHUNK_SIZE: i64 = 16;

/// Offsets of the 8 neighbors of a cell, row by row from the top.
#[rustfmt::skip]
pub const INFLUENCE_OFFSETS: [(i64, i64); 8] = [
    (-1, 1), (0, 1), (1, 1),
    (-1, 0),         (1, 0),
    (-1, -1), (0, -1), (1, -1),
];

/// An absolute signed position on the plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    pub x: i64,
    pub y: i64,
}

impl Coordinate {
    #[inline]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// This coordinate translated by `(dx, dy)`.
    #[inline]
    pub const fn offset(self, dx: i64, dy: i64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Position inside the owning chunk, each axis in `0..CHUNK_SIZE`.
    #[inline]
    pub const fn relative(self) -> (i64, i64) {
        (self.x.rem_euclid(CHUNK_SIZE), self.y.rem_euclid(CHUNK_SIZE))
    }

    /// Index of the owning chunk, in chunk units.
    #[inline]
    pub const fn chunk(self) -> (i64, i64) {
        (self.x.div_euclid(CHUNK_SIZE), self.y.div_euclid(CHUNK_SIZE))
    }

    /// Absolute position of the owning chunk's origin (lower-left corner).
    #[inline]
    pub const fn chunk_origin(self) -> Coordinate {
        let (rx, ry) = self.relative();
        Coordinate::new(self.x - rx, self.y - ry)
    }

    #[inline]
    pub const fn absolute_key(self) -> GridKey {
        GridKey::new(self.x, self.y)
    }

    #[inline]
    pub const fn relative_key(self) -> GridKey {
        let (rx, ry) = self.relative();
        GridKey::new(rx, ry)
    }

    #[inline]
    pub const fn chunk_key(self) -> GridKey {
        let (cx, cy) = self.chunk();
        GridKey::new(cx, cy)
    }

    #[inline]
    pub const fn is_in_same_chunk(self, other: Coordinate) -> bool {
        let (ax, ay) = self.chunk();
        let (bx, by) = other.chunk();
        ax == bx && ay == by
    }

    /// The 8 coordinates surrounding this one.
    #[inline]
    pub fn influence_area(self) -> [Coordinate; 8] {
        INFLUENCE_OFFSETS.map(|(dx, dy)| self.offset(dx, dy))
    }
}

impl From<(i64, i64)> for Coordinate {
    #[inline]
    fn from((x, y): (i64, i64)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.x, self.y)
    }
}

/// Opaque 2D key. Equality and hashing are pure value equality.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridKey {
    x: i64,
    y: i64,
}

impl GridKey {
    #[inline]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

// Separate multipliers per axis; a single-constant sequential hash collides
// on grid-aligned keys.
const MX: u64 = 0x517c_c1b7_2722_0a95;
const MY: u64 = 0x6c62_272e_07bb_0142;

#[inline(always)]
pub(crate) fn grid_hash(x: i64, y: i64) -> u64 {
    let h = (x as u64).wrapping_mul(MX) ^ (y as u64).wrapping_mul(MY).rotate_right(31);
    h ^ (h >> 29)
}

impl Hash for GridKey {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(grid_hash(self.x, self.y));
    }
}

/// Pass-through hasher for keys that pre-mix themselves (`GridKey`).
#[derive(Clone, Copy, Default)]
pub struct GridHasher(u64);

impl Hasher for GridHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.0
    }

    #[inline]
    fn write_u64(&mut self, value: u64) {
        self.0 = self.0.rotate_left(5) ^ value;
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.0 = (self.0.rotate_left(5) ^ u64::from(byte)).wrapping_mul(MX);
        }
    }
}

pub type GridMap<V> = HashMap<GridKey, V, BuildHasherDefault<GridHasher>>;

#[cfg(test)]
mod tests {
    use super::{CHUNK_SIZE, Coordinate, GridKey, GridMap};

    #[test]
    fn chunk_math_uses_floor_division() {
        let c = Coordinate::new(50, -25);
        assert_eq!(c.relative(), (2, 7));
        assert_eq!(c.chunk(), (3, -2));
        assert_eq!(c.chunk_origin(), Coordinate::new(48, -32));
        assert_eq!(c.relative_key(), GridKey::new(2, 7));
        assert_eq!(c.chunk_key(), GridKey::new(3, -2));
        assert_eq!(c.absolute_key(), GridKey::new(50, -25));
    }

    #[test]
    fn negative_unit_coordinate_lands_in_previous_chunk() {
        let c = Coordinate::new(-1, -1);
        assert_eq!(c.relative(), (CHUNK_SIZE - 1, CHUNK_SIZE - 1));
        assert_eq!(c.chunk(), (-1, -1));
        assert_eq!(c.chunk_origin(), Coordinate::new(-CHUNK_SIZE, -CHUNK_SIZE));
        assert!(!c.is_in_same_chunk(Coordinate::new(0, 0)));
        assert!(c.is_in_same_chunk(Coordinate::new(-16, -16)));
    }

    #[test]
    fn chunk_origin_is_stable() {
        for x in -40..40 {
            for y in [-33, -17, -16, -1, 0, 15, 16, 31] {
                let c = Coordinate::new(x, y);
                let origin = c.chunk_origin();
                assert_eq!(origin.chunk_origin(), origin);
                assert_eq!(origin.chunk(), c.chunk());
                assert_eq!(origin.relative(), (0, 0));
            }
        }
    }

    #[test]
    fn influence_area_is_the_eight_neighbors() {
        let mut area = Coordinate::new(5, 5).influence_area().to_vec();
        area.sort();
        let mut expected = vec![
            Coordinate::new(4, 6),
            Coordinate::new(5, 6),
            Coordinate::new(6, 6),
            Coordinate::new(4, 5),
            Coordinate::new(6, 5),
            Coordinate::new(4, 4),
            Coordinate::new(5, 4),
            Coordinate::new(6, 4),
        ];
        expected.sort();
        assert_eq!(area, expected);
    }

    #[test]
    fn display_matches_pattern_line_format() {
        assert_eq!(Coordinate::new(-3, 12).to_string(), "-3, 12");
    }

    #[test]
    fn grid_map_keys_by_value() {
        let mut map: GridMap<u32> = GridMap::default();
        for x in -64..64 {
            for y in -64..64 {
                map.insert(GridKey::new(x, y), (x * 1000 + y) as u32);
            }
        }
        assert_eq!(map.len(), 128 * 128);
        assert_eq!(map.get(&GridKey::new(-7, 33)), Some(&((-7 * 1000 + 33) as u32)));
        assert_eq!(map.get(&GridKey::new(64, 0)), None);
    }
}
