//! Positions, directions, and serialized move sequences.

use crate::error::ParseError;
use crate::grid::REGION_DIM;
use crate::id::RegionId;
use smallvec::SmallVec;
use std::fmt;

/// One of the eight movement headings, with the wire codes `1`–`8`.
///
/// Clockwise from north. The code is what appears in serialized move
/// sequences, one digit per step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    /// y - 1.
    North = 1,
    /// x + 1, y - 1.
    NorthEast = 2,
    /// x + 1.
    East = 3,
    /// x + 1, y + 1.
    SouthEast = 4,
    /// y + 1.
    South = 5,
    /// x - 1, y + 1.
    SouthWest = 6,
    /// x - 1.
    West = 7,
    /// x - 1, y - 1.
    NorthWest = 8,
}

impl Direction {
    /// All eight directions in wire-code order.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// The `(dx, dy)` cell offset of this heading.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::NorthEast => (1, -1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, 1),
            Direction::South => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, -1),
        }
    }

    /// Wire code, `1`–`8`.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Decode a wire code.
    pub fn from_code(code: u8) -> Option<Direction> {
        Direction::ALL.get(code.checked_sub(1)? as usize).copied()
    }

    /// The heading matching a unit cell offset, if one exists.
    pub fn from_offset(dx: i32, dy: i32) -> Option<Direction> {
        Direction::ALL.into_iter().find(|d| d.offset() == (dx, dy))
    }

    /// The reverse heading.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::NorthEast => Direction::SouthWest,
            Direction::East => Direction::West,
            Direction::SouthEast => Direction::NorthWest,
            Direction::South => Direction::North,
            Direction::SouthWest => Direction::NorthEast,
            Direction::West => Direction::East,
            Direction::NorthWest => Direction::SouthEast,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A cell position: region plus in-region cell coordinates.
///
/// Cell coordinates are always in `[0, REGION_DIM)`; constructors and
/// movement helpers preserve that invariant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    /// The containing region.
    pub region: RegionId,
    /// Cell x within the region (east positive).
    pub x: u8,
    /// Cell y within the region (south positive).
    pub y: u8,
}

impl Position {
    /// Construct from region and in-region cell coordinates.
    ///
    /// Cell coordinates must be in `[0, REGION_DIM)`; debug builds
    /// assert this.
    pub fn new(region: RegionId, x: u8, y: u8) -> Self {
        debug_assert!((x as usize) < REGION_DIM && (y as usize) < REGION_DIM);
        Self { region, x, y }
    }

    /// Absolute world cell coordinates (region-spanning).
    pub fn to_world(self) -> (i32, i32) {
        (
            self.region.x as i32 * REGION_DIM as i32 + self.x as i32,
            self.region.y as i32 * REGION_DIM as i32 + self.y as i32,
        )
    }

    /// Rebuild a position from absolute world cell coordinates.
    pub fn from_world(wx: i32, wy: i32) -> Self {
        let dim = REGION_DIM as i32;
        let region = RegionId::new(wx.div_euclid(dim) as i16, wy.div_euclid(dim) as i16);
        Self {
            region,
            x: wx.rem_euclid(dim) as u8,
            y: wy.rem_euclid(dim) as u8,
        }
    }

    /// The position one step along `dir`, crossing region edges freely.
    pub fn shift(self, dir: Direction) -> Position {
        let (dx, dy) = dir.offset();
        let (wx, wy) = self.to_world();
        Position::from_world(wx + dx, wy + dy)
    }

    /// The position one step along `dir` if it stays inside this region,
    /// `None` if the step would cross a region edge.
    pub fn step_within(self, dir: Direction) -> Option<Position> {
        let (dx, dy) = dir.offset();
        let nx = self.x as i32 + dx;
        let ny = self.y as i32 + dy;
        if nx < 0 || nx >= REGION_DIM as i32 || ny < 0 || ny >= REGION_DIM as i32 {
            return None;
        }
        Some(Position::new(self.region, nx as u8, ny as u8))
    }

    /// Chebyshev distance in cells, spanning regions.
    pub fn distance(self, other: Position) -> u32 {
        let (ax, ay) = self.to_world();
        let (bx, by) = other.to_world();
        (ax - bx).unsigned_abs().max((ay - by).unsigned_abs())
    }

    /// The heading from this cell to an adjacent cell (possibly across a
    /// region edge), or `None` if the cells are not adjacent.
    pub fn direction_to(self, other: Position) -> Option<Direction> {
        let (ax, ay) = self.to_world();
        let (bx, by) = other.to_world();
        Direction::from_offset(bx - ax, by - ay)
    }

    /// Pack into the compact fixed-width form.
    pub fn packed(self) -> PackedPos {
        PackedPos::pack(self)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{},{}", self.region, self.x, self.y)
    }
}

/// Bias added to region coordinates in the packed form.
const PACK_BIAS: i32 = 512;

/// Fixed-width 32-bit encoding of a [`Position`].
///
/// Layout, high to low: 10 bits biased region x, 10 bits biased region y,
/// 6 bits cell x, 6 bits cell y. Supports region coordinates in
/// `[-512, 511]`; coordinates outside that band are masked into it, so
/// hosts with larger worlds must not use the packed form for identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackedPos(pub u32);

impl PackedPos {
    /// Pack a position.
    pub fn pack(pos: Position) -> Self {
        let rx = (pos.region.x as i32 + PACK_BIAS) as u32 & 0x3FF;
        let ry = (pos.region.y as i32 + PACK_BIAS) as u32 & 0x3FF;
        Self(rx << 22 | ry << 12 | (pos.x as u32) << 6 | pos.y as u32)
    }

    /// Unpack back into a full position.
    pub fn unpack(self) -> Position {
        let rx = (self.0 >> 22 & 0x3FF) as i32 - PACK_BIAS;
        let ry = (self.0 >> 12 & 0x3FF) as i32 - PACK_BIAS;
        Position {
            region: RegionId::new(rx as i16, ry as i16),
            x: (self.0 >> 6 & 0x3F) as u8,
            y: (self.0 & 0x3F) as u8,
        }
    }
}

impl From<Position> for PackedPos {
    fn from(pos: Position) -> Self {
        Self::pack(pos)
    }
}

impl fmt::Display for PackedPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.unpack())
    }
}

/// Inline capacity of a move sequence before spilling to the heap.
const MOVES_INLINE: usize = 32;

/// An ordered sequence of direction codes consumed front-to-back, one
/// per simulation step.
///
/// Stored in serialized form (raw wire codes) with a consumption cursor,
/// so caching and persistence are a direct copy of the remaining codes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MoveSeq {
    codes: SmallVec<[u8; MOVES_INLINE]>,
    cursor: usize,
}

impl MoveSeq {
    /// An empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the heading deltas of an ordered cell sequence.
    ///
    /// `cells` is a search result: the cells to visit after `start`, in
    /// order. Building stops at the first pair that is not adjacent
    /// (a truncated best-effort path is still followable; a gapped one
    /// is not).
    pub fn from_path(start: Position, cells: &[Position]) -> Self {
        let mut codes = SmallVec::new();
        let mut prev = start;
        for &cell in cells {
            match prev.direction_to(cell) {
                Some(dir) => codes.push(dir.code()),
                None => break,
            }
            prev = cell;
        }
        Self { codes, cursor: 0 }
    }

    /// Parse a digit string of wire codes.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let mut codes = SmallVec::new();
        for (offset, byte) in s.bytes().enumerate() {
            match byte {
                b'1'..=b'8' => codes.push(byte - b'0'),
                _ => return Err(ParseError::BadMoveCode { offset, byte }),
            }
        }
        Ok(Self { codes, cursor: 0 })
    }

    /// Serialize the remaining (unconsumed) codes as a digit string.
    pub fn serialize(&self) -> String {
        self.codes[self.cursor..]
            .iter()
            .map(|c| (b'0' + c) as char)
            .collect()
    }

    /// The next queued heading, if any.
    pub fn front(&self) -> Option<Direction> {
        self.codes
            .get(self.cursor)
            .and_then(|&c| Direction::from_code(c))
    }

    /// Consume the front heading.
    pub fn pop_front(&mut self) -> Option<Direction> {
        let dir = self.front()?;
        self.cursor += 1;
        Some(dir)
    }

    /// Remaining moves.
    pub fn len(&self) -> usize {
        self.codes.len() - self.cursor
    }

    /// Whether no moves remain.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for MoveSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.serialize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(x: i16, y: i16) -> RegionId {
        RegionId::new(x, y)
    }

    #[test]
    fn direction_codes_round_trip() {
        for dir in Direction::ALL {
            assert_eq!(Direction::from_code(dir.code()), Some(dir));
        }
        assert_eq!(Direction::from_code(0), None);
        assert_eq!(Direction::from_code(9), None);
    }

    #[test]
    fn direction_offsets_are_units() {
        for dir in Direction::ALL {
            let (dx, dy) = dir.offset();
            assert!(dx.abs() <= 1 && dy.abs() <= 1 && (dx, dy) != (0, 0));
            assert_eq!(Direction::from_offset(dx, dy), Some(dir));
            let (ox, oy) = dir.opposite().offset();
            assert_eq!((ox, oy), (-dx, -dy));
        }
    }

    #[test]
    fn position_world_round_trip() {
        for pos in [
            Position::new(region(0, 0), 0, 0),
            Position::new(region(-1, 2), 49, 0),
            Position::new(region(3, -4), 25, 17),
        ] {
            let (wx, wy) = pos.to_world();
            assert_eq!(Position::from_world(wx, wy), pos);
        }
    }

    #[test]
    fn shift_crosses_region_edges() {
        let pos = Position::new(region(0, 0), 49, 10);
        let east = pos.shift(Direction::East);
        assert_eq!(east, Position::new(region(1, 0), 0, 10));
        assert_eq!(pos.step_within(Direction::East), None);
        assert_eq!(
            pos.step_within(Direction::North),
            Some(Position::new(region(0, 0), 49, 9))
        );
    }

    #[test]
    fn direction_to_adjacent_cells() {
        let pos = Position::new(region(0, 0), 10, 10);
        assert_eq!(
            pos.direction_to(Position::new(region(0, 0), 11, 9)),
            Some(Direction::NorthEast)
        );
        assert_eq!(pos.direction_to(Position::new(region(0, 0), 13, 10)), None);
        // Across a region edge.
        let edge = Position::new(region(0, 0), 49, 10);
        assert_eq!(
            edge.direction_to(Position::new(region(1, 0), 0, 10)),
            Some(Direction::East)
        );
    }

    #[test]
    fn packed_pos_round_trip() {
        for pos in [
            Position::new(region(0, 0), 0, 0),
            Position::new(region(-512, 511), 49, 49),
            Position::new(region(17, -3), 1, 48),
        ] {
            assert_eq!(pos.packed().unpack(), pos);
        }
    }

    #[test]
    fn move_seq_from_path_and_consumption() {
        let start = Position::new(region(0, 0), 5, 5);
        let cells = [
            Position::new(region(0, 0), 6, 5),
            Position::new(region(0, 0), 7, 6),
            Position::new(region(0, 0), 7, 7),
        ];
        let mut seq = MoveSeq::from_path(start, &cells);
        assert_eq!(seq.serialize(), "345");
        assert_eq!(seq.pop_front(), Some(Direction::East));
        assert_eq!(seq.serialize(), "45");
        assert_eq!(seq.front(), Some(Direction::SouthEast));
        assert_eq!(seq.len(), 2);
    }

    #[test]
    fn move_seq_truncates_at_gap() {
        let start = Position::new(region(0, 0), 5, 5);
        let cells = [
            Position::new(region(0, 0), 6, 5),
            Position::new(region(0, 0), 20, 20),
            Position::new(region(0, 0), 21, 20),
        ];
        let seq = MoveSeq::from_path(start, &cells);
        assert_eq!(seq.len(), 1);
    }

    #[test]
    fn move_seq_parse_round_trip() {
        let seq = MoveSeq::parse("18273645").unwrap();
        assert_eq!(seq.serialize(), "18273645");
        assert!(MoveSeq::parse("190").is_err());
        assert!(MoveSeq::parse("").unwrap().is_empty());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn packed_pos_round_trips_in_band(
                rx in -512i16..=511,
                ry in -512i16..=511,
                x in 0u8..50,
                y in 0u8..50,
            ) {
                let pos = Position::new(RegionId::new(rx, ry), x, y);
                prop_assert_eq!(pos.packed().unpack(), pos);
            }

            #[test]
            fn world_coordinates_round_trip(wx in -25_000i32..25_000, wy in -25_000i32..25_000) {
                let pos = Position::from_world(wx, wy);
                prop_assert_eq!(pos.to_world(), (wx, wy));
            }

            #[test]
            fn shift_is_undone_by_opposite(
                rx in -100i16..=100,
                ry in -100i16..=100,
                x in 0u8..50,
                y in 0u8..50,
                code in 1u8..=8,
            ) {
                let dir = Direction::from_code(code).unwrap();
                let pos = Position::new(RegionId::new(rx, ry), x, y);
                prop_assert_eq!(pos.shift(dir).shift(dir.opposite()), pos);
            }
        }
    }
}
