//! Packed-unit wire format and the encode/decode entry points.

use crate::error::CodecError;
use crate::symbol::{SymbolTable, MAX_SYMBOLS};
use wend_core::{CostGrid, REGION_AREA};

/// Sentinel unit introducing a frozen symbol-table header.
///
/// Body units are `cell_index * 22 + symbol`, at most
/// `2499 * 22 + 21 = 54_999`, so the sentinel can never collide with a
/// real unit.
pub const SNAPSHOT_MARK: u16 = u16::MAX;

/// A compressed cost grid: an optional frozen header followed by one
/// unit per non-zero cell.
///
/// Wire layout (each element one `u16`):
///
/// ```text
/// [SNAPSHOT_MARK, count, value_0, .., value_{count-1}]   (only if frozen)
/// [unit_0, unit_1, ..]                                    one per cell
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompressedGrid {
    units: Vec<u16>,
}

impl CompressedGrid {
    /// The raw unit sequence.
    pub fn as_units(&self) -> &[u16] {
        &self.units
    }

    /// Construct from raw units (e.g. read back from storage).
    pub fn from_units(units: Vec<u16>) -> Self {
        Self { units }
    }

    /// Total units including any header.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether there are no units at all (an all-default grid encoded
    /// without freezing).
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Whether a frozen symbol-table header is present.
    pub fn is_frozen(&self) -> bool {
        self.units.first() == Some(&SNAPSHOT_MARK)
    }
}

/// Result of one encode pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Encoded {
    /// The compressed form.
    pub compressed: CompressedGrid,
    /// Cells whose cost could not be interned ([`CodecError::SymbolTableFull`])
    /// and were left out of the encoding. Those cells decode as baseline.
    pub skipped_cells: u32,
}

/// Encode a grid against `table`, interning new cost values as needed.
///
/// With `freeze`, the table state at the end of the pass is prepended as
/// a header so decoding never depends on the live table again. Output
/// length is proportional to the number of non-zero cells only.
pub fn encode(grid: &CostGrid, table: &mut SymbolTable, freeze: bool) -> Encoded {
    let mut body: Vec<u16> = Vec::with_capacity(grid.nonzero_count());
    let mut skipped_cells = 0u32;

    for (index, cost) in grid.iter_nonzero() {
        // intern only fails when the table is full; the cell is then
        // left unencoded and decodes as baseline.
        match table.intern(cost) {
            Ok(symbol) => body.push(index as u16 * MAX_SYMBOLS as u16 + symbol as u16),
            Err(_) => skipped_cells += 1,
        }
    }

    let units = if freeze {
        let snapshot = table.snapshot();
        let mut units = Vec::with_capacity(2 + snapshot.len() + body.len());
        units.push(SNAPSHOT_MARK);
        units.push(snapshot.len() as u16);
        units.extend(snapshot.iter().map(|&v| v as u16));
        units.extend_from_slice(&body);
        units
    } else {
        body
    };

    Encoded {
        compressed: CompressedGrid { units },
        skipped_cells,
    }
}

/// Decode a compressed grid.
///
/// A frozen header takes precedence over the live `table`. Fails on a
/// malformed header, a unit outside the region, or a symbol the
/// decoding table does not hold.
pub fn decode(compressed: &CompressedGrid, table: &SymbolTable) -> Result<CostGrid, CodecError> {
    let units = compressed.as_units();

    let (decode_table, body): (SymbolTable, &[u16]) = if compressed.is_frozen() {
        let count = *units.get(1).ok_or(CodecError::TruncatedHeader {
            expected: 1,
            actual: 0,
        })? as usize;
        if count > MAX_SYMBOLS {
            return Err(CodecError::OversizedTable { len: count });
        }
        let end = 2 + count;
        if units.len() < end {
            return Err(CodecError::TruncatedHeader {
                expected: count,
                actual: units.len() - 2,
            });
        }
        let values: Vec<u8> = units[2..end].iter().map(|&u| u as u8).collect();
        (SymbolTable::from_snapshot(&values)?, &units[end..])
    } else {
        (table.clone(), units)
    };

    let mut grid = CostGrid::new();
    for &unit in body {
        let index = (unit / MAX_SYMBOLS as u16) as usize;
        let symbol = (unit % MAX_SYMBOLS as u16) as u8;
        if index >= REGION_AREA {
            return Err(CodecError::CorruptUnit { unit });
        }
        let cost = decode_table
            .cost_of(symbol)
            .ok_or(CodecError::UnknownSymbol { symbol })?;
        grid.set_at(index, cost);
    }
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with(cells: &[(u8, u8, u8)]) -> CostGrid {
        let mut grid = CostGrid::new();
        for &(x, y, cost) in cells {
            grid.set(x, y, cost).unwrap();
        }
        grid
    }

    #[test]
    fn two_structures_two_units() {
        // One structure at (10,10) cost 5, one at (10,11) cost 255.
        let grid = grid_with(&[(10, 10, 5), (10, 11, 255)]);
        let mut table = SymbolTable::new();
        let encoded = encode(&grid, &mut table, false);

        assert_eq!(encoded.compressed.len(), 2);
        assert_eq!(encoded.skipped_cells, 0);
        // Units carry index * 22 + symbol with indices 510 and 511.
        assert_eq!(encoded.compressed.as_units()[0], 510 * 22);
        assert_eq!(encoded.compressed.as_units()[1], 511 * 22 + 1);

        let back = decode(&encoded.compressed, &table).unwrap();
        assert_eq!(back, grid);
    }

    #[test]
    fn empty_grid_encodes_to_empty_body() {
        let grid = CostGrid::new();
        let mut table = SymbolTable::new();
        let encoded = encode(&grid, &mut table, false);
        assert!(encoded.compressed.is_empty());
        assert_eq!(decode(&encoded.compressed, &table).unwrap(), grid);
    }

    #[test]
    fn reencode_is_byte_identical_with_stable_table() {
        let grid = grid_with(&[(0, 0, 7), (49, 49, 9), (3, 4, 7)]);
        let mut table = SymbolTable::new();
        let first = encode(&grid, &mut table, false);
        let decoded = decode(&first.compressed, &table).unwrap();
        let second = encode(&decoded, &mut table, false);
        assert_eq!(first.compressed, second.compressed);
    }

    #[test]
    fn frozen_header_survives_table_reset() {
        let grid = grid_with(&[(1, 1, 30), (2, 2, 40)]);
        let mut table = SymbolTable::new();
        let encoded = encode(&grid, &mut table, true);
        assert!(encoded.compressed.is_frozen());

        // Live table diverges completely; the frozen copy still decodes.
        table.reset();
        table.intern(99).unwrap();
        let back = decode(&encoded.compressed, &table).unwrap();
        assert_eq!(back, grid);
    }

    #[test]
    fn non_frozen_decode_follows_live_table_growth() {
        let grid = grid_with(&[(5, 5, 11)]);
        let mut table = SymbolTable::new();
        let encoded = encode(&grid, &mut table, false);

        // Later activity appends new symbols; earlier symbols keep their
        // positions, so the old encoding still decodes correctly.
        table.intern(77).unwrap();
        table.intern(78).unwrap();
        let back = decode(&encoded.compressed, &table).unwrap();
        assert_eq!(back, grid);
    }

    #[test]
    fn overflow_cost_is_skipped_and_counted() {
        let mut table = SymbolTable::new();
        for cost in 1..=22u8 {
            table.intern(cost).unwrap();
        }
        let grid = grid_with(&[(0, 0, 1), (0, 1, 100), (0, 2, 101)]);
        let encoded = encode(&grid, &mut table, false);
        assert_eq!(encoded.skipped_cells, 2);
        assert_eq!(encoded.compressed.len(), 1);

        // The skipped cells decode as baseline.
        let back = decode(&encoded.compressed, &table).unwrap();
        assert_eq!(back.get(0, 0).unwrap(), 1);
        assert_eq!(back.get(0, 1).unwrap(), 0);
    }

    #[test]
    fn decode_rejects_unknown_symbol() {
        let compressed = CompressedGrid::from_units(vec![5]);
        let table = SymbolTable::new();
        assert_eq!(
            decode(&compressed, &table),
            Err(CodecError::UnknownSymbol { symbol: 5 })
        );
    }

    #[test]
    fn decode_rejects_corrupt_unit() {
        let mut table = SymbolTable::new();
        table.intern(1).unwrap();
        // Index 2978 is far outside the region.
        let compressed = CompressedGrid::from_units(vec![65_516]);
        assert!(matches!(
            decode(&compressed, &table),
            Err(CodecError::CorruptUnit { .. })
        ));
    }

    #[test]
    fn decode_rejects_truncated_header() {
        let compressed = CompressedGrid::from_units(vec![SNAPSHOT_MARK, 3, 10]);
        let table = SymbolTable::new();
        assert_eq!(
            decode(&compressed, &table),
            Err(CodecError::TruncatedHeader {
                expected: 3,
                actual: 1
            })
        );
    }
}
