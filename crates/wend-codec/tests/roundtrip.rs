//! Property tests for the codec wire format.

use proptest::prelude::*;
use wend_codec::{decode, encode, SymbolTable};
use wend_core::{CostGrid, REGION_AREA};

/// A sparse grid whose costs are drawn from a palette of at most 22
/// distinct non-zero values, so every cell is encodable.
fn sparse_grid() -> impl Strategy<Value = CostGrid> {
    (
        proptest::collection::hash_set(1u8..=255, 1..=22),
        proptest::collection::vec((0usize..REGION_AREA, any::<prop::sample::Index>()), 0..300),
    )
        .prop_map(|(palette, cells)| {
            let palette: Vec<u8> = palette.into_iter().collect();
            let mut grid = CostGrid::new();
            for (index, pick) in cells {
                grid.set_at(index, palette[pick.index(palette.len())]);
            }
            grid
        })
}

proptest! {
    #[test]
    fn round_trip_restores_every_cell(grid in sparse_grid()) {
        let mut table = SymbolTable::new();
        let encoded = encode(&grid, &mut table, false);
        prop_assert_eq!(encoded.skipped_cells, 0);
        let back = decode(&encoded.compressed, &table).unwrap();
        prop_assert_eq!(back, grid);
    }

    #[test]
    fn frozen_round_trip_ignores_live_table(grid in sparse_grid()) {
        let mut table = SymbolTable::new();
        let encoded = encode(&grid, &mut table, true);
        // Decode against a table that never saw these costs.
        let back = decode(&encoded.compressed, &SymbolTable::new()).unwrap();
        prop_assert_eq!(back, grid);
    }

    #[test]
    fn encoded_length_tracks_nonzero_cells(grid in sparse_grid()) {
        let mut table = SymbolTable::new();
        let encoded = encode(&grid, &mut table, false);
        prop_assert_eq!(encoded.compressed.len(), grid.nonzero_count());
    }

    #[test]
    fn reencode_after_decode_is_identical(grid in sparse_grid()) {
        let mut table = SymbolTable::new();
        let first = encode(&grid, &mut table, false);
        let decoded = decode(&first.compressed, &table).unwrap();
        let second = encode(&decoded, &mut table, false);
        prop_assert_eq!(first.compressed, second.compressed);
    }
}
