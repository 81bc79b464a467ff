//! Benchmark fixtures for the wend navigation stack.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use wend_core::{CostGrid, REGION_AREA};

/// Build a grid with `nonzero` populated cells cycling through
/// `palette_size` distinct cost values, spread evenly across the
/// region.
pub fn sparse_grid(nonzero: usize, palette_size: u8) -> CostGrid {
    let mut grid = CostGrid::new();
    let stride = (REGION_AREA / nonzero.max(1)).max(1);
    for i in 0..nonzero {
        let index = (i * stride) % REGION_AREA;
        let cost = 1 + (i as u8 % palette_size);
        grid.set_at(index, cost);
    }
    grid
}
