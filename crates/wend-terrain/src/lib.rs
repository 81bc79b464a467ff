//! Memoized immutable terrain lookup for wend regions.
//!
//! Terrain classification never changes once a region is loaded, so the
//! oracle builds each region's [`TerrainMask`] exactly once and shares
//! it read-only for the rest of the process lifetime. There is no
//! eviction.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

use indexmap::IndexMap;
use std::rc::Rc;
use wend_core::{GridError, RegionId, TerrainMask, WorldQuery, REGION_DIM};

/// Lazily-memoized read-only terrain lookup.
///
/// The only side effect of any query is populating the memo.
#[derive(Debug, Default)]
pub struct TerrainOracle {
    memo: IndexMap<RegionId, Rc<TerrainMask>>,
}

impl TerrainOracle {
    /// An oracle with an empty memo.
    pub fn new() -> Self {
        Self::default()
    }

    /// The terrain mask for `region`, building and memoizing it on
    /// first access.
    pub fn mask(&mut self, world: &dyn WorldQuery, region: RegionId) -> Rc<TerrainMask> {
        self.memo
            .entry(region)
            .or_insert_with(|| Rc::new(world.terrain_mask(region)))
            .clone()
    }

    /// Whether cell `(x, y)` of `region` is terrain-obstructed.
    ///
    /// Fails with [`GridError::InvalidCoordinate`] for coordinates
    /// outside `[0, REGION_DIM)`.
    pub fn is_obstructed(
        &mut self,
        world: &dyn WorldQuery,
        region: RegionId,
        x: i32,
        y: i32,
    ) -> Result<bool, GridError> {
        if x < 0 || x >= REGION_DIM as i32 || y < 0 || y >= REGION_DIM as i32 {
            return Err(GridError::InvalidCoordinate { x, y });
        }
        self.mask(world, region).is_obstructed(x as u8, y as u8)
    }

    /// Number of regions memoized so far.
    pub fn cached_regions(&self) -> usize {
        self.memo.len()
    }
}
