//! The two-tier cost cache.

use crate::config::{CacheConfig, ConfigError, CostOverrides, CostRequest};
use crate::metrics::CacheMetrics;
use indexmap::IndexMap;
use std::error::Error;
use std::fmt;
use std::rc::Rc;
use wend_codec::{decode, encode, CodecError, CompressedGrid, SymbolTable};
use wend_core::{
    cell_index, CostGrid, GridError, RegionId, StepId, TerrainMask, WorldQuery, COST_BLOCKED,
};
use wend_terrain::TerrainOracle;

// ── CacheError ─────────────────────────────────────────────────────

/// Errors surfaced by [`CostCache::costs`].
///
/// Both variants are caller/host bugs (bad coordinates, corrupted
/// persisted data), never expected runtime states: an unobservable
/// region is handled by degrading to a terrain-only grid, not an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheError {
    /// A coordinate from the host or the request was out of bounds.
    Grid(GridError),
    /// A durable entry failed to decode.
    Codec(CodecError),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grid(e) => write!(f, "grid: {e}"),
            Self::Codec(e) => write!(f, "codec: {e}"),
        }
    }
}

impl Error for CacheError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Grid(e) => Some(e),
            Self::Codec(e) => Some(e),
        }
    }
}

impl From<GridError> for CacheError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}

impl From<CodecError> for CacheError {
    fn from(e: CodecError) -> Self {
        Self::Codec(e)
    }
}

// ── CostCache ──────────────────────────────────────────────────────

/// Owner of the durable, per-step, and overlay stores plus the codec
/// context and terrain oracle they depend on.
///
/// Single-writer by construction: steps never overlap, so correctness
/// rests on epoch maintenance at each step boundary rather than
/// locking.
pub struct CostCache {
    overrides: CostOverrides,
    config: CacheConfig,
    table: SymbolTable,
    durable: IndexMap<RegionId, CompressedGrid>,
    step: IndexMap<RegionId, Rc<CostGrid>>,
    overlays: IndexMap<RegionId, Rc<CostGrid>>,
    oracle: TerrainOracle,
    epoch: StepId,
    last_sweep: StepId,
    metrics: CacheMetrics,
}

impl CostCache {
    /// Build a cache after validating both configuration tables.
    pub fn new(overrides: CostOverrides, config: CacheConfig) -> Result<Self, ConfigError> {
        overrides.validate()?;
        config.validate()?;
        Ok(Self {
            overrides,
            config,
            table: SymbolTable::new(),
            durable: IndexMap::new(),
            step: IndexMap::new(),
            overlays: IndexMap::new(),
            oracle: TerrainOracle::new(),
            epoch: StepId(0),
            last_sweep: StepId(0),
            metrics: CacheMetrics::default(),
        })
    }

    /// The traversal-cost grid for `region` at step `now`.
    ///
    /// Read-through on all three tiers: within one step, each tier's
    /// entry for a region is computed at most once no matter how many
    /// agents ask. The returned grid is shared and read-only; tracking
    /// requests receive a per-step clone with occupied cells blocked.
    pub fn costs(
        &mut self,
        world: &dyn WorldQuery,
        now: StepId,
        region: RegionId,
        request: &CostRequest,
    ) -> Result<Rc<CostGrid>, CacheError> {
        self.maintain(world, now);
        let shared = self.materialize(world, region, request)?;

        if !request.track_agents {
            return Ok(shared);
        }
        if let Some(overlay) = self.overlays.get(&region) {
            self.metrics.overlay_hits += 1;
            return Ok(Rc::clone(overlay));
        }
        let mut grid = (*shared).clone();
        for (x, y) in world.agents(region) {
            let idx = cell_index(x, y)?;
            grid.set_at(idx, COST_BLOCKED);
        }
        let overlay = Rc::new(grid);
        self.overlays.insert(region, Rc::clone(&overlay));
        self.metrics.overlay_builds += 1;
        Ok(overlay)
    }

    /// The terrain mask for `region`, via the cache's oracle.
    pub fn terrain(&mut self, world: &dyn WorldQuery, region: RegionId) -> Rc<TerrainMask> {
        self.oracle.mask(world, region)
    }

    /// Whether cell `(x, y)` of `region` is terrain-obstructed.
    pub fn is_obstructed(
        &mut self,
        world: &dyn WorldQuery,
        region: RegionId,
        x: i32,
        y: i32,
    ) -> Result<bool, GridError> {
        self.oracle.is_obstructed(world, region, x, y)
    }

    /// The durable compressed entry for `region`, if one is held.
    ///
    /// Exposed so hosts can persist entries across process restarts.
    pub fn compressed(&self, region: RegionId) -> Option<&CompressedGrid> {
        self.durable.get(&region)
    }

    /// Number of durable entries currently held.
    pub fn durable_len(&self) -> usize {
        self.durable.len()
    }

    /// The epoch the per-step stores are valid for.
    pub fn epoch(&self) -> StepId {
        self.epoch
    }

    /// Cumulative behavior counters.
    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    /// Step-boundary maintenance: drop per-step state whenever the
    /// epoch is stale, and sweep the durable store on the long period.
    fn maintain(&mut self, world: &dyn WorldQuery, now: StepId) {
        if now <= self.epoch {
            return;
        }
        self.step.clear();
        self.overlays.clear();

        if now.0 - self.last_sweep.0 >= self.config.sweep_interval {
            // Observability means fresher structure data can be rebuilt;
            // entries for regions we cannot see are kept since they are
            // the only data we have.
            let before = self.durable.len();
            self.durable.retain(|region, _| !world.observable(*region));
            self.metrics.sweeps += 1;
            self.metrics.swept_entries += (before - self.durable.len()) as u64;
            self.last_sweep = now;

            if self.durable.is_empty() && !self.table.is_empty() {
                self.table.reset();
                self.metrics.table_resets += 1;
            }
        }
        self.epoch = now;
    }

    /// Produce the shared per-step grid for a region, rebuilding or
    /// decoding as the tier states require.
    fn materialize(
        &mut self,
        world: &dyn WorldQuery,
        region: RegionId,
        request: &CostRequest,
    ) -> Result<Rc<CostGrid>, CacheError> {
        if !request.force_refresh {
            if let Some(grid) = self.step.get(&region) {
                self.metrics.step_hits += 1;
                return Ok(Rc::clone(grid));
            }
            if let Some(compressed) = self.durable.get(&region) {
                let grid = decode(compressed, &self.table)?;
                self.metrics.decodes += 1;
                let shared = Rc::new(grid);
                self.step.insert(region, Rc::clone(&shared));
                return Ok(shared);
            }
        }

        let observable = world.observable(region);
        let grid = self.rebuild(world, region, request, observable)?;
        self.metrics.rebuilds += 1;

        if observable {
            let encoded = encode(&grid, &mut self.table, false);
            self.metrics.skipped_symbols += u64::from(encoded.skipped_cells);
            self.durable.insert(region, encoded.compressed);
        }
        // Unobservable: terrain-only data is never persisted durably, so
        // it is recomputed the next time the region is requested.

        let shared = Rc::new(grid);
        self.step.insert(region, Rc::clone(&shared));
        // Any overlay derived from the replaced grid is stale.
        self.overlays.swap_remove(&region);
        Ok(shared)
    }

    /// Rebuild a region's grid from scratch: structure costs (only when
    /// observable), then caller-supplied area overrides.
    fn rebuild(
        &mut self,
        world: &dyn WorldQuery,
        region: RegionId,
        request: &CostRequest,
        observable: bool,
    ) -> Result<CostGrid, CacheError> {
        let mut grid = CostGrid::new();

        if observable {
            for obstacle in world.obstacles(region) {
                if let Some(cost) = self.overrides.cost_for(&obstacle) {
                    let idx = cell_index(obstacle.x, obstacle.y)?;
                    // A cell with several structures keeps the most
                    // restrictive cost.
                    if cost > grid.at(idx) {
                        grid.set_at(idx, cost);
                    }
                }
            }
        }

        if !request.area_overrides.is_empty() {
            let mask = self.oracle.mask(world, region);
            for stamp in &request.area_overrides {
                stamp.apply(&mut grid, &mask)?;
            }
        }
        Ok(grid)
    }
}

impl fmt::Debug for CostCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CostCache")
            .field("durable", &self.durable.len())
            .field("step", &self.step.len())
            .field("overlays", &self.overlays.len())
            .field("symbols", &self.table.len())
            .field("epoch", &self.epoch)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AreaOverride, OverrideMode};
    use wend_core::{Obstacle, ObstacleKind};
    use wend_test_utils::MockWorld;

    fn region() -> RegionId {
        RegionId::new(0, 0)
    }

    fn cache() -> CostCache {
        CostCache::new(CostOverrides::default(), CacheConfig::default()).unwrap()
    }

    fn structure(x: u8, y: u8, kind: ObstacleKind) -> Obstacle {
        Obstacle {
            x,
            y,
            kind,
            owned: false,
            public: false,
        }
    }

    #[test]
    fn structure_costs_land_on_their_cells() {
        let mut world = MockWorld::new();
        world.add_obstacle(region(), structure(10, 10, ObstacleKind::Container));
        world.add_obstacle(region(), structure(10, 11, ObstacleKind::Barrier));

        let mut cache = cache();
        let grid = cache
            .costs(&world, StepId(1), region(), &CostRequest::default())
            .unwrap();

        assert_eq!(grid.at(510), 5);
        assert_eq!(grid.at(511), 255);
        assert_eq!(grid.nonzero_count(), 2);
        // The durable entry packs exactly one unit per structure.
        assert_eq!(cache.compressed(region()).unwrap().len(), 2);
    }

    #[test]
    fn same_step_requests_share_one_grid() {
        let mut world = MockWorld::new();
        world.add_obstacle(region(), structure(1, 1, ObstacleKind::Road));

        let mut cache = cache();
        let req = CostRequest::default();
        let a = cache.costs(&world, StepId(1), region(), &req).unwrap();
        let b = cache.costs(&world, StepId(1), region(), &req).unwrap();

        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(cache.metrics().rebuilds, 1);
        assert_eq!(cache.metrics().step_hits, 1);
    }

    #[test]
    fn epoch_advance_rematerializes_without_rebuilding() {
        let mut world = MockWorld::new();
        world.add_obstacle(region(), structure(1, 1, ObstacleKind::Road));

        let mut cache = cache();
        let req = CostRequest::default();
        let a = cache.costs(&world, StepId(1), region(), &req).unwrap();
        let b = cache.costs(&world, StepId(2), region(), &req).unwrap();

        assert!(!Rc::ptr_eq(&a, &b));
        assert_eq!(*a, *b);
        // Step 2 decoded the surviving durable entry instead of
        // rebuilding from world data.
        assert_eq!(cache.metrics().rebuilds, 1);
        assert_eq!(cache.metrics().decodes, 1);
    }

    #[test]
    fn overlay_blocks_agents_and_never_leaks() {
        let mut world = MockWorld::new();
        world.add_obstacle(region(), structure(1, 1, ObstacleKind::Road));
        world.add_agent(region(), 4, 4);

        let mut cache = cache();
        let tracking = CostRequest {
            track_agents: true,
            ..CostRequest::default()
        };
        let overlay = cache.costs(&world, StepId(1), region(), &tracking).unwrap();
        assert_eq!(overlay.get(4, 4).unwrap(), COST_BLOCKED);
        assert_eq!(overlay.get(1, 1).unwrap(), 1);

        let plain = cache
            .costs(&world, StepId(1), region(), &CostRequest::default())
            .unwrap();
        assert!(!Rc::ptr_eq(&overlay, &plain));
        assert_eq!(plain.get(4, 4).unwrap(), 0);
    }

    #[test]
    fn overlay_is_memoized_within_a_step() {
        let mut world = MockWorld::new();
        world.add_agent(region(), 4, 4);

        let mut cache = cache();
        let tracking = CostRequest {
            track_agents: true,
            ..CostRequest::default()
        };
        let a = cache.costs(&world, StepId(1), region(), &tracking).unwrap();
        let b = cache.costs(&world, StepId(1), region(), &tracking).unwrap();
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(cache.metrics().overlay_builds, 1);
        assert_eq!(cache.metrics().overlay_hits, 1);

        // Next step the overlay is gone with the rest of the per-step
        // state.
        let c = cache.costs(&world, StepId(2), region(), &tracking).unwrap();
        assert!(!Rc::ptr_eq(&a, &c));
        assert_eq!(cache.metrics().overlay_builds, 2);
    }

    #[test]
    fn unobservable_regions_are_never_persisted() {
        let mut world = MockWorld::new();
        world.add_obstacle(region(), structure(9, 9, ObstacleKind::Blocking));
        world.set_observable(region(), false);

        let mut cache = cache();
        let grid = cache
            .costs(&world, StepId(1), region(), &CostRequest::default())
            .unwrap();

        // Terrain-only: structure data is unavailable without sight.
        assert!(grid.is_all_zero());
        assert_eq!(cache.durable_len(), 0);

        // Requested again next step: recomputed, still not persisted.
        cache
            .costs(&world, StepId(2), region(), &CostRequest::default())
            .unwrap();
        assert_eq!(cache.metrics().rebuilds, 2);
        assert_eq!(cache.durable_len(), 0);
    }

    #[test]
    fn area_overrides_apply_to_terrain_only_grids() {
        let mut world = MockWorld::new();
        world.set_observable(region(), false);

        let mut cache = cache();
        let req = CostRequest {
            area_overrides: vec![AreaOverride {
                points: vec![(20, 20)],
                radius: 0,
                cost: 30,
                mode: OverrideMode::Replace,
            }],
            ..CostRequest::default()
        };
        let grid = cache.costs(&world, StepId(1), region(), &req).unwrap();
        assert_eq!(grid.get(20, 20).unwrap(), 30);
    }

    #[test]
    fn force_refresh_rebuilds_and_drops_stale_overlay() {
        let mut world = MockWorld::new();
        world.add_obstacle(region(), structure(2, 2, ObstacleKind::Container));
        world.add_agent(region(), 6, 6);

        let mut cache = cache();
        let tracking = CostRequest {
            track_agents: true,
            ..CostRequest::default()
        };
        cache.costs(&world, StepId(1), region(), &tracking).unwrap();

        // The world changes mid-step; a forced refresh sees it.
        world.add_obstacle(region(), structure(3, 3, ObstacleKind::Road));
        let refreshed = CostRequest {
            force_refresh: true,
            track_agents: true,
            ..CostRequest::default()
        };
        let overlay = cache
            .costs(&world, StepId(1), region(), &refreshed)
            .unwrap();
        assert_eq!(overlay.get(3, 3).unwrap(), 1);
        assert_eq!(overlay.get(6, 6).unwrap(), COST_BLOCKED);
        assert_eq!(cache.metrics().rebuilds, 2);
        assert_eq!(cache.metrics().overlay_builds, 2);
    }

    #[test]
    fn sweep_drops_only_observable_entries() {
        let far = RegionId::new(5, 5);
        let mut world = MockWorld::new();
        world.add_obstacle(region(), structure(1, 1, ObstacleKind::Road));
        world.add_obstacle(far, structure(2, 2, ObstacleKind::Road));

        let mut cache = CostCache::new(
            CostOverrides::default(),
            CacheConfig { sweep_interval: 5 },
        )
        .unwrap();
        let req = CostRequest::default();
        cache.costs(&world, StepId(1), region(), &req).unwrap();
        cache.costs(&world, StepId(1), far, &req).unwrap();
        assert_eq!(cache.durable_len(), 2);

        // `far` goes dark before the sweep fires.
        world.set_observable(far, false);
        cache.costs(&world, StepId(6), region(), &req).unwrap();

        assert_eq!(cache.metrics().sweeps, 1);
        assert!(cache.compressed(far).is_some());
        // The observable region was dropped and immediately rebuilt by
        // the request that triggered the sweep.
        assert_eq!(cache.metrics().swept_entries, 1);
        assert_eq!(cache.metrics().rebuilds, 3);
    }

    #[test]
    fn table_resets_when_durable_store_empties() {
        let mut world = MockWorld::new();
        world.add_obstacle(region(), structure(1, 1, ObstacleKind::Road));

        let mut cache = CostCache::new(
            CostOverrides::default(),
            CacheConfig { sweep_interval: 2 },
        )
        .unwrap();
        let req = CostRequest::default();
        cache.costs(&world, StepId(1), region(), &req).unwrap();

        // Sweep at step 3 drops the only (observable) entry; the codec
        // context starts over before the rebuild re-interns.
        cache.costs(&world, StepId(3), region(), &req).unwrap();
        assert_eq!(cache.metrics().table_resets, 1);
        assert_eq!(cache.durable_len(), 1);
    }

    #[test]
    fn symbol_overflow_degrades_and_is_counted() {
        let mut world = MockWorld::new();
        let mut cache = cache();

        // 23 distinct override costs: the 23rd cannot be interned.
        let overrides: Vec<AreaOverride> = (0..23u8)
            .map(|i| AreaOverride {
                points: vec![(i, 0)],
                radius: 0,
                cost: 100 + i,
                mode: OverrideMode::Replace,
            })
            .collect();
        let req = CostRequest {
            area_overrides: overrides,
            ..CostRequest::default()
        };

        let grid = cache.costs(&world, StepId(1), region(), &req).unwrap();
        // The freshly built grid still carries every cost this step.
        assert_eq!(grid.nonzero_count(), 23);
        assert_eq!(cache.metrics().skipped_symbols, 1);

        // After re-materializing from the durable entry, the skipped
        // cell has degraded to baseline.
        let next = cache
            .costs(&world, StepId(2), region(), &CostRequest::default())
            .unwrap();
        assert_eq!(next.nonzero_count(), 22);
    }

    #[test]
    fn invalid_override_point_is_surfaced() {
        let world = MockWorld::new();
        let mut cache = cache();
        let req = CostRequest {
            area_overrides: vec![AreaOverride {
                points: vec![(200, 3)],
                radius: 1,
                cost: 9,
                mode: OverrideMode::Replace,
            }],
            ..CostRequest::default()
        };
        assert!(matches!(
            cache.costs(&world, StepId(1), region(), &req),
            Err(CacheError::Grid(GridError::InvalidCoordinate { .. }))
        ));
    }
}
