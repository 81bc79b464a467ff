//! Cache configuration and per-request options.

use std::error::Error;
use std::fmt;
use wend_core::{cell_index, CostGrid, GridError, Obstacle, ObstacleKind, TerrainMask, REGION_DIM};

// ── CostOverrides ──────────────────────────────────────────────────

/// Structure-kind → traversal-cost table applied when rebuilding a
/// region's grid.
///
/// This is a configuration input, not a constant: hosts with different
/// structure economics supply their own table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CostOverrides {
    /// Cost written under a road. Default: 1.
    pub road: u8,
    /// Cost written under a container. Default: 5.
    pub container: u8,
    /// Cost written under a barrier that is neither owned nor public.
    /// Default: 255.
    pub barrier: u8,
    /// Cost written under any unconditionally blocking structure.
    /// Default: 255.
    pub blocking: u8,
}

impl Default for CostOverrides {
    fn default() -> Self {
        Self {
            road: 1,
            container: 5,
            barrier: 255,
            blocking: 255,
        }
    }
}

impl CostOverrides {
    /// Check structural invariants: every cost must be non-zero, since
    /// 0 means "unmodified" and would erase the structure from the grid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, cost) in [
            ("road", self.road),
            ("container", self.container),
            ("barrier", self.barrier),
            ("blocking", self.blocking),
        ] {
            if cost == 0 {
                return Err(ConfigError::ZeroOverrideCost { name });
            }
        }
        Ok(())
    }

    /// The cost contribution of one sighted structure, or `None` when
    /// the structure does not affect traversal (an owned or public
    /// barrier is passable).
    pub fn cost_for(&self, obstacle: &Obstacle) -> Option<u8> {
        match obstacle.kind {
            ObstacleKind::Road => Some(self.road),
            ObstacleKind::Container => Some(self.container),
            ObstacleKind::Barrier => {
                if obstacle.owned || obstacle.public {
                    None
                } else {
                    Some(self.barrier)
                }
            }
            ObstacleKind::Blocking => Some(self.blocking),
        }
    }
}

// ── CacheConfig ────────────────────────────────────────────────────

/// Epoch-maintenance tuning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheConfig {
    /// Steps between durable-store sweeps. Default: 500.
    pub sweep_interval: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            sweep_interval: 500,
        }
    }
}

impl CacheConfig {
    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sweep_interval == 0 {
            return Err(ConfigError::ZeroSweepInterval);
        }
        Ok(())
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while validating cache configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `sweep_interval` must be at least 1.
    ZeroSweepInterval,
    /// An override cost of 0 would erase its structure from the grid.
    ZeroOverrideCost {
        /// Which override field was zero.
        name: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroSweepInterval => write!(f, "sweep_interval must be at least 1"),
            Self::ZeroOverrideCost { name } => {
                write!(f, "override cost '{name}' must be non-zero")
            }
        }
    }
}

impl Error for ConfigError {}

// ── AreaOverride ───────────────────────────────────────────────────

/// Whether an area override replaces existing costs or only fills
/// unmodified cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverrideMode {
    /// Overwrite whatever cost the cell already carries.
    Replace,
    /// Write only cells still at the default cost.
    Preserve,
}

/// A caller-supplied cost stamp: every walkable cell within a Chebyshev
/// radius of each reference point receives `cost`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AreaOverride {
    /// Reference cells within the region.
    pub points: Vec<(u8, u8)>,
    /// Chebyshev radius around each point.
    pub radius: u8,
    /// The cost to write.
    pub cost: u8,
    /// Replace or preserve existing costs.
    pub mode: OverrideMode,
}

impl AreaOverride {
    /// Stamp this override onto `grid`.
    ///
    /// Terrain-obstructed cells are never written. A reference point
    /// outside the region is a caller bug ([`GridError::InvalidCoordinate`]);
    /// radius spill past the region edge is silently clipped.
    pub fn apply(&self, grid: &mut CostGrid, mask: &TerrainMask) -> Result<(), GridError> {
        let r = self.radius as i32;
        for &(px, py) in &self.points {
            cell_index(px, py)?;
            for dx in -r..=r {
                for dy in -r..=r {
                    let x = px as i32 + dx;
                    let y = py as i32 + dy;
                    if x < 0 || x >= REGION_DIM as i32 || y < 0 || y >= REGION_DIM as i32 {
                        continue;
                    }
                    let idx = x as usize * REGION_DIM + y as usize;
                    if mask.is_obstructed_at(idx) {
                        continue;
                    }
                    match self.mode {
                        OverrideMode::Replace => grid.set_at(idx, self.cost),
                        OverrideMode::Preserve => {
                            if grid.at(idx) == 0 {
                                grid.set_at(idx, self.cost);
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

// ── CostRequest ────────────────────────────────────────────────────

/// Per-call options for [`CostCache::costs`](crate::CostCache::costs).
#[derive(Clone, Debug, Default)]
pub struct CostRequest {
    /// Overlay other agents as blocked cells (returns a per-step clone,
    /// never the shared grid).
    pub track_agents: bool,
    /// Rebuild the durable entry even if one exists.
    pub force_refresh: bool,
    /// Caller-supplied cost stamps applied during rebuild.
    pub area_overrides: Vec<AreaOverride>,
}
