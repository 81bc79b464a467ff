//! Contracts for the external collaborators: the host world and the
//! cell-level search engine.
//!
//! Everything behind these traits is out of scope for this workspace —
//! the cache and navigator only depend on the shapes defined here, which
//! keeps them mockable (see `wend-test-utils`).

use crate::grid::{CostGrid, TerrainMask};
use crate::id::{AgentId, RegionId};
use crate::pos::{Direction, Position};
use std::rc::Rc;

/// What kind of structure occupies a cell, for cost-overlay purposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObstacleKind {
    /// Reduces traversal cost below the terrain baseline.
    Road,
    /// Walkable at a penalty.
    Container,
    /// Impassable unless owned or public.
    Barrier,
    /// Unconditionally impassable.
    Blocking,
}

/// A structure sighted in a region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Obstacle {
    /// Cell x within the region.
    pub x: u8,
    /// Cell y within the region.
    pub y: u8,
    /// Structure kind.
    pub kind: ObstacleKind,
    /// Whether the caller's faction owns it.
    pub owned: bool,
    /// Whether it is open to everyone regardless of ownership.
    pub public: bool,
}

/// An agent occupying a specific cell, with the detail obstruction
/// resolution needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AgentSighting {
    /// The occupant's identity.
    pub id: AgentId,
    /// Whether the caller can command this agent.
    pub controllable: bool,
    /// Whether the agent is currently unable to move (e.g. recovering).
    pub disabled: bool,
    /// Whether the agent has already committed a move this step.
    pub committed: bool,
}

/// Coarse routing classification of a region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegionClass {
    /// Default weight.
    Ordinary,
    /// Preferred corridor, half the ordinary weight.
    FastLane,
    /// Never routed through.
    Prohibited,
}

/// Read-only queries against the host world.
///
/// All methods are cheap to call repeatedly within a step; the caching
/// layers above decide what to memoize.
pub trait WorldQuery {
    /// Raw terrain classification for a region.
    ///
    /// Terrain is global knowledge: available for every region,
    /// observable or not, and immutable once loaded.
    fn terrain_mask(&self, region: RegionId) -> TerrainMask;

    /// Structures currently known in a region.
    ///
    /// Empty when the region is not observable.
    fn obstacles(&self, region: RegionId) -> Vec<Obstacle>;

    /// Cells currently occupied by agents in a region.
    fn agents(&self, region: RegionId) -> Vec<(u8, u8)>;

    /// The occupant of a specific cell, if any.
    fn agent_at(&self, pos: Position) -> Option<AgentSighting>;

    /// Whether fresh structure data can currently be read for a region.
    fn observable(&self, region: RegionId) -> bool;

    /// Routing classification of a region.
    fn classification(&self, region: RegionId) -> RegionClass;
}

/// Command channel back into the host world, used only by obstruction
/// resolution to ask a blocking agent to step aside.
pub trait SwapCommander {
    /// Ask `agent` to move one cell along `dir` this step.
    ///
    /// Returns `false` if the host refuses (the agent vanished, is no
    /// longer controllable, or its move slot is taken).
    fn command_move(&mut self, agent: AgentId, dir: Direction) -> bool;
}

/// A search destination: a cell plus an acceptable proximity radius.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchGoal {
    /// The target cell.
    pub pos: Position,
    /// Chebyshev radius within which the goal counts as reached.
    pub tolerance: u8,
}

/// Compute ceilings passed through to the search engine.
///
/// On exhaustion the engine returns its best incomplete path instead of
/// failing, keeping a pathological search inside the per-step budget.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchLimits {
    /// Maximum node expansions. Default: 2000.
    pub max_ops: u32,
    /// Maximum distinct regions the search may touch. Default: 16.
    pub max_regions: u8,
    /// Optional ceiling on accumulated path cost. Default: none.
    pub max_cost: Option<u32>,
    /// Heuristic inflation factor. Default: 1.2.
    pub heuristic_weight: f64,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_ops: 2000,
            max_regions: 16,
            max_cost: None,
            heuristic_weight: 1.2,
        }
    }
}

/// Everything a single search invocation needs besides start and goal.
pub struct SearchRequest<'a> {
    /// Cost of an unmodified walkable cell.
    pub baseline_cost: u8,
    /// Cost of an unmodified alternate-terrain cell (the engine knows
    /// which cells those are).
    pub alternate_cost: u8,
    /// Search away from the goal instead of toward it.
    pub flee: bool,
    /// Compute ceilings.
    pub limits: SearchLimits,
    /// Per-region cost lookup. Returning `None` excludes the region
    /// from the search entirely.
    pub region_costs: &'a mut dyn FnMut(RegionId) -> Option<Rc<CostGrid>>,
}

impl std::fmt::Debug for SearchRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchRequest")
            .field("baseline_cost", &self.baseline_cost)
            .field("alternate_cost", &self.alternate_cost)
            .field("flee", &self.flee)
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

/// Outcome of one search invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchResult {
    /// The cells to visit after the start cell, in order. May be empty.
    pub cells: Vec<Position>,
    /// Whether a limit was hit before reaching the goal tolerance; the
    /// cells are then a best-effort prefix.
    pub incomplete: bool,
}

/// The opaque cell-level shortest-path primitive.
///
/// Implementations own their heuristic and queue mechanics; the only
/// contract is the request/result shape and that limits degrade to
/// `incomplete` rather than an error.
pub trait SearchEngine {
    /// Find a path from `start` to within `goal.tolerance` of `goal.pos`.
    fn search(
        &self,
        start: Position,
        goal: SearchGoal,
        request: SearchRequest<'_>,
    ) -> SearchResult;
}
