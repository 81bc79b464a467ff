//! Test utilities and mock types for wend development.
//!
//! Provides a programmable [`MockWorld`] implementing the host-world
//! traits, a [`ScriptedSearch`] engine that replays canned results
//! while recording how it was invoked, and small path fixtures.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use indexmap::IndexMap;
use std::cell::RefCell;
use std::collections::VecDeque;
use wend_core::{
    AgentId, AgentSighting, Direction, Obstacle, Position, RegionClass, RegionId, SearchEngine,
    SearchGoal, SearchLimits, SearchRequest, SearchResult, SwapCommander, TerrainMask, WorldQuery,
};

// ── MockWorld ────────────────────────────────────────────────────

/// Programmable world state for tests.
///
/// Regions default to observable, ordinary, fully walkable, and empty.
/// Commanded swap moves are recorded for inspection.
#[derive(Default)]
pub struct MockWorld {
    terrain: IndexMap<RegionId, TerrainMask>,
    obstacles: IndexMap<RegionId, Vec<Obstacle>>,
    agents: IndexMap<RegionId, Vec<(u8, u8)>>,
    occupants: Vec<(Position, AgentSighting)>,
    observable: IndexMap<RegionId, bool>,
    classes: IndexMap<RegionId, RegionClass>,
    commanded: Vec<(AgentId, Direction)>,
    refuse_commands: bool,
}

impl MockWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a region's terrain mask.
    pub fn set_terrain(&mut self, region: RegionId, mask: TerrainMask) {
        self.terrain.insert(region, mask);
    }

    /// Add a structure sighting.
    pub fn add_obstacle(&mut self, region: RegionId, obstacle: Obstacle) {
        self.obstacles.entry(region).or_default().push(obstacle);
    }

    /// Add an anonymous agent to a region's occupancy list.
    pub fn add_agent(&mut self, region: RegionId, x: u8, y: u8) {
        self.agents.entry(region).or_default().push((x, y));
    }

    /// Place a fully-described occupant at a cell (also appears in the
    /// region occupancy list).
    pub fn place_occupant(&mut self, pos: Position, sighting: AgentSighting) {
        self.add_agent(pos.region, pos.x, pos.y);
        self.occupants.push((pos, sighting));
    }

    /// Remove every occupant and occupancy entry.
    pub fn clear_agents(&mut self) {
        self.agents.clear();
        self.occupants.clear();
    }

    /// Override a region's observability (default: observable).
    pub fn set_observable(&mut self, region: RegionId, observable: bool) {
        self.observable.insert(region, observable);
    }

    /// Override a region's routing classification (default: ordinary).
    pub fn set_classification(&mut self, region: RegionId, class: RegionClass) {
        self.classes.insert(region, class);
    }

    /// Make `command_move` refuse every request.
    pub fn refuse_commands(&mut self, refuse: bool) {
        self.refuse_commands = refuse;
    }

    /// Swap moves commanded so far, in order.
    pub fn commanded(&self) -> &[(AgentId, Direction)] {
        &self.commanded
    }
}

impl WorldQuery for MockWorld {
    fn terrain_mask(&self, region: RegionId) -> TerrainMask {
        self.terrain
            .get(&region)
            .cloned()
            .unwrap_or_else(TerrainMask::open)
    }

    fn obstacles(&self, region: RegionId) -> Vec<Obstacle> {
        self.obstacles.get(&region).cloned().unwrap_or_default()
    }

    fn agents(&self, region: RegionId) -> Vec<(u8, u8)> {
        self.agents.get(&region).cloned().unwrap_or_default()
    }

    fn agent_at(&self, pos: Position) -> Option<AgentSighting> {
        self.occupants
            .iter()
            .find(|(p, _)| *p == pos)
            .map(|(_, s)| *s)
    }

    fn observable(&self, region: RegionId) -> bool {
        self.observable.get(&region).copied().unwrap_or(true)
    }

    fn classification(&self, region: RegionId) -> RegionClass {
        self.classes
            .get(&region)
            .copied()
            .unwrap_or(RegionClass::Ordinary)
    }
}

impl SwapCommander for MockWorld {
    fn command_move(&mut self, agent: AgentId, dir: Direction) -> bool {
        if self.refuse_commands {
            return false;
        }
        self.commanded.push((agent, dir));
        true
    }
}

// ── ScriptedSearch ───────────────────────────────────────────────

/// One recorded invocation of [`ScriptedSearch`].
#[derive(Clone, Debug)]
pub struct SearchCall {
    pub start: Position,
    pub goal: SearchGoal,
    pub flee: bool,
    pub limits: SearchLimits,
    /// Probed regions whose cost callback returned a grid.
    pub included: Vec<RegionId>,
    /// Probed regions excluded by the cost callback.
    pub excluded: Vec<RegionId>,
}

/// Search engine that replays a queue of canned results and records
/// every invocation.
///
/// On each call it probes the configured regions (defaulting to the
/// start and goal regions) through the cost callback, so tests can
/// assert which regions the caller exposed to the search.
#[derive(Default)]
pub struct ScriptedSearch {
    script: RefCell<VecDeque<SearchResult>>,
    calls: RefCell<Vec<SearchCall>>,
    probes: Vec<RegionId>,
}

impl ScriptedSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Probe these regions through the cost callback on every call.
    pub fn with_probes(probes: Vec<RegionId>) -> Self {
        Self {
            probes,
            ..Self::default()
        }
    }

    /// Queue the next result to return.
    pub fn push(&self, result: SearchResult) {
        self.script.borrow_mut().push_back(result);
    }

    /// Queue a complete result walking `dirs` from `start`.
    pub fn push_walk(&self, start: Position, dirs: &[Direction]) {
        self.push(SearchResult {
            cells: walk(start, dirs),
            incomplete: false,
        });
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn call(&self, index: usize) -> SearchCall {
        self.calls.borrow()[index].clone()
    }

    pub fn last_call(&self) -> Option<SearchCall> {
        self.calls.borrow().last().cloned()
    }
}

impl SearchEngine for ScriptedSearch {
    fn search(
        &self,
        start: Position,
        goal: SearchGoal,
        mut request: SearchRequest<'_>,
    ) -> SearchResult {
        let mut probes = self.probes.clone();
        if probes.is_empty() {
            probes.push(start.region);
            if goal.pos.region != start.region {
                probes.push(goal.pos.region);
            }
        }
        let mut included = Vec::new();
        let mut excluded = Vec::new();
        for region in probes {
            if (request.region_costs)(region).is_some() {
                included.push(region);
            } else {
                excluded.push(region);
            }
        }
        self.calls.borrow_mut().push(SearchCall {
            start,
            goal,
            flee: request.flee,
            limits: request.limits,
            included,
            excluded,
        });
        self.script
            .borrow_mut()
            .pop_front()
            .unwrap_or_default()
    }
}

// ── fixtures ─────────────────────────────────────────────────────

/// The cells visited by walking `dirs` from `start`, in order
/// (excluding `start` itself), crossing region edges freely.
pub fn walk(start: Position, dirs: &[Direction]) -> Vec<Position> {
    let mut cells = Vec::with_capacity(dirs.len());
    let mut cur = start;
    for &dir in dirs {
        cur = cur.shift(dir);
        cells.push(cur);
    }
    cells
}
