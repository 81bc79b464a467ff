//! Region-route computation and search restriction.

use crate::config::{ConfigError, RouteConfig, RouteRequest};
use indexmap::IndexMap;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::rc::Rc;
use wend_cache::{CostCache, CostRequest};
use wend_core::{
    CostGrid, ObstacleKind, Position, RegionClass, RegionId, SearchEngine, SearchGoal,
    SearchRequest, SearchResult, StepId, WorldQuery,
};

// ── region_route ───────────────────────────────────────────────────

/// Lowest-cost corridor of regions from `from` to `to`, inclusive.
///
/// Deterministic Dijkstra over the 4-connected region graph. Regions in
/// `avoid` are unroutable; prohibited regions are unroutable except for
/// the destination itself (a caller may target a region it would never
/// route through). Fast-lane regions cost `fast_lane_weight` to enter,
/// everything else `ordinary_weight`. Returns `None` when no corridor
/// of at most `max_route_len` regions exists.
pub fn region_route(
    world: &dyn WorldQuery,
    from: RegionId,
    to: RegionId,
    avoid: &[RegionId],
    config: &RouteConfig,
) -> Option<Vec<RegionId>> {
    if from == to {
        return Some(vec![from]);
    }
    let max_edges = config.max_route_len.checked_sub(1)?;
    if from.distance(to) as usize > max_edges {
        return None;
    }

    let mut best: IndexMap<RegionId, u32> = IndexMap::new();
    let mut hops: IndexMap<RegionId, usize> = IndexMap::new();
    let mut prev: IndexMap<RegionId, RegionId> = IndexMap::new();
    // (cost, insertion sequence, region): the sequence breaks cost ties
    // by insertion order, keeping expansion deterministic.
    let mut heap: BinaryHeap<Reverse<(u32, u64, RegionId)>> = BinaryHeap::new();
    let mut seq = 0u64;

    best.insert(from, 0);
    hops.insert(from, 0);
    heap.push(Reverse((0, seq, from)));

    while let Some(Reverse((cost, _, region))) = heap.pop() {
        if best.get(&region) != Some(&cost) {
            continue;
        }
        if region == to {
            let mut route = vec![to];
            let mut cur = to;
            while let Some(&p) = prev.get(&cur) {
                route.push(p);
                cur = p;
            }
            route.reverse();
            return Some(route);
        }
        let here_hops = *hops.get(&region)?;

        for nb in region.neighbours() {
            if avoid.contains(&nb) {
                continue;
            }
            if nb != to && world.classification(nb) == RegionClass::Prohibited {
                continue;
            }
            let nb_hops = here_hops + 1;
            // Even a straight line from here cannot finish in budget.
            if nb_hops + nb.distance(to) as usize > max_edges {
                continue;
            }
            let weight = match world.classification(nb) {
                RegionClass::FastLane => config.fast_lane_weight,
                RegionClass::Ordinary | RegionClass::Prohibited => config.ordinary_weight,
            };
            let next_cost = cost + weight;
            if best.get(&nb).is_none_or(|&c| next_cost < c) {
                best.insert(nb, next_cost);
                hops.insert(nb, nb_hops);
                prev.insert(nb, region);
                seq += 1;
                heap.push(Reverse((next_cost, seq, nb)));
            }
        }
    }
    None
}

// ── RouteFinder ────────────────────────────────────────────────────

/// Outcome of one [`RouteFinder::find_path`] call.
#[derive(Clone, Debug)]
pub struct RouteOutcome {
    /// Cells to visit after `start`, in order.
    pub cells: Vec<Position>,
    /// The search hit a limit before reaching the goal tolerance; the
    /// cells are a best-effort prefix. Recoverable, already retried.
    pub incomplete: bool,
    /// The corridor the search was restricted to, when one was used.
    pub route: Option<Vec<RegionId>>,
}

/// Restricts the cell-level search to a bounded region corridor and
/// owns the goal-tolerance and retry policy.
#[derive(Clone, Debug)]
pub struct RouteFinder {
    config: RouteConfig,
}

impl RouteFinder {
    /// Build a finder after validating its configuration.
    pub fn new(config: RouteConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The active configuration.
    pub fn config(&self) -> &RouteConfig {
        &self.config
    }

    /// Plan a path from `start` to `goal`.
    ///
    /// Far-apart endpoints get a region corridor first and the search
    /// is confined to it (`max_regions` = corridor length). A corridor
    /// failure is not fatal: the search simply runs unrestricted. An
    /// incomplete unrestricted search is retried exactly once with a
    /// corridor computed after the fact; whatever comes back then is
    /// reported as-is.
    pub fn find_path(
        &self,
        world: &dyn WorldQuery,
        cache: &mut CostCache,
        search: &dyn SearchEngine,
        now: StepId,
        start: Position,
        goal: Position,
        request: &RouteRequest,
    ) -> RouteOutcome {
        let mut route = None;
        if start.region.distance(goal.region) > self.config.route_threshold {
            route = region_route(world, start.region, goal.region, &request.avoid, &self.config);
        }

        let tolerance = request
            .tolerance
            .unwrap_or_else(|| self.derive_tolerance(world, cache, goal, request));

        let first = self.invoke(
            world,
            cache,
            search,
            now,
            start,
            goal,
            tolerance,
            request,
            route.as_deref(),
        );

        if first.incomplete && route.is_none() {
            if let Some(corridor) =
                region_route(world, start.region, goal.region, &request.avoid, &self.config)
            {
                let second = self.invoke(
                    world,
                    cache,
                    search,
                    now,
                    start,
                    goal,
                    tolerance,
                    request,
                    Some(&corridor),
                );
                return RouteOutcome {
                    cells: second.cells,
                    incomplete: second.incomplete,
                    route: Some(corridor),
                };
            }
        }

        RouteOutcome {
            cells: first.cells,
            incomplete: first.incomplete,
            route,
        }
    }

    /// The goal-tolerance ladder, first match wins.
    fn derive_tolerance(
        &self,
        world: &dyn WorldQuery,
        cache: &mut CostCache,
        goal: Position,
        request: &RouteRequest,
    ) -> u8 {
        let terrain = cache.terrain(world, goal.region);
        if terrain.is_obstructed(goal.x, goal.y).unwrap_or(false) {
            return 1;
        }
        if !world.observable(goal.region) {
            return 0;
        }
        if request.track_agents && world.agent_at(goal).is_some() {
            return 1;
        }
        let blocked_structure = world.obstacles(goal.region).iter().any(|o| {
            o.x == goal.x
                && o.y == goal.y
                && match o.kind {
                    ObstacleKind::Blocking => true,
                    ObstacleKind::Barrier => !o.owned && !o.public,
                    ObstacleKind::Road | ObstacleKind::Container => false,
                }
        });
        if blocked_structure {
            return 1;
        }
        0
    }

    /// Run the search once, confined to `route` when present.
    #[allow(clippy::too_many_arguments)]
    fn invoke(
        &self,
        world: &dyn WorldQuery,
        cache: &mut CostCache,
        search: &dyn SearchEngine,
        now: StepId,
        start: Position,
        goal: Position,
        tolerance: u8,
        request: &RouteRequest,
        route: Option<&[RegionId]>,
    ) -> SearchResult {
        let mut limits = self.config.limits;
        if let Some(route) = route {
            limits.max_regions = route.len() as u8;
        }
        let cost_request = CostRequest {
            track_agents: request.track_agents,
            ..CostRequest::default()
        };
        let mut region_costs = |region: RegionId| -> Option<Rc<CostGrid>> {
            if request.avoid.contains(&region) {
                return None;
            }
            if let Some(route) = route {
                if !route.contains(&region) {
                    return None;
                }
            }
            // A region whose grid cannot be built is excluded rather
            // than failing the whole search mid-step.
            cache.costs(world, now, region, &cost_request).ok()
        };
        search.search(
            start,
            SearchGoal {
                pos: goal,
                tolerance,
            },
            SearchRequest {
                baseline_cost: self.config.baseline_cost,
                alternate_cost: self.config.alternate_cost,
                flee: request.flee,
                limits,
                region_costs: &mut region_costs,
            },
        )
    }
}
