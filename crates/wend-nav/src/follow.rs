//! The per-agent path-following automaton.

use crate::config::{ConfigError, FollowConfig, RouteRequest};
use crate::error::NavError;
use crate::route::RouteFinder;
use indexmap::{IndexMap, IndexSet};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use wend_cache::CostCache;
use wend_core::{
    AgentId, Direction, MoveSeq, PackedPos, Position, SearchEngine, StepId, SwapCommander,
    WorldQuery,
};

// ── FollowState ────────────────────────────────────────────────────

/// Where an agent's automaton currently sits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FollowState {
    /// No usable move sequence exists.
    NoPath,
    /// Consuming the cached sequence, one move per step.
    Following,
    /// The observed position diverged from the predicted one.
    Stalled,
    /// A blocking agent was commanded to step aside this step.
    Swapping,
    /// A fresh plan was requested this step.
    Replanning,
}

// ── AgentPathState ─────────────────────────────────────────────────

/// Cached navigation state for one agent.
///
/// Created on the first navigation request, mutated every routed step,
/// and discarded with [`PathFollower::forget`] when the agent goes
/// away.
#[derive(Clone, Debug)]
pub struct AgentPathState {
    target: PackedPos,
    moves: MoveSeq,
    last_pos: PackedPos,
    stall: u8,
    state: FollowState,
    force_track: bool,
}

impl AgentPathState {
    /// The goal identity the cached sequence leads to.
    pub fn target(&self) -> PackedPos {
        self.target
    }

    /// Automaton state after the most recent step.
    pub fn state(&self) -> FollowState {
        self.state
    }

    /// Consecutive stalled steps.
    pub fn stall(&self) -> u8 {
        self.stall
    }

    /// Moves still queued.
    pub fn remaining(&self) -> usize {
        self.moves.len()
    }

    /// The last position the agent was observed at.
    pub fn last_pos(&self) -> PackedPos {
        self.last_pos
    }

    /// The unconsumed move sequence in wire form.
    pub fn serialized_moves(&self) -> String {
        self.moves.serialize()
    }
}

// ── FollowMetrics ──────────────────────────────────────────────────

/// Cumulative counters for follower behavior.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FollowMetrics {
    /// Requests with no usable cached state (new agent or new goal).
    pub cache_misses: u64,
    /// Plans requested from the route finder.
    pub replans: u64,
    /// Steps where an agent failed to advance as predicted.
    pub stalls: u64,
    /// Obstruction swaps successfully commanded.
    pub swaps: u64,
    /// Obstruction resolutions that failed and fell back to replanning.
    pub swap_failures: u64,
    /// Plans that came back incomplete.
    pub incomplete_results: u64,
}

// ── PathFollower ───────────────────────────────────────────────────

/// Steps agents along cached routes, detecting stalls and resolving
/// local obstructions without discarding routes that are still good.
pub struct PathFollower {
    config: FollowConfig,
    agents: IndexMap<AgentId, AgentPathState>,
    swap_scheduled: IndexSet<AgentId>,
    swap_epoch: StepId,
    metrics: FollowMetrics,
}

impl PathFollower {
    /// Build a follower after validating its configuration.
    pub fn new(config: FollowConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            agents: IndexMap::new(),
            swap_scheduled: IndexSet::new(),
            swap_epoch: StepId(0),
            metrics: FollowMetrics::default(),
        })
    }

    /// The next move for `agent`, currently at `current`, toward `goal`.
    ///
    /// Exactly one of three things happens: the cached sequence advances
    /// (the previous move was confirmed by the observed position), the
    /// agent waits (stalled below the reaction threshold, or a blocker
    /// was commanded aside), or a fresh plan replaces the cache. Fails
    /// only when even a fresh plan yields no moves.
    #[allow(clippy::too_many_arguments)]
    pub fn next_move<W: WorldQuery + SwapCommander>(
        &mut self,
        world: &mut W,
        cache: &mut CostCache,
        finder: &RouteFinder,
        search: &dyn SearchEngine,
        now: StepId,
        agent: AgentId,
        current: Position,
        goal: Position,
        request: &RouteRequest,
    ) -> Result<Direction, NavError> {
        if now != self.swap_epoch {
            self.swap_scheduled.clear();
            self.swap_epoch = now;
        }
        let target = goal.packed();
        let gate = Self::retry_gate(&self.config, now, agent);

        let need_replan = match self.agents.get_mut(&agent) {
            None => {
                self.metrics.cache_misses += 1;
                true
            }
            Some(state) if state.target != target => {
                self.metrics.cache_misses += 1;
                true
            }
            Some(state) => match state.moves.front() {
                None => true,
                Some(dir) => {
                    let predicted = state.last_pos.unpack().shift(dir);
                    if current == predicted {
                        state.moves.pop_front();
                        state.stall = 0;
                        state.last_pos = current.packed();
                        state.state = FollowState::Following;
                        // A fully consumed sequence needs a fresh plan.
                        state.moves.is_empty()
                    } else {
                        state.stall = state.stall.saturating_add(1);
                        state.state = FollowState::Stalled;
                        self.metrics.stalls += 1;
                        if state.stall > self.config.stall_threshold && gate {
                            match Self::resolve_obstruction(
                                world,
                                &self.swap_scheduled,
                                dir,
                                current,
                            ) {
                                Some(blocker) => {
                                    self.swap_scheduled.insert(blocker);
                                    state.state = FollowState::Swapping;
                                    state.stall = 0;
                                    self.metrics.swaps += 1;
                                    false
                                }
                                None => {
                                    state.force_track = true;
                                    state.state = FollowState::Replanning;
                                    self.metrics.swap_failures += 1;
                                    true
                                }
                            }
                        } else {
                            false
                        }
                    }
                }
            },
        };

        if need_replan {
            let force_track = self.agents.get(&agent).is_some_and(|s| s.force_track);
            let mut route_request = request.clone();
            if force_track {
                route_request.track_agents = true;
            }
            let outcome =
                finder.find_path(&*world, cache, search, now, current, goal, &route_request);
            if outcome.incomplete {
                self.metrics.incomplete_results += 1;
            }
            self.metrics.replans += 1;

            let moves = MoveSeq::from_path(current, &outcome.cells);
            let state = if moves.is_empty() {
                FollowState::NoPath
            } else {
                FollowState::Following
            };
            self.agents.insert(
                agent,
                AgentPathState {
                    target,
                    moves,
                    last_pos: current.packed(),
                    stall: 0,
                    state,
                    force_track: false,
                },
            );
        }

        match self.agents.get(&agent).and_then(|s| s.moves.front()) {
            Some(dir) => Ok(dir),
            None => {
                if let Some(state) = self.agents.get_mut(&agent) {
                    state.state = FollowState::NoPath;
                }
                Err(NavError::NoPathFound { agent })
            }
        }
    }

    /// Drop the cached state for a discarded agent.
    pub fn forget(&mut self, agent: AgentId) {
        self.agents.swap_remove(&agent);
    }

    /// The cached state for an agent, if any.
    pub fn state(&self, agent: AgentId) -> Option<&AgentPathState> {
        self.agents.get(&agent)
    }

    /// Cumulative behavior counters.
    pub fn metrics(&self) -> &FollowMetrics {
        &self.metrics
    }

    /// Seeded per-step, per-agent reaction gate.
    ///
    /// Desynchronizes retries across many simultaneously stalled agents
    /// while keeping identical runs identical for a given seed.
    fn retry_gate(config: &FollowConfig, now: StepId, agent: AgentId) -> bool {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed ^ now.0 ^ agent.0);
        rng.random_bool(config.retry_probability)
    }

    /// Try to clear the cell the next queued move needs.
    ///
    /// Succeeds only when that cell is inside the current region and
    /// holds a controllable agent that is free to move and not already
    /// swap-scheduled; the blocker is then commanded to step into the
    /// stalled agent's cell. Returns the blocker's id on success.
    fn resolve_obstruction<W: WorldQuery + SwapCommander>(
        world: &mut W,
        already_scheduled: &IndexSet<AgentId>,
        next_dir: Direction,
        current: Position,
    ) -> Option<AgentId> {
        // A swap across a region edge is not attempted.
        let next = current.step_within(next_dir)?;
        let sighting = world.agent_at(next)?;
        if !sighting.controllable || sighting.disabled || sighting.committed {
            return None;
        }
        if already_scheduled.contains(&sighting.id) {
            return None;
        }
        world
            .command_move(sighting.id, next_dir.opposite())
            .then_some(sighting.id)
    }
}

impl std::fmt::Debug for PathFollower {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathFollower")
            .field("agents", &self.agents.len())
            .field("swap_scheduled", &self.swap_scheduled.len())
            .field("swap_epoch", &self.swap_epoch)
            .finish()
    }
}
