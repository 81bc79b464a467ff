//! Navigation configuration and per-request options.

use std::error::Error;
use std::fmt;
use wend_core::{RegionId, SearchLimits};

// ── RouteConfig ────────────────────────────────────────────────────

/// Tuning for [`RouteFinder`](crate::RouteFinder).
#[derive(Clone, Debug, PartialEq)]
pub struct RouteConfig {
    /// Region distance beyond which a region-route is computed before
    /// the cell search. Default: 2.
    pub route_threshold: u32,
    /// Maximum corridor length in regions. Default: 16.
    pub max_route_len: usize,
    /// Region-route weight of an ordinary region. Default: 2.
    pub ordinary_weight: u32,
    /// Region-route weight of a fast-lane region. Default: 1.
    pub fast_lane_weight: u32,
    /// Cost handed to the search for unmodified walkable cells.
    /// Default: 1.
    pub baseline_cost: u8,
    /// Cost handed to the search for unmodified alternate-terrain
    /// cells. Default: 5.
    pub alternate_cost: u8,
    /// Compute ceilings passed through to the search engine.
    pub limits: SearchLimits,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            route_threshold: 2,
            max_route_len: 16,
            ordinary_weight: 2,
            fast_lane_weight: 1,
            baseline_cost: 1,
            alternate_cost: 5,
            limits: SearchLimits::default(),
        }
    }
}

impl RouteConfig {
    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, weight) in [
            ("ordinary_weight", self.ordinary_weight),
            ("fast_lane_weight", self.fast_lane_weight),
        ] {
            if weight == 0 {
                return Err(ConfigError::ZeroRouteWeight { name });
            }
        }
        // The corridor length feeds the search's max_regions ceiling,
        // which is a u8.
        if self.max_route_len == 0 || self.max_route_len > u8::MAX as usize {
            return Err(ConfigError::RouteLenOutOfRange {
                len: self.max_route_len,
            });
        }
        for (name, cost) in [
            ("baseline_cost", self.baseline_cost),
            ("alternate_cost", self.alternate_cost),
        ] {
            if cost == 0 {
                return Err(ConfigError::ZeroSearchCost { name });
            }
        }
        Ok(())
    }
}

// ── FollowConfig ───────────────────────────────────────────────────

/// Tuning for [`PathFollower`](crate::PathFollower).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FollowConfig {
    /// Consecutive stalled steps tolerated before reacting. Default: 2.
    pub stall_threshold: u8,
    /// Probability that a stalled agent reacts on a given step, keeping
    /// many simultaneously stalled agents from retrying in lockstep.
    /// Default: 0.5.
    pub retry_probability: f64,
    /// Seed mixed into the per-step, per-agent retry decision, so runs
    /// with the same seed replay identically. Default: 0.
    pub seed: u64,
}

impl Default for FollowConfig {
    fn default() -> Self {
        Self {
            stall_threshold: 2,
            retry_probability: 0.5,
            seed: 0,
        }
    }
}

impl FollowConfig {
    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.retry_probability.is_finite()
            || !(0.0..=1.0).contains(&self.retry_probability)
        {
            return Err(ConfigError::InvalidRetryProbability {
                value: self.retry_probability,
            });
        }
        Ok(())
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while validating navigation configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConfigError {
    /// Region-route weights must be at least 1.
    ZeroRouteWeight {
        /// Which weight was zero.
        name: &'static str,
    },
    /// `max_route_len` must fit the search's `max_regions` ceiling.
    RouteLenOutOfRange {
        /// The rejected length.
        len: usize,
    },
    /// Search terrain costs of 0 would collide with "unmodified".
    ZeroSearchCost {
        /// Which cost was zero.
        name: &'static str,
    },
    /// `retry_probability` must be a finite value in `[0, 1]`.
    InvalidRetryProbability {
        /// The rejected value.
        value: f64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroRouteWeight { name } => write!(f, "{name} must be at least 1"),
            Self::RouteLenOutOfRange { len } => {
                write!(f, "max_route_len {len} outside [1, 255]")
            }
            Self::ZeroSearchCost { name } => write!(f, "{name} must be non-zero"),
            Self::InvalidRetryProbability { value } => {
                write!(f, "retry_probability must be in [0.0, 1.0], got {value}")
            }
        }
    }
}

impl Error for ConfigError {}

// ── RouteRequest ───────────────────────────────────────────────────

/// Per-call options for [`RouteFinder::find_path`](crate::RouteFinder::find_path).
#[derive(Clone, Debug, Default)]
pub struct RouteRequest {
    /// Explicit goal tolerance; when absent the finder derives one from
    /// the goal cell's terrain, observability, and occupancy.
    pub tolerance: Option<u8>,
    /// Treat cells occupied by other agents as blocked.
    pub track_agents: bool,
    /// Regions the route and the search must never enter.
    pub avoid: Vec<RegionId>,
    /// Search away from the goal instead of toward it.
    pub flee: bool,
}
