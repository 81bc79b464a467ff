//! Route restriction and per-agent path following.
//!
//! Two services sit here, composed by the host once per step:
//!
//! - [`RouteFinder`] narrows the cell-level search to a bounded corridor
//!   of regions when origin and destination are far apart, derives the
//!   goal tolerance, and retries once with a corridor when an
//!   unrestricted search comes back incomplete.
//! - [`PathFollower`] owns the per-agent automaton: it caches planned
//!   move sequences, verifies actual progress against the predicted
//!   position each step, and on stall either swaps with the blocking
//!   agent or forces a replan — without discarding routes that are
//!   still good.
//!
//! Neither service knows how the search works; both drive it through
//! the [`SearchEngine`](wend_core::SearchEngine) contract with costs
//! served by [`CostCache`](wend_cache::CostCache).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod follow;
mod route;

pub use config::{ConfigError, FollowConfig, RouteConfig, RouteRequest};
pub use error::NavError;
pub use follow::{AgentPathState, FollowMetrics, FollowState, PathFollower};
pub use route::{region_route, RouteFinder, RouteOutcome};
