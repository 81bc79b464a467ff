//! Wend: traversal-cost caching and path following for agents moving
//! across a region-tiled 2-D world.
//!
//! This is the top-level facade crate that re-exports the public API
//! from all wend sub-crates. For most users, adding `wend` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use wend::prelude::*;
//!
//! // A minimal host world: fully walkable, nothing in it.
//! struct OpenWorld;
//! impl WorldQuery for OpenWorld {
//!     fn terrain_mask(&self, _: RegionId) -> TerrainMask { TerrainMask::open() }
//!     fn obstacles(&self, _: RegionId) -> Vec<Obstacle> { Vec::new() }
//!     fn agents(&self, _: RegionId) -> Vec<(u8, u8)> { vec![(4, 4)] }
//!     fn agent_at(&self, _: Position) -> Option<AgentSighting> { None }
//!     fn observable(&self, _: RegionId) -> bool { true }
//!     fn classification(&self, _: RegionId) -> RegionClass { RegionClass::Ordinary }
//! }
//!
//! let mut cache = CostCache::new(CostOverrides::default(), CacheConfig::default()).unwrap();
//! let region = RegionId::new(0, 0);
//!
//! // Shared per-step grid: every cell at its baseline.
//! let grid = cache
//!     .costs(&OpenWorld, StepId(1), region, &CostRequest::default())
//!     .unwrap();
//! assert!(grid.is_all_zero());
//!
//! // Tracking requests get a per-step clone with occupants blocked.
//! let tracked = cache
//!     .costs(
//!         &OpenWorld,
//!         StepId(1),
//!         region,
//!         &CostRequest { track_agents: true, ..CostRequest::default() },
//!     )
//!     .unwrap();
//! assert_eq!(tracked.get(4, 4).unwrap(), COST_BLOCKED);
//! assert_eq!(grid.get(4, 4).unwrap(), 0);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in
//! the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `wend-core` | IDs, positions, grids, collaborator traits |
//! | [`codec`] | `wend-codec` | Symbol table, compressed-grid wire format |
//! | [`terrain`] | `wend-terrain` | Memoized terrain oracle |
//! | [`cache`] | `wend-cache` | Two-tier cost cache, overrides, metrics |
//! | [`nav`] | `wend-nav` | Route finder, path follower, automaton |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub use wend_cache as cache;
pub use wend_codec as codec;
pub use wend_core as types;
pub use wend_nav as nav;
pub use wend_terrain as terrain;

/// The most commonly used types, re-exported flat.
pub mod prelude {
    pub use wend_cache::{
        AreaOverride, CacheConfig, CacheMetrics, CostCache, CostOverrides, CostRequest,
        OverrideMode,
    };
    pub use wend_codec::{decode, encode, CompressedGrid, SymbolTable};
    pub use wend_core::{
        AgentId, AgentSighting, CostGrid, Direction, MoveSeq, Obstacle, ObstacleKind, PackedPos,
        Position, RegionClass, RegionId, SearchEngine, SearchGoal, SearchLimits, SearchRequest,
        SearchResult, StepId, SwapCommander, TerrainMask, WorldQuery, COST_BLOCKED, REGION_DIM,
    };
    pub use wend_nav::{
        FollowConfig, FollowState, NavError, PathFollower, RouteConfig, RouteFinder, RouteRequest,
    };
    pub use wend_terrain::TerrainOracle;
}
