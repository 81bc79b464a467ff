//! Two-tier traversal-cost cache with epoch invalidation.
//!
//! [`CostCache`] owns two invalidation-scoped stores plus an overlay
//! layer:
//!
//! - **Durable store** — compressed grids keyed by region, surviving
//!   across steps; swept on a long period so observable regions get
//!   rebuilt from fresh structure data.
//! - **Per-step store** — materialized grids decoded from the durable
//!   store, dropped at every step boundary.
//! - **Agent overlays** — per-step clones of the materialized grid with
//!   occupied cells blocked; never aliased with the store they were
//!   cloned from.
//!
//! The bounded symbol table that backs the compression lives here too:
//! it is append-only while any durable entry exists and resets only
//! when a sweep leaves the durable store empty, which keeps non-frozen
//! entries decodable for their whole lifetime.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod cache;
mod config;
mod metrics;

pub use cache::{CacheError, CostCache};
pub use config::{AreaOverride, CacheConfig, ConfigError, CostOverrides, CostRequest, OverrideMode};
pub use metrics::CacheMetrics;
