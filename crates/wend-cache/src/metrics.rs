//! Cumulative counters for cache behavior.

/// Counters populated by [`CostCache`](crate::CostCache), readable by
/// the host after any step for telemetry and budget decisions.
///
/// All counters are cumulative over the cache's lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheMetrics {
    /// Durable rebuilds (missing entry or forced refresh).
    pub rebuilds: u64,
    /// Durable-entry decodes into the per-step store.
    pub decodes: u64,
    /// Requests answered straight from the per-step store.
    pub step_hits: u64,
    /// Agent overlays cloned and populated.
    pub overlay_builds: u64,
    /// Requests answered from an existing overlay.
    pub overlay_hits: u64,
    /// Durable-store sweeps executed.
    pub sweeps: u64,
    /// Durable entries dropped by sweeps.
    pub swept_entries: u64,
    /// Symbol-table resets (durable store emptied).
    pub table_resets: u64,
    /// Cells left unencoded because the symbol table was full.
    pub skipped_symbols: u64,
}
