//! Cache Module
//!
//! Provides the in-memory store with per-entry expiry, sweeping and freezing.

mod entry;
mod snapshot;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use snapshot::{Snapshot, SnapshotEntry};
pub use stats::CacheStats;
pub use store::Cache;

// == Public Constants ==
/// Capacity ceiling used by `Cache::insert` when none is configured
pub const DEFAULT_MAX_ENTRIES: usize = 1000;
