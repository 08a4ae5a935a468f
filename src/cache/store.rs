//! Cache Store Module
//!
//! Main cache engine: a `HashMap` behind one reader/writer lock, per-entry
//! expiry, a two-phase sweep and a one-way freeze flag.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::cache::stats::StatsRecorder;
use crate::cache::{CacheEntry, CacheStats, Snapshot, SnapshotEntry, DEFAULT_MAX_ENTRIES};
use crate::config::Config;
use crate::error::Result;
use crate::tasks::Janitor;

// == Cache ==
/// Concurrent key/value store where every entry expires.
///
/// Reads (`get`, the scan phase of `sweep`, `len`) share the lock; mutations
/// (`set`, `delete`, the delete phase of `sweep`) take it exclusively. The
/// freeze flag lives outside the lock so a frozen `set` returns without
/// contending for it.
///
/// No operation fails: absence and expiry are reported as `None`.
#[derive(Debug)]
pub struct Cache {
    /// Key-value storage
    entries: RwLock<HashMap<String, CacheEntry>>,
    /// Lifetime used by `insert` and by the janitor cadence
    default_ttl: Duration,
    /// Capacity ceiling used by `insert`
    max_entries: usize,
    /// One-way read-only flag
    frozen: AtomicBool,
    /// Performance statistics
    stats: StatsRecorder,
}

impl Cache {
    // == Constructor ==
    /// Creates an empty cache without a janitor.
    pub fn new(default_ttl: Duration) -> Self {
        Self::with_capacity_hint(default_ttl, DEFAULT_MAX_ENTRIES)
    }

    /// Creates an empty cache whose `insert` path uses `max_entries`.
    pub fn with_capacity_hint(default_ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_ttl,
            max_entries,
            frozen: AtomicBool::new(false),
            stats: StatsRecorder::default(),
        }
    }

    /// Creates an empty cache from configuration. The janitor flag is not
    /// consulted here; see [`Cache::new_with_janitor`].
    pub fn from_config(config: &Config) -> Self {
        Self::with_capacity_hint(config.default_ttl(), config.max_entries)
    }

    /// Creates a cache paired with a running janitor.
    ///
    /// The janitor sweeps every `2 × default_ttl` until stopped or until the
    /// cache is dropped. Must be called from within a Tokio runtime.
    pub fn new_with_janitor(default_ttl: Duration) -> Result<(Arc<Self>, Janitor)> {
        let cache = Arc::new(Self::new(default_ttl));
        let janitor = Janitor::spawn(&cache)?;
        Ok((cache, janitor))
    }

    // == Set ==
    /// Stores `value` under `key`, expiring `ttl` from now.
    ///
    /// A frozen cache drops the write without signalling it. When the cache
    /// already holds `max_entries` or more entries, a sweep runs first; the
    /// insert happens regardless of how much it reclaimed, so the ceiling is
    /// advisory. Overwriting replaces the value and resets the expiry.
    pub fn set(
        &self,
        key: impl Into<String>,
        value: impl Into<String>,
        max_entries: usize,
        ttl: Duration,
    ) {
        debug_assert!(max_entries > 0, "max_entries must be greater than zero");

        if self.is_frozen() {
            self.stats.record_dropped_write();
            return;
        }

        if self.len() >= max_entries {
            self.stats.record_capacity_sweep();
            self.sweep();
        }

        let mut entries = self.entries.write();
        // Re-checked under the lock so no write lands after `freeze` returns.
        if self.is_frozen() {
            self.stats.record_dropped_write();
            return;
        }
        entries.insert(key.into(), CacheEntry::new(value.into(), ttl));
    }

    /// Stores `value` using the cache's default TTL and capacity ceiling.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.set(key, value, self.max_entries, self.default_ttl);
    }

    // == Get ==
    /// Returns a copy of the value if present and not expired.
    ///
    /// Expired entries are left in place for a sweep or `get_or_delete`.
    pub fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read();
        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                self.stats.record_expired_read();
                None
            }
            Some(entry) => {
                self.stats.record_hit();
                Some(entry.value.clone())
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Get Or Delete ==
    /// Like [`Cache::get`], but removes the key when it is found expired.
    ///
    /// The lookup and the removal take the lock separately. A `set` on the
    /// same key that lands between them is removed too.
    pub fn get_or_delete(&self, key: &str) -> Option<String> {
        {
            let entries = self.entries.read();
            match entries.get(key) {
                None => {
                    self.stats.record_miss();
                    return None;
                }
                Some(entry) if !entry.is_expired() => {
                    self.stats.record_hit();
                    return Some(entry.value.clone());
                }
                Some(_) => self.stats.record_expired_read(),
            }
        }

        if self.delete(key) {
            self.stats.record_lazy_deletion();
        }
        None
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether anything was removed.
    pub fn delete(&self, key: &str) -> bool {
        self.entries.write().remove(key).is_some()
    }

    // == Sweep ==
    /// Removes every entry expired at the moment the scan starts.
    ///
    /// Keys are collected under the shared lock and removed under the
    /// exclusive lock. An entry expiring during the scan survives until the
    /// next sweep. A collected key overwritten between the two phases holds a
    /// fresh entry and is kept.
    ///
    /// Returns the number of entries removed.
    pub fn sweep(&self) -> usize {
        let scan_start = Instant::now();

        let expired_keys: Vec<String> = {
            let entries = self.entries.read();
            entries
                .iter()
                .filter(|(_, entry)| entry.is_expired_at(scan_start))
                .map(|(key, _)| key.clone())
                .collect()
        };

        let mut removed = 0;
        if !expired_keys.is_empty() {
            let mut entries = self.entries.write();
            for key in &expired_keys {
                let still_expired = entries
                    .get(key)
                    .is_some_and(|entry| entry.is_expired_at(scan_start));
                if still_expired {
                    entries.remove(key);
                    removed += 1;
                }
            }
        }

        self.stats.record_sweep(removed);
        if removed > 0 {
            debug!(removed, "Sweep reclaimed expired entries");
        }
        removed
    }

    // == Freeze ==
    /// Switches the cache to read-only. Later `set` calls are dropped.
    ///
    /// Idempotent and irreversible. When this returns, any `set` that was
    /// already inserting has finished.
    pub fn freeze(&self) {
        if !self.frozen.swap(true, Ordering::AcqRel) {
            // Waits out any writer that passed the flag check before the swap.
            drop(self.entries.write());
            info!("Cache frozen; further writes will be dropped");
        }
    }

    /// Returns true once [`Cache::freeze`] has been called.
    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    /// Freezes the cache, then captures its live entries.
    pub fn freeze_and_snapshot(&self) -> Snapshot {
        self.freeze();
        self.snapshot()
    }

    // == Snapshot ==
    /// Copies every live entry under the shared lock.
    pub fn snapshot(&self) -> Snapshot {
        let frozen = self.is_frozen();
        let entries = self.entries.read();
        let now = Instant::now();

        let entries = entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired_at(now))
            .map(|(key, entry)| SnapshotEntry {
                key: key.clone(),
                value: entry.value.clone(),
                ttl_remaining: entry.expires_at.saturating_duration_since(now),
            })
            .collect();

        Snapshot {
            taken_at: Utc::now(),
            frozen,
            entries,
        }
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.len())
    }

    // == Length ==
    /// Returns the number of stored entries, expired-but-unswept included.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    // == Is Empty ==
    /// Returns true if no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Lifetime used by `insert`; the janitor sweeps every twice this.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Capacity ceiling used by `insert`.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    #[cfg(test)]
    pub(crate) fn contains_raw(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    const LONG: Duration = Duration::from_secs(300);

    #[test]
    fn test_cache_new() {
        let cache = Cache::new(LONG);
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
        assert!(!cache.is_frozen());
        assert_eq!(cache.default_ttl(), LONG);
    }

    #[test]
    fn test_set_and_get() {
        let cache = Cache::new(LONG);

        cache.set("key1", "value1", 100, LONG);

        assert_eq!(cache.get("key1").as_deref(), Some("value1"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_get_nonexistent() {
        let cache = Cache::new(LONG);
        assert!(cache.get("nonexistent").is_none());
        assert!(cache.get_or_delete("nonexistent").is_none());
    }

    #[test]
    fn test_overwrite_replaces_value_and_resets_expiry() {
        let cache = Cache::new(LONG);

        cache.set("key1", "value1", 100, Duration::ZERO);
        assert!(cache.get("key1").is_none());

        cache.set("key1", "value2", 100, LONG);
        assert_eq!(cache.get("key1").as_deref(), Some("value2"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_insert_uses_defaults() {
        let cache = Cache::with_capacity_hint(LONG, 2);
        assert_eq!(cache.max_entries(), 2);

        cache.insert("a", "1");
        cache.insert("b", "2");
        cache.insert("c", "3");

        assert_eq!(cache.get("c").as_deref(), Some("3"));
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_get_does_not_remove_expired() {
        let cache = Cache::new(LONG);
        cache.set("stale", "v", 100, Duration::ZERO);

        assert!(cache.get("stale").is_none());
        assert!(cache.contains_raw("stale"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_get_or_delete_removes_expired() {
        let cache = Cache::new(LONG);
        cache.set("stale", "v", 100, Duration::ZERO);

        assert!(cache.get_or_delete("stale").is_none());
        assert!(!cache.contains_raw("stale"));
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.stats().lazy_deletions, 1);
    }

    #[test]
    fn test_get_or_delete_returns_live_value() {
        let cache = Cache::new(LONG);
        cache.set("live", "v", 100, LONG);

        assert_eq!(cache.get_or_delete("live").as_deref(), Some("v"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_delete() {
        let cache = Cache::new(LONG);
        cache.set("key1", "value1", 100, LONG);

        assert!(cache.delete("key1"));
        assert!(cache.is_empty());
        assert!(cache.get("key1").is_none());
    }

    #[test]
    fn test_delete_nonexistent() {
        let cache = Cache::new(LONG);
        assert!(!cache.delete("nonexistent"));
    }

    #[test]
    fn test_ttl_expiration() {
        let cache = Cache::new(LONG);
        cache.set("a", "1", 100, Duration::from_millis(50));

        sleep(Duration::from_millis(10));
        assert_eq!(cache.get("a").as_deref(), Some("1"));

        sleep(Duration::from_millis(60));
        assert!(cache.get("a").is_none());

        assert_eq!(cache.sweep(), 1);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_sweep_keeps_live_entries() {
        let cache = Cache::new(LONG);
        cache.set("dead1", "v", 100, Duration::ZERO);
        cache.set("dead2", "v", 100, Duration::ZERO);
        cache.set("live", "v", 100, LONG);

        assert_eq!(cache.sweep(), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("live").as_deref(), Some("v"));

        let stats = cache.stats();
        assert_eq!(stats.sweeps, 1);
        assert_eq!(stats.swept_entries, 2);
    }

    #[test]
    fn test_sweep_on_empty_cache() {
        let cache = Cache::new(LONG);
        assert_eq!(cache.sweep(), 0);
    }

    #[test]
    fn test_capacity_triggers_sweep() {
        let cache = Cache::new(LONG);
        for i in 0..5 {
            cache.set(format!("dead{i}"), "v", 5, Duration::ZERO);
        }
        assert_eq!(cache.len(), 5);

        cache.set("fresh", "v", 5, LONG);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("fresh").as_deref(), Some("v"));
        assert_eq!(cache.stats().capacity_sweeps, 1);
    }

    #[test]
    fn test_capacity_is_advisory() {
        let cache = Cache::new(LONG);
        for i in 0..5 {
            cache.set(format!("live{i}"), "v", 5, LONG);
        }

        cache.set("extra", "v", 5, LONG);

        assert_eq!(cache.len(), 6);
        assert_eq!(cache.get("extra").as_deref(), Some("v"));
    }

    #[test]
    fn test_freeze_drops_writes() {
        let cache = Cache::new(LONG);
        cache.set("a", "1", 100, LONG);

        cache.freeze();
        cache.set("a", "2", 100, LONG);
        cache.set("b", "3", 100, LONG);
        cache.insert("c", "4");

        assert!(cache.is_frozen());
        assert_eq!(cache.get("a").as_deref(), Some("1"));
        assert!(cache.get("b").is_none());
        assert!(cache.get("c").is_none());
        assert_eq!(cache.stats().dropped_writes, 3);
    }

    #[test]
    fn test_freeze_is_idempotent() {
        let cache = Cache::new(LONG);
        cache.freeze();
        cache.freeze();
        cache.freeze();

        cache.set("a", "1", 100, LONG);
        assert!(cache.is_frozen());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_frozen_cache_still_reads_and_deletes() {
        let cache = Cache::new(LONG);
        cache.set("a", "1", 100, LONG);
        cache.set("stale", "v", 100, Duration::ZERO);
        cache.freeze();

        assert_eq!(cache.get("a").as_deref(), Some("1"));
        assert_eq!(cache.sweep(), 1);
        assert!(cache.delete("a"));
    }

    #[test]
    fn test_freeze_is_per_instance() {
        let frozen = Cache::new(LONG);
        let open = Cache::new(LONG);
        frozen.freeze();

        open.set("a", "1", 100, LONG);
        assert_eq!(open.get("a").as_deref(), Some("1"));
        assert!(!open.is_frozen());
    }

    #[test]
    fn test_snapshot_excludes_expired() {
        let cache = Cache::new(LONG);
        cache.set("live", "1", 100, LONG);
        cache.set("stale", "2", 100, Duration::ZERO);

        let snapshot = cache.freeze_and_snapshot();

        assert!(snapshot.frozen);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get("live"), Some("1"));
        assert!(snapshot.get("stale").is_none());
        assert!(snapshot.entries[0].ttl_remaining <= LONG);
    }

    #[test]
    fn test_stats_track_reads() {
        let cache = Cache::new(LONG);
        cache.set("a", "1", 100, LONG);
        cache.set("stale", "2", 100, Duration::ZERO);

        cache.get("a");
        cache.get("missing");
        cache.get("stale");

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.expired_reads, 1);
        assert_eq!(stats.total_entries, 2);
    }
}
