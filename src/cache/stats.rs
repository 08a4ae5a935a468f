//! Cache Statistics Module
//!
//! Tracks reads, reclamation and dropped writes. Counters are atomics so the
//! read paths can record while holding only the shared lock.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Point-in-time copy of the cache counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Reads that returned a live value
    pub hits: u64,
    /// Reads that found nothing or an expired entry
    pub misses: u64,
    /// Reads that found an entry past its expiry
    pub expired_reads: u64,
    /// Expired entries removed eagerly by `get_or_delete`
    pub lazy_deletions: u64,
    /// Completed sweeps, whatever triggered them
    pub sweeps: u64,
    /// Sweeps triggered inline by reaching the capacity ceiling
    pub capacity_sweeps: u64,
    /// Entries reclaimed by sweeps
    pub swept_entries: u64,
    /// Writes silently dropped because the cache was frozen
    pub dropped_writes: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
}

impl CacheStats {
    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Live counters owned by a `Cache`.
#[derive(Debug, Default)]
pub(crate) struct StatsRecorder {
    hits: AtomicU64,
    misses: AtomicU64,
    expired_reads: AtomicU64,
    lazy_deletions: AtomicU64,
    sweeps: AtomicU64,
    capacity_sweeps: AtomicU64,
    swept_entries: AtomicU64,
    dropped_writes: AtomicU64,
}

impl StatsRecorder {
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// An expired read is also a miss.
    pub(crate) fn record_expired_read(&self) {
        self.expired_reads.fetch_add(1, Ordering::Relaxed);
        self.record_miss();
    }

    pub(crate) fn record_lazy_deletion(&self) {
        self.lazy_deletions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_sweep(&self, reclaimed: usize) {
        self.sweeps.fetch_add(1, Ordering::Relaxed);
        self.swept_entries
            .fetch_add(reclaimed as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_capacity_sweep(&self) {
        self.capacity_sweeps.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped_write(&self) {
        self.dropped_writes.fetch_add(1, Ordering::Relaxed);
    }

    /// Copies the counters; individual fields are not read atomically together.
    pub(crate) fn snapshot(&self, total_entries: usize) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expired_reads: self.expired_reads.load(Ordering::Relaxed),
            lazy_deletions: self.lazy_deletions.load(Ordering::Relaxed),
            sweeps: self.sweeps.load(Ordering::Relaxed),
            capacity_sweeps: self.capacity_sweeps.load(Ordering::Relaxed),
            swept_entries: self.swept_entries.load(Ordering::Relaxed),
            dropped_writes: self.dropped_writes.load(Ordering::Relaxed),
            total_entries,
        }
    }
}
