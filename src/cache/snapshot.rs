//! Snapshot Module
//!
//! An owned copy of the live entries, meant to be taken once the cache is frozen.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Snapshot ==
/// Owned copy of every live entry at the time it was taken.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// Wall-clock time the snapshot was taken
    pub taken_at: DateTime<Utc>,
    /// Whether the cache was frozen when the snapshot was taken
    pub frozen: bool,
    /// Live entries, in no particular order
    pub entries: Vec<SnapshotEntry>,
}

/// One live entry inside a [`Snapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotEntry {
    pub key: String,
    pub value: String,
    /// Lifetime left when the snapshot was taken
    pub ttl_remaining: Duration,
}

impl Snapshot {
    /// Number of entries captured.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up a captured value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.value.as_str())
    }
}
