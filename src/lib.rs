//! Expiring Cache - an in-process key/value store with per-entry expiry
//!
//! Entries expire lazily on read and are reclaimed by sweeps, triggered either
//! inline when a capacity ceiling is reached or by a background janitor. A
//! cache can be frozen once, after which writes are silently dropped.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{Cache, CacheStats, Snapshot};
pub use config::Config;
pub use error::{CacheError, Result};
pub use tasks::Janitor;
