//! Background Tasks Module
//!
//! Contains background tasks that run alongside a cache.
//!
//! # Tasks
//! - Janitor: sweeps expired entries every twice the cache's default TTL

mod janitor;

pub use janitor::Janitor;
