//! Janitor Task
//!
//! Background task that periodically sweeps expired cache entries.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::Cache;
use crate::error::{CacheError, Result};

/// Handle to a running janitor.
///
/// The janitor waits `2 × default_ttl`, sweeps, and repeats. It holds only a
/// weak reference to its cache and exits on its own once the cache is
/// dropped. Dropping the handle cancels the task without waiting for it.
///
/// # Example
/// ```ignore
/// let (cache, janitor) = Cache::new_with_janitor(Duration::from_millis(20))?;
/// cache.insert("key", "value");
/// // Later, during shutdown:
/// janitor.stop().await?;
/// ```
#[derive(Debug)]
pub struct Janitor {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
    interval: Duration,
}

impl Janitor {
    /// Spawns a janitor for `cache` on the current Tokio runtime.
    ///
    /// # Errors
    /// - [`CacheError::NoRuntime`] when called outside a Tokio runtime
    /// - [`CacheError::InvalidConfig`] when the cache's default TTL is zero,
    ///   which would make the sweep loop spin
    pub fn spawn(cache: &Arc<Cache>) -> Result<Self> {
        let interval = cache.default_ttl().saturating_mul(2);
        if interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "janitor requires a non-zero default TTL".to_string(),
            ));
        }

        let runtime = Handle::try_current().map_err(|_| CacheError::NoRuntime)?;
        let cancel = CancellationToken::new();
        let handle = runtime.spawn(run(Arc::downgrade(cache), interval, cancel.clone()));

        info!(interval_ms = interval.as_millis() as u64, "Janitor started");

        Ok(Self {
            cancel,
            handle: Some(handle),
            interval,
        })
    }

    /// Time between sweeps.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns true while the background task has not finished.
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Cancels the janitor and waits for its task to finish.
    ///
    /// # Errors
    /// Returns [`CacheError::JanitorJoin`] if the task panicked.
    pub async fn stop(mut self) -> Result<()> {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            handle.await?;
        }
        info!("Janitor stopped");
        Ok(())
    }
}

impl Drop for Janitor {
    fn drop(&mut self) {
        if !self.cancel.is_cancelled() {
            warn!("Janitor dropped while running; cancelling");
            self.cancel.cancel();
        }
    }
}

async fn run(cache: Weak<Cache>, interval: Duration, cancel: CancellationToken) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Janitor cancelled");
                break;
            }
            _ = tokio::time::sleep(interval) => {
                let Some(cache) = cache.upgrade() else {
                    debug!("Cache dropped; janitor exiting");
                    break;
                };

                let removed = cache.sweep();
                if removed > 0 {
                    info!("Janitor sweep: removed {} expired entries", removed);
                } else {
                    debug!("Janitor sweep: no expired entries found");
                }
            }
        }
    }
}
