//! Expiring Cache demo driver
//!
//! Hammers one shared cache with concurrent writers and readers on random
//! keys, then reports elapsed time and how many entries survived.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use rand::Rng;
use tokio::task::JoinHandle;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use expiring_cache::{Cache, Config, Janitor};

/// Main entry point for the demo driver.
///
/// # Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load and validate configuration from environment variables
/// 3. Create the cache, paired with a janitor unless disabled
/// 4. Start writers, then readers shortly after, and wait for both
/// 5. Report elapsed time, surviving entries and statistics
/// 6. Freeze the cache, take a snapshot and stop the janitor
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "expiring_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    config.validate()?;
    info!(
        "Configuration loaded: default_ttl={}ms, max_entries={}, janitor={}, writers={}, readers={}, key_space={}",
        config.default_ttl_ms,
        config.max_entries,
        config.janitor,
        config.writers,
        config.readers,
        config.key_space
    );

    let cache = Arc::new(Cache::from_config(&config));
    let janitor = if config.janitor {
        Some(Janitor::spawn(&cache)?)
    } else {
        None
    };

    let start = Instant::now();

    info!("Start writing to the cache");
    let writers = spawn_workers(config.writers, |_| {
        let cache = Arc::clone(&cache);
        let (ops, key_space) = (config.writes_per_worker, config.key_space);
        move || write_random(&cache, ops, key_space)
    });

    tokio::time::sleep(Duration::from_millis(1)).await;

    info!("Start reading from the cache");
    let readers = spawn_workers(config.readers, |_| {
        let cache = Arc::clone(&cache);
        let (ops, key_space) = (config.reads_per_worker, config.key_space);
        move || read_random(&cache, ops, key_space)
    });

    let written: usize = join_all(writers).await?.into_iter().sum();
    info!(written, "Finished writing");
    let hits: usize = join_all(readers).await?.into_iter().sum();
    info!(hits, "Finished reading");

    info!("{} items remained in the cache", cache.len());
    info!("Total exec time: {} milliseconds", start.elapsed().as_millis());

    let stats = serde_json::to_string(&cache.stats()).context("serializing cache stats")?;
    info!("Cache stats: {}", stats);

    let snapshot = cache.freeze_and_snapshot();
    info!(
        "Snapshot taken at {}: {} live entries",
        snapshot.taken_at.to_rfc3339(),
        snapshot.len()
    );

    if let Some(janitor) = janitor {
        janitor.stop().await?;
    }

    Ok(())
}

/// Spawns `count` blocking workers built by `make`.
fn spawn_workers<F, W>(count: usize, mut make: F) -> Vec<JoinHandle<usize>>
where
    F: FnMut(usize) -> W,
    W: FnOnce() -> usize + Send + 'static,
{
    (0..count)
        .map(|i| tokio::task::spawn_blocking(make(i)))
        .collect()
}

async fn join_all(handles: Vec<JoinHandle<usize>>) -> anyhow::Result<Vec<usize>> {
    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(handle.await.context("worker panicked")?);
    }
    Ok(results)
}

/// Writes `ops` random keys, each holding its own name. Returns the count.
fn write_random(cache: &Cache, ops: usize, key_space: u32) -> usize {
    let mut rng = rand::thread_rng();
    for _ in 0..ops {
        let key = rng.gen_range(0..key_space).to_string();
        cache.insert(key.clone(), key);
    }
    ops
}

/// Reads `ops` random keys. Returns how many were found live.
fn read_random(cache: &Cache, ops: usize, key_space: u32) -> usize {
    let mut rng = rand::thread_rng();
    (0..ops)
        .filter(|_| {
            let key = rng.gen_range(0..key_space).to_string();
            cache.get(&key).is_some()
        })
        .count()
}
