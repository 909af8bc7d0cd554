//! TTL Cache workload driver
//!
//! Fills a cache and hammers it from several threads with a read-heavy mix of
//! lookups and deletes, then reports throughput and cache statistics.

use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Instant;

use anyhow::Context;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ttl_cache::{TtlCache, WorkloadConfig};

/// Runs the workload described by the `WORKLOAD_*` and `CACHE_TTL_MS`
/// environment variables.
///
/// # Run Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Populate the cache
/// 4. Run reader threads over a shared cursor into the read window
/// 5. Log the summary and print final statistics as JSON
fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ttl_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = WorkloadConfig::from_env().context("invalid workload configuration")?;
    info!(
        "Configuration loaded: keys={}, read_keys={}, threads={}, ops_per_thread={}, delete_every={}, ttl={:?}",
        config.num_keys,
        config.read_keys,
        config.threads,
        config.ops_per_thread,
        config.delete_every,
        config.cache.ttl
    );

    let cache = TtlCache::from_config(&config.cache);
    for i in 0..config.num_keys {
        cache.set(compose_key(i), (i * 357).to_string());
    }
    info!("Cache populated with {} entries", cache.len());

    let read: Vec<String> = (0..config.read_keys).map(compose_key).collect();
    let cursor = AtomicU64::new(0);

    let started = Instant::now();
    thread::scope(|scope| {
        for worker in 0..config.threads {
            let (cache, read, cursor, config) = (&cache, &read, &cursor, &config);
            scope.spawn(move || {
                for _ in 0..config.ops_per_thread {
                    let n = cursor.fetch_add(1, Ordering::Relaxed);
                    let key = &read[(n % read.len() as u64) as usize];
                    cache.get(key);
                    if config.delete_every != 0 && n % config.delete_every as u64 == 0 {
                        cache.delete(key);
                    }
                }
                debug!(worker, "worker finished");
            });
        }
    });
    let elapsed = started.elapsed();

    let total_ops = config.total_ops() as f64;
    let stats = cache.stats();
    info!(
        "Workload finished: {} ops in {:?} ({:.0} ops/s), hit rate {:.2}%",
        total_ops,
        elapsed,
        total_ops / elapsed.as_secs_f64().max(f64::EPSILON),
        stats.hit_rate() * 100.0
    );

    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

/// Builds a fixed-width hexadecimal key for index `i`.
fn compose_key(i: usize) -> String {
    format!("{:016x}", (i as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}
