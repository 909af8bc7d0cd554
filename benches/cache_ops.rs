use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;
use ttl_cache::TtlCache;

const NUM_KEYS: usize = 30_000;
const NUM_KEYS_TO_READ: usize = 10_000;
const OPS_PER_THREAD: u64 = 10_000;

fn compose_key(i: usize) -> String {
    format!("{:016x}", (i as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

fn populated(ttl: Option<Duration>) -> TtlCache<String> {
    let cache = match ttl {
        Some(ttl) => TtlCache::with_ttl(ttl),
        None => TtlCache::new(),
    };
    for i in 0..NUM_KEYS {
        cache.set(compose_key(i), (i * 357).to_string());
    }
    cache
}

// --- Single-threaded lookups ---

fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("get");
    group.throughput(Throughput::Elements(1));

    for (label, ttl) in [("plain", None), ("ttl", Some(Duration::from_secs(3600)))] {
        let cache = populated(ttl);
        let key = compose_key(NUM_KEYS / 2);
        group.bench_function(BenchmarkId::new("hit", label), |b| {
            b.iter(|| black_box(cache.get(black_box(&key))))
        });
        group.bench_function(BenchmarkId::new("miss", label), |b| {
            b.iter(|| black_box(cache.get(black_box("absent"))))
        });
    }

    group.finish();
}

fn bench_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("set");
    group.throughput(Throughput::Elements(1));

    for (label, ttl) in [("plain", None), ("ttl", Some(Duration::from_secs(3600)))] {
        let cache = populated(ttl);
        let mut i = 0usize;
        group.bench_function(BenchmarkId::from_parameter(label), |b| {
            b.iter(|| {
                i = (i + 1) % NUM_KEYS;
                cache.set(compose_key(i), String::from("value"));
            })
        });
    }

    group.finish();
}

// --- Parallel get/delete mix over a shared cursor ---

fn bench_parallel_mix(c: &mut Criterion) {
    let mut group = c.benchmark_group("parallel_get_delete");
    let read: Vec<String> = (0..NUM_KEYS_TO_READ).map(compose_key).collect();

    for threads in [1usize, 2, 4, 8] {
        group.throughput(Throughput::Elements(threads as u64 * OPS_PER_THREAD));
        group.bench_with_input(BenchmarkId::from_parameter(threads), &threads, |b, &threads| {
            b.iter_batched(
                || populated(None),
                |cache| {
                    let cursor = AtomicU64::new(0);
                    thread::scope(|scope| {
                        for _ in 0..threads {
                            scope.spawn(|| {
                                for _ in 0..OPS_PER_THREAD {
                                    let n = cursor.fetch_add(1, Ordering::Relaxed);
                                    let key = &read[(n % NUM_KEYS_TO_READ as u64) as usize];
                                    black_box(cache.get(key));
                                    if n % 10 == 0 {
                                        cache.delete(key);
                                    }
                                }
                            });
                        }
                    });
                    cache
                },
                criterion::BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_get, bench_set, bench_parallel_mix);
criterion_main!(benches);
