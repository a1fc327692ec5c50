//! DHAT heap profiler for slrukit.
//!
//! Run with: cargo run --bin dhat_profile --release --features dhat-heap
//! View results: Open dhat-heap.json in <https://nnethercote.github.io/dh_view/dh_view.html>
//!
//! Besides the usual profile, each run reports how many heap blocks were
//! allocated after warm-up. With `u64` keys and values the cache itself
//! should contribute none.

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use slrukit::policy::slru::SlruCache;
use slrukit::traits::CoreCache;

/// Simple XorShift64 RNG for deterministic workloads.
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    fn next_f64(&mut self) -> f64 {
        const SCALE: f64 = 1.0 / (u64::MAX as f64);
        (self.next_u64() as f64) * SCALE
    }
}

/// Hotset workload: 90% of accesses hit 10% of keys.
fn hotset_workload<C: CoreCache<u64, u64>>(cache: &mut C, operations: usize, universe: u64, seed: u64) {
    let mut rng = XorShift64::new(seed);
    let hot_size = ((universe as f64 * 0.1) as u64).max(1);

    for _ in 0..operations {
        let key = if rng.next_f64() < 0.9 {
            rng.next_u64() % hot_size
        } else {
            hot_size + (rng.next_u64() % (universe - hot_size))
        };

        if cache.get(&key).is_none() {
            let _ = cache.insert(key, key);
        }
    }
}

/// Sequential scan over the whole universe.
fn scan_workload<C: CoreCache<u64, u64>>(cache: &mut C, operations: usize, universe: u64) {
    for i in 0..operations {
        let key = (i as u64) % universe;
        if cache.get(&key).is_none() {
            let _ = cache.insert(key, key);
        }
    }
}

/// Insert-only churn through the probationary segment.
fn eviction_churn<C: CoreCache<u64, u64>>(cache: &mut C, operations: usize) {
    for i in 0..operations {
        let _ = cache.insert(i as u64, i as u64);
    }
}

fn profile_slru(label: &str, survivor: usize, probationary: usize) {
    println!("=== Profiling SLRU {label} ({survivor}/{probationary}) ===");
    let operations = 100_000;
    let universe = 16_384;

    let mut cache = SlruCache::new(survivor, probationary);

    // Warm up: fill probationary, promote half of it
    for i in 0..(survivor + probationary) as u64 {
        cache.insert(i, i);
        if i % 2 == 0 {
            cache.get(&i);
        }
    }

    let before = dhat::HeapStats::get();

    hotset_workload(&mut cache, operations, universe, 42);
    scan_workload(&mut cache, operations / 2, universe);
    eviction_churn(&mut cache, operations / 4);

    let after = dhat::HeapStats::get();

    println!("  Final size: {}", cache.len());
    println!("  Segments: {:?}", cache.segment_sizes());
    println!(
        "  Steady-state allocations: {} blocks, {} bytes",
        after.total_blocks - before.total_blocks,
        after.total_bytes - before.total_bytes
    );
    if cache.check_sanity() {
        println!("  Sanity check FAILED");
    }
}

fn main() {
    let _profiler = dhat::Profiler::new_heap();

    println!("slrukit DHAT Heap Profiling");
    println!("===========================\n");

    profile_slru("balanced", 2048, 2048);
    profile_slru("protected-heavy", 3276, 820);
    profile_slru("probationary-heavy", 820, 3276);

    println!("\n===========================");
    println!("Profiling complete!");
    println!(
        "View results: Open dhat-heap.json in <https://nnethercote.github.io/dh_view/dh_view.html>"
    );
}
