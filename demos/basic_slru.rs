//! Example demonstrating the SLRU (Segmented LRU) cache.
//!
//! New keys enter a probationary segment; a lookup hit promotes them into a
//! protected segment. Both segments evict from their LRU end.
//!
//! Run with: cargo run --example basic_slru

use std::sync::{Arc, Mutex};

use slrukit::builder::SlruBuilder;
use slrukit::policy::slru::SlruCache;

fn print_sizes<K: Clone + Eq + std::hash::Hash, V>(cache: &SlruCache<K, V>) {
    let sizes = cache.segment_sizes();
    println!(
        "  free={} protected={} probationary={}",
        sizes.free, sizes.protected, sizes.probationary
    );
}

fn main() {
    println!("=== SLRU Cache Example ===\n");

    // 10 protected slots, 10 probationary slots
    let mut cache = SlruCache::new(10, 10);
    println!("Created SLRU cache: capacity={}", cache.capacity());
    print_sizes(&cache);

    for i in 0..10 {
        cache.insert(i.to_string(), format!("value-{i}"));
    }
    println!("\nInserted keys 0-9 (all probationary)");
    print_sizes(&cache);

    for i in 0..10 {
        cache.get(&i.to_string());
    }
    println!("\nLooked up keys 0-9 (all promoted)");
    print_sizes(&cache);

    for i in 10..20 {
        cache.insert(i.to_string(), format!("value-{i}"));
    }
    println!("\nInserted keys 10-19");
    print_sizes(&cache);

    for i in 5..15 {
        cache.get(&i.to_string());
    }
    println!("\nLooked up keys 5-14 (10-14 promoted, 0-4 pushed out of protected)");
    print_sizes(&cache);
    println!("  contains \"0\"? {}", cache.contains(&"0".to_string()));
    println!("  contains \"5\"? {}", cache.contains(&"5".to_string()));

    println!("\n=== Hooks ===\n");

    let log = Arc::new(Mutex::new(Vec::new()));
    let promoted = Arc::clone(&log);
    let evicted = Arc::clone(&log);
    let mut cache = SlruBuilder::new(1, 1)
        .on_promote(move |k: &&str| {
            if let Ok(mut log) = promoted.lock() {
                log.push(format!("promote {k}"));
            }
        })
        .on_evict(move |k: &&str| {
            if let Ok(mut log) = evicted.lock() {
                log.push(format!("evict {k}"));
            }
        })
        .build::<u32>();

    cache.insert("a", 1);
    cache.get(&"a");
    cache.insert("b", 2);
    cache.insert("c", 3);
    cache.get(&"c");
    cache.remove(&"c");

    if let Ok(log) = log.lock() {
        for line in log.iter() {
            println!("  {line}");
        }
    }

    println!("\nSanity check clean? {}", !cache.check_sanity());
}

// Expected output:
// === SLRU Cache Example ===
//
// Created SLRU cache: capacity=20
//   free=20 protected=0 probationary=0
//
// Inserted keys 0-9 (all probationary)
//   free=10 protected=0 probationary=10
//
// Looked up keys 0-9 (all promoted)
//   free=10 protected=10 probationary=0
//
// Inserted keys 10-19
//   free=0 protected=10 probationary=10
//
// Looked up keys 5-14 (10-14 promoted, 0-4 pushed out of protected)
//   free=5 protected=10 probationary=5
//   contains "0"? false
//   contains "5"? true
//
// === Hooks ===
//
//   promote a
//   evict b
//   evict a
//   promote c
//   evict c
//
// Sanity check clean? true
