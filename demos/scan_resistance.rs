//! Compares how a hot working set survives a one-pass scan.
//!
//! A hot set is inserted and read once, which promotes it. A long scan of
//! never-repeated keys then only cycles through the probationary segment.
//!
//! Run with: cargo run --example scan_resistance

use slrukit::policy::slru::{Segment, SlruCache};

fn main() {
    let hot: Vec<u64> = (0..16).collect();
    let mut cache = SlruCache::new(16, 8);

    for &key in &hot {
        cache.insert(key, key * 10);
        cache.get(&key);
    }
    println!("Promoted hot set of {} keys", hot.len());

    let scan = 1_000..11_000u64;
    let scan_len = scan.end - scan.start;
    for key in scan {
        if cache.get(&key).is_none() {
            cache.insert(key, key);
        }
    }
    println!("Scanned {scan_len} one-time keys");

    let survivors = hot
        .iter()
        .filter(|k| cache.segment_of(k) == Some(Segment::Protected))
        .count();
    println!("Hot keys still protected: {survivors}/{}", hot.len());

    let tail: Vec<u64> = cache.iter_probationary().map(|(k, _)| *k).collect();
    println!("Probationary (MRU first): {tail:?}");

    let mut hits = 0;
    for &key in &hot {
        if cache.get(&key).is_some() {
            hits += 1;
        }
    }
    println!("Hot set hit rate after scan: {hits}/{}", hot.len());
}

// Expected output:
// Promoted hot set of 16 keys
// Scanned 10000 one-time keys
// Hot keys still protected: 16/16
// Probationary (MRU first): [10999, 10998, 10997, 10996, 10995, 10994, 10993, 10992]
// Hot set hit rate after scan: 16/16
