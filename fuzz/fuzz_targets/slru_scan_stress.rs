#![no_main]

use libfuzzer_sys::fuzz_target;
use slrukit::policy::slru::{Segment, SlruCache};

// Stress scan resistance with fuzzed interleavings
//
// A promoted hot set must survive any amount of insert-only traffic of
// fresh keys, regardless of how that traffic is shaped.
fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let hot = usize::from(data[0] % 8) + 1;
    let mut cache: SlruCache<u32, u32> = SlruCache::new(hot, 4);

    for key in 0..hot as u32 {
        cache.insert(key, key);
        cache.get(&key);
    }

    for (i, byte) in data[1..].iter().enumerate() {
        let key = 1_000 + u32::from(*byte) + (i as u32) * 256;
        cache.insert(key, key);
    }

    for key in 0..hot as u32 {
        assert_eq!(cache.segment_of(&key), Some(Segment::Protected));
    }
    assert!(!cache.check_sanity());
});
