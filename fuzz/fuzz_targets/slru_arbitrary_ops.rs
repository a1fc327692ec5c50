#![no_main]

use libfuzzer_sys::fuzz_target;
use slrukit::policy::slru::{Segment, SlruCache};

// Fuzz arbitrary operation sequences on SlruCache
//
// The first two bytes pick the segment capacities; every following pair is
// (op, key). The full invariant check runs after every operation.
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let survivor = usize::from(data[0] % 16) + 1;
    let probationary = usize::from(data[1] % 16) + 1;
    let mut cache: SlruCache<u8, u32> = SlruCache::new(survivor, probationary);

    for chunk in data[2..].chunks_exact(2) {
        let op = chunk[0] % 8;
        let key = chunk[1] % 64;

        match op {
            0 | 1 => {
                // insert
                let was_present = cache.contains(&key);
                let old_segment = cache.segment_of(&key);
                cache.insert(key, u32::from(key) * 3);

                assert!(cache.contains(&key));
                if was_present {
                    assert_eq!(cache.segment_of(&key), old_segment);
                } else {
                    assert_eq!(cache.segment_of(&key), Some(Segment::Probationary));
                }
            }
            2 | 3 => {
                // get
                let expected = cache.peek(&key).copied();
                assert_eq!(cache.get(&key).copied(), expected);
                if expected.is_some() {
                    assert_eq!(cache.segment_of(&key), Some(Segment::Protected));
                    let (first, _) = cache.iter_protected().next().unwrap();
                    assert_eq!(*first, key);
                }
            }
            4 => {
                // remove
                let was_present = cache.contains(&key);
                assert_eq!(cache.remove(&key), was_present);
                assert!(!cache.contains(&key));
            }
            5 => {
                // pop_probationary
                let before = cache.probationary_len();
                let popped = cache.pop_probationary();
                assert_eq!(popped.is_some(), before > 0);
            }
            6 => {
                // pop_protected
                let before = cache.protected_len();
                let popped = cache.pop_protected();
                assert_eq!(popped.is_some(), before > 0);
            }
            7 => {
                // clear (rarely)
                if key == 0 {
                    cache.clear();
                    assert!(cache.is_empty());
                }
            }
            _ => unreachable!(),
        }

        assert!(cache.protected_len() <= survivor);
        assert!(cache.probationary_len() <= probationary);
        assert_eq!(cache.segment_sizes().total(), survivor + probationary);
        assert!(cache.check_invariants().is_ok());
    }
});
