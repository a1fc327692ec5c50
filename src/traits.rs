//! # Cache Trait Hierarchy
//!
//! A small, policy-neutral interface so that callers can be written against
//! "a cache" rather than against [`SlruCache`](crate::policy::slru::SlruCache)
//! directly (workload drivers, benches, the heap profiler).
//!
//! ```text
//!   ┌──────────────────────────────┐
//!   │     ReadOnlyCache<K, V>      │   contains / len / is_empty / capacity
//!   └──────────────┬───────────────┘
//!                  ▼
//!   ┌──────────────────────────────┐
//!   │       CoreCache<K, V>        │   insert → Option<V> / get / clear
//!   └──────────────┬───────────────┘
//!                  ▼
//!   ┌──────────────────────────────┐
//!   │      MutableCache<K, V>      │   remove → Option<V> / remove_batch
//!   └──────────────────────────────┘
//! ```
//!
//! ## Thread Safety
//!
//! None of these traits imply synchronization. Wrap implementations in a lock
//! (or use `ConcurrentSlruCache` with the `concurrency` feature) for shared
//! access.

/// Read-only cache inspection that never changes eviction order.
pub trait ReadOnlyCache<K, V> {
    /// Checks if a key exists without updating access state.
    fn contains(&self, key: &K) -> bool;

    /// Returns the current number of entries in the cache.
    fn len(&self) -> usize;

    /// Returns `true` if the cache contains no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the maximum number of entries the cache can hold.
    fn capacity(&self) -> usize;
}

/// Core cache operations that all caches support.
///
/// # Example
///
/// ```
/// use slrukit::traits::{CoreCache, ReadOnlyCache};
/// use slrukit::policy::slru::SlruCache;
///
/// fn warm_cache<C: CoreCache<u64, String>>(cache: &mut C, data: &[(u64, String)]) {
///     for (key, value) in data {
///         cache.insert(*key, value.clone());
///     }
/// }
///
/// let mut cache = SlruCache::new(8, 8);
/// warm_cache(&mut cache, &[(1, "one".to_string()), (2, "two".to_string())]);
/// assert_eq!(cache.len(), 2);
/// ```
pub trait CoreCache<K, V>: ReadOnlyCache<K, V> {
    /// Inserts a key-value pair, returning the previous value if it existed.
    ///
    /// If the cache is at capacity, an entry may be evicted according to the
    /// cache's eviction policy before the new entry is inserted.
    ///
    /// ```
    /// use slrukit::traits::CoreCache;
    /// use slrukit::policy::slru::SlruCache;
    ///
    /// let mut cache = SlruCache::new(4, 4);
    /// assert_eq!(CoreCache::insert(&mut cache, 1, "first"), None);
    /// assert_eq!(CoreCache::insert(&mut cache, 1, "second"), Some("first"));
    /// ```
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    /// Gets a reference to a value by key.
    ///
    /// May update eviction state. Use [`ReadOnlyCache::contains`] to check
    /// existence without side effects.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Removes all entries from the cache.
    fn clear(&mut self);
}

/// Caches that support arbitrary key-based removal.
///
/// # Example
///
/// ```
/// use slrukit::traits::{CoreCache, MutableCache, ReadOnlyCache};
/// use slrukit::policy::slru::SlruCache;
///
/// fn invalidate_keys<C: MutableCache<u64, String>>(cache: &mut C, keys: &[u64]) {
///     for key in keys {
///         cache.remove(key);
///     }
/// }
///
/// let mut cache = SlruCache::new(8, 8);
/// CoreCache::insert(&mut cache, 1, "one".to_string());
/// CoreCache::insert(&mut cache, 2, "two".to_string());
///
/// invalidate_keys(&mut cache, &[1]);
/// assert!(!ReadOnlyCache::contains(&cache, &1));
/// assert!(ReadOnlyCache::contains(&cache, &2));
/// ```
pub trait MutableCache<K, V>: CoreCache<K, V> {
    /// Removes a specific key, returning its value if it existed.
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Removes multiple keys, returning results in input order.
    fn remove_batch(&mut self, keys: &[K]) -> Vec<Option<V>> {
        keys.iter().map(|k| self.remove(k)).collect()
    }
}
