//! Segmented LRU (SLRU) cache over a fixed, index-linked slot pool.
//!
//! New keys are admitted into a *probationary* segment. A lookup hit on a
//! probationary entry promotes it into the *protected* segment; a flood of
//! never-reused keys therefore only churns the probationary segment and
//! cannot flush the protected working set.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │                           SlruCache<K, V> Layout                            │
//! │                                                                             │
//! │   map: FxHashMap<K, SlotId>           pool: SlotPool<K, V> (fixed size)     │
//! │   ┌──────────┬────────┐               ┌────────┬───────────────────────────┐│
//! │   │  "page1" │   #0   │──────────────►│   #0   │ k,v, prev,next, Probation ││
//! │   │  "page2" │   #2   │──────────────►│   #1   │ -,-, prev,next, Free      ││
//! │   └──────────┴────────┘        └─────►│   #2   │ k,v, prev,next, Protected ││
//! │                                       └────────┴───────────────────────────┘│
//! │                                                                             │
//! │   Three IndexedList views partition the pool:                               │
//! │                                                                             │
//! │   FREE            PROBATIONARY (MRU → LRU)     PROTECTED (MRU → LRU)        │
//! │   [#1] ◄► ...     [#0] ◄► ... ◄► [tail]        [#2] ◄► ... ◄► [tail]        │
//! │                                                                             │
//! │   free + probationary + protected == capacity, at all times                 │
//! └─────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Flows
//!
//! ```text
//!   insert(new key):
//!     probationary full?  yes → evict probationary tail, reuse its slot
//!                         no  → take the free tail
//!     fill slot, map key → slot, attach at probationary head
//!
//!   insert(existing key):
//!     overwrite value in place; no reordering, no promotion
//!
//!   get(key):
//!     protected head      → return value
//!     protected           → move to protected head
//!     probationary        → protected full? evict protected tail into free
//!                           move slot to protected head, fire on_promote
//!
//!   remove(key):
//!     detach from owning segment, clear slot, attach at free head
//! ```
//!
//! ## Operations
//!
//! | Operation   | Time   | Notes                                      |
//! |-------------|--------|--------------------------------------------|
//! | `get`       | O(1)   | May promote from probationary to protected |
//! | `insert`    | O(1)   | May evict the probationary LRU             |
//! | `remove`    | O(1)   | Returns the slot to the free list          |
//! | `peek`      | O(1)   | No reordering                              |
//! | `clear`     | O(n)   | Returns every slot to the free list        |
//!
//! After construction no operation allocates: the pool is pre-sized and the
//! key map is reserved for at least `2 * capacity + 2` entries. Eviction
//! churn leaves deleted markers in the map; with that headroom the map
//! always holds at most half its reserved size, so it cleans them up in
//! place instead of growing.
//!
//! ## Example Usage
//!
//! ```
//! use slrukit::policy::slru::SlruCache;
//!
//! // 8 protected slots, 4 probationary slots
//! let mut cache = SlruCache::new(8, 4);
//!
//! cache.insert("page1", "content1");
//! cache.insert("page2", "content2");
//! assert_eq!(cache.probationary_len(), 2);
//!
//! // First hit promotes
//! assert_eq!(cache.get(&"page1"), Some(&"content1"));
//! assert_eq!(cache.protected_len(), 1);
//!
//! assert!(cache.remove(&"page2"));
//! assert_eq!(cache.len(), 1);
//! assert!(!cache.check_sanity());
//! ```
//!
//! ## Thread Safety
//!
//! [`SlruCache`] is single-threaded. With the `concurrency` feature,
//! [`ConcurrentSlruCache`] serializes every operation behind one
//! `parking_lot::Mutex`.
//!
//! ## Internal faults
//!
//! Any operation that finds the pool, the lists and the key map out of
//! agreement runs [`SlruCache::check_sanity`] (which logs every violation) and
//! then panics. These states cannot be reached through the public API.

use std::fmt;
use std::hash::Hash;

use rustc_hash::FxHashMap;
use tracing::{debug, error, trace};

use crate::ds::{IndexedList, ListId, SlotId, SlotPool};
use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::{
    CoreMetricsRecorder, MetricsSnapshotProvider, SlruMetrics, SlruMetricsRecorder,
    SlruMetricsSnapshot,
};
use crate::traits::{CoreCache, MutableCache, ReadOnlyCache};

/// Observation hook invoked with a key.
pub type KeyHook<K> = Box<dyn FnMut(&K) + Send>;

/// The two segments a resident key can live in.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Segment {
    /// Admitted, not yet re-accessed.
    Probationary,
    /// Promoted by a lookup hit.
    Protected,
}

impl Segment {
    fn list_id(self) -> ListId {
        match self {
            Segment::Probationary => ListId::Probationary,
            Segment::Protected => ListId::Protected,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.list_id().as_str())
    }
}

/// Entries to reserve in the key map for a cache of `capacity` slots.
///
/// Keeps the resident count at or below half the map's usable size, which is
/// the condition for the map to purge deleted markers in place rather than
/// reallocate.
#[inline]
fn map_reservation(capacity: usize) -> usize {
    capacity.saturating_mul(2).saturating_add(2)
}

/// Number of slots held by each list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SegmentSizes {
    pub free: usize,
    pub probationary: usize,
    pub protected: usize,
}

impl SegmentSizes {
    /// Sum of all three lists; always equals the cache capacity.
    pub fn total(&self) -> usize {
        self.free + self.probationary + self.protected
    }
}

/// Fixed-capacity segmented LRU cache.
///
/// Capacity is `survivor_capacity + probationary_capacity` and never changes.
///
/// # Type Parameters
///
/// - `K`: Key type, must be `Clone + Eq + Hash`
/// - `V`: Value type
///
/// # Example
///
/// ```
/// use slrukit::policy::slru::{Segment, SlruCache};
///
/// let mut cache = SlruCache::new(2, 2);
/// cache.insert(1, "one");
/// cache.insert(1, "uno"); // update, stays probationary
/// assert_eq!(cache.segment_of(&1), Some(Segment::Probationary));
///
/// assert_eq!(cache.get(&1), Some(&"uno"));
/// assert_eq!(cache.segment_of(&1), Some(Segment::Protected));
/// ```
pub struct SlruCache<K, V> {
    pool: SlotPool<K, V>,
    map: FxHashMap<K, SlotId>,

    free: IndexedList,
    probationary: IndexedList,
    protected: IndexedList,

    survivor_capacity: usize,
    probationary_capacity: usize,

    on_promote: Option<KeyHook<K>>,
    on_evict: Option<KeyHook<K>>,

    #[cfg(feature = "metrics")]
    metrics: SlruMetrics,
}

impl<K, V> SlruCache<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Creates a cache with `survivor_capacity` protected slots and
    /// `probationary_capacity` probationary slots.
    ///
    /// # Panics
    ///
    /// Panics if either capacity is zero. Use [`try_new`](Self::try_new) for
    /// user-supplied sizes.
    ///
    /// ```
    /// use slrukit::policy::slru::SlruCache;
    ///
    /// let cache: SlruCache<String, i32> = SlruCache::new(10, 10);
    /// assert_eq!(cache.capacity(), 20);
    /// assert_eq!(cache.free_len(), 20);
    /// ```
    pub fn new(survivor_capacity: usize, probationary_capacity: usize) -> Self {
        match Self::try_new(survivor_capacity, probationary_capacity) {
            Ok(cache) => cache,
            Err(err) => panic!("invalid SLRU configuration: {err}"),
        }
    }

    /// Fallible constructor.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when:
    ///
    /// - `survivor_capacity == 0`: the first promotion would push an entry
    ///   into a protected segment that may hold none.
    /// - `probationary_capacity == 0`: every insert admits into the
    ///   probationary segment, so no key could ever be stored.
    /// - the two capacities overflow `usize` when added.
    ///
    /// ```
    /// use slrukit::policy::slru::SlruCache;
    ///
    /// assert!(SlruCache::<u32, u32>::try_new(0, 4).is_err());
    /// assert!(SlruCache::<u32, u32>::try_new(4, 0).is_err());
    /// assert!(SlruCache::<u32, u32>::try_new(4, 4).is_ok());
    /// ```
    pub fn try_new(
        survivor_capacity: usize,
        probationary_capacity: usize,
    ) -> Result<Self, ConfigError> {
        if survivor_capacity == 0 {
            return Err(ConfigError::new("survivor capacity must be > 0"));
        }
        if probationary_capacity == 0 {
            return Err(ConfigError::new("probationary capacity must be > 0"));
        }
        let capacity = survivor_capacity
            .checked_add(probationary_capacity)
            .ok_or_else(|| ConfigError::new("total capacity overflows usize"))?;

        let mut pool = SlotPool::with_capacity(capacity);
        let mut free = IndexedList::new(ListId::Free);
        for index in 0..capacity {
            free.push_front(&mut pool, SlotId(index));
        }

        debug!(
            survivor_capacity,
            probationary_capacity, "created SLRU cache"
        );

        Ok(Self {
            pool,
            map: FxHashMap::with_capacity_and_hasher(
                map_reservation(capacity),
                Default::default(),
            ),
            free,
            probationary: IndexedList::new(ListId::Probationary),
            protected: IndexedList::new(ListId::Protected),
            survivor_capacity,
            probationary_capacity,
            on_promote: None,
            on_evict: None,
            #[cfg(feature = "metrics")]
            metrics: SlruMetrics::new(),
        })
    }

    // -----------------------------------------------------------------------
    // Hooks
    // -----------------------------------------------------------------------

    /// Installs a hook fired when a key first enters the protected segment.
    pub fn set_on_promote<F>(&mut self, hook: F)
    where
        F: FnMut(&K) + Send + 'static,
    {
        self.on_promote = Some(Box::new(hook));
    }

    /// Installs a hook fired when a key's slot is reclaimed: eviction from
    /// either segment, [`remove`](Self::remove), or an explicit `pop_*`.
    pub fn set_on_evict<F>(&mut self, hook: F)
    where
        F: FnMut(&K) + Send + 'static,
    {
        self.on_evict = Some(Box::new(hook));
    }

    /// Removes both hooks.
    pub fn clear_hooks(&mut self) {
        self.on_promote = None;
        self.on_evict = None;
    }

    pub(crate) fn install_hooks(
        &mut self,
        on_promote: Option<KeyHook<K>>,
        on_evict: Option<KeyHook<K>>,
    ) {
        self.on_promote = on_promote;
        self.on_evict = on_evict;
    }

    #[inline]
    fn notify_evict(&mut self, key: &K) {
        if let Some(hook) = self.on_evict.as_mut() {
            hook(key);
        }
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// Looks up `key`, promoting or refreshing it on a hit.
    ///
    /// - protected head: returned as is
    /// - protected: moved to the protected head
    /// - probationary: promoted to the protected head, evicting the protected
    ///   LRU entry first if the protected segment is full
    ///
    /// ```
    /// use slrukit::policy::slru::SlruCache;
    ///
    /// let mut cache = SlruCache::new(1, 2);
    /// cache.insert("a", 1);
    /// cache.insert("b", 2);
    ///
    /// assert_eq!(cache.get(&"a"), Some(&1)); // promoted
    /// assert_eq!(cache.get(&"b"), Some(&2)); // promoted, "a" evicted
    /// assert_eq!(cache.get(&"a"), None);
    /// assert_eq!(cache.get(&"missing"), None);
    /// ```
    #[inline]
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let id = self.touch(key)?;
        self.pool.value(id)
    }

    /// Like [`get`](Self::get), but returns a mutable reference.
    #[inline]
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let id = self.touch(key)?;
        self.pool.value_mut(id)
    }

    fn touch(&mut self, key: &K) -> Option<SlotId> {
        let Some(&id) = self.map.get(key) else {
            #[cfg(feature = "metrics")]
            self.metrics.record_get_miss();
            return None;
        };

        #[cfg(feature = "metrics")]
        self.metrics.record_get_hit();

        match self.pool.owner(id) {
            Some(ListId::Protected) => {
                if self.protected.front() != Some(id)
                    && !self.protected.move_to_front(&mut self.pool, id)
                {
                    self.fatal("lookup", format_args!("cannot refresh protected slot {id}"));
                }
            },
            Some(ListId::Probationary) => self.promote(id),
            owner => self.fatal(
                "lookup",
                format_args!("mapped slot {id} is owned by {owner:?}"),
            ),
        }

        Some(id)
    }

    fn promote(&mut self, id: SlotId) {
        if self.protected.len() >= self.survivor_capacity {
            if let Some((freed, evicted, _value)) = self.detach_tail(Segment::Protected) {
                self.free.push_front(&mut self.pool, freed);
                #[cfg(feature = "metrics")]
                self.metrics.record_protected_eviction();
                self.notify_evict(&evicted);
            }
        }

        if !self.probationary.remove(&mut self.pool, id) {
            self.fatal(
                "lookup",
                format_args!("cannot detach slot {id} from probationary"),
            );
        }
        self.protected.push_front(&mut self.pool, id);
        trace!(slot = id.index(), "promoted to protected");

        #[cfg(feature = "metrics")]
        self.metrics.record_probationary_to_protected();

        if let Some(hook) = self.on_promote.as_mut() {
            if let Some(key) = self.pool.key(id) {
                hook(key);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Insert
    // -----------------------------------------------------------------------

    /// Inserts a new key into the probationary segment, or overwrites the
    /// value of an existing key.
    ///
    /// An update never moves the entry: recency only changes on lookup.
    ///
    /// ```
    /// use slrukit::policy::slru::SlruCache;
    ///
    /// let mut cache = SlruCache::new(2, 2);
    /// cache.insert("a", 1);
    /// cache.insert("b", 2);
    /// cache.insert("c", 3); // evicts "a", the probationary LRU
    ///
    /// assert!(!cache.contains(&"a"));
    /// assert_eq!(cache.probationary_len(), 2);
    /// ```
    #[inline]
    pub fn insert(&mut self, key: K, value: V) {
        self.upsert(key, value);
    }

    fn upsert(&mut self, key: K, value: V) -> Option<V> {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();

        if let Some(&id) = self.map.get(&key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_update();
            return self.pool.replace_value(id, value);
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_insert_new();

        let id = if self.probationary.len() >= self.probationary_capacity {
            match self.detach_tail(Segment::Probationary) {
                Some((id, evicted, _value)) => {
                    #[cfg(feature = "metrics")]
                    self.metrics.record_probationary_eviction();
                    self.notify_evict(&evicted);
                    id
                },
                None => self.fatal(
                    "insert",
                    format_args!("probationary segment is full but has no tail"),
                ),
            }
        } else {
            match self.free.pop_back(&mut self.pool) {
                Some(id) => id,
                None => self.fatal("insert", format_args!("no free slot available")),
            }
        };

        self.pool.fill(id, key.clone(), value);
        self.map.insert(key, id);
        self.probationary.push_front(&mut self.pool, id);
        None
    }

    /// Detaches the LRU slot of `segment`, unmaps its key and clears it.
    ///
    /// The returned slot is unlinked; the caller attaches it elsewhere.
    fn detach_tail(&mut self, segment: Segment) -> Option<(SlotId, K, V)> {
        let list = match segment {
            Segment::Probationary => &mut self.probationary,
            Segment::Protected => &mut self.protected,
        };
        let id = list.pop_back(&mut self.pool)?;

        let (Some(key), Some(value)) = self.pool.take(id) else {
            self.fatal(
                "evict",
                format_args!("{segment} tail {id} holds no entry"),
            );
        };
        if self.map.remove(&key) != Some(id) {
            self.fatal(
                "evict",
                format_args!("{segment} tail {id} is not mapped to its key"),
            );
        }

        trace!(slot = id.index(), %segment, "evicted entry");
        Some((id, key, value))
    }

    // -----------------------------------------------------------------------
    // Remove
    // -----------------------------------------------------------------------

    /// Removes `key`, returning `true` if it was present.
    ///
    /// ```
    /// use slrukit::policy::slru::SlruCache;
    ///
    /// let mut cache = SlruCache::new(2, 2);
    /// cache.insert("x", 1);
    /// assert!(cache.remove(&"x"));
    /// assert!(!cache.remove(&"x"));
    /// assert_eq!(cache.free_len(), 4);
    /// ```
    #[inline]
    pub fn remove(&mut self, key: &K) -> bool {
        self.remove_entry(key).is_some()
    }

    /// Removes `key` and returns the stored pair.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let id = self.map.remove(key)?;

        let detached = match self.pool.owner(id) {
            Some(ListId::Protected) => self.protected.remove(&mut self.pool, id),
            Some(ListId::Probationary) => self.probationary.remove(&mut self.pool, id),
            _ => false,
        };
        if !detached {
            self.fatal(
                "remove",
                format_args!("mapped slot {id} is not held by a segment"),
            );
        }

        let (Some(stored), Some(value)) = self.pool.take(id) else {
            self.fatal("remove", format_args!("mapped slot {id} holds no entry"));
        };
        self.free.push_front(&mut self.pool, id);

        #[cfg(feature = "metrics")]
        self.metrics.record_remove();
        self.notify_evict(&stored);

        Some((stored, value))
    }

    /// Evicts the probationary LRU entry.
    pub fn pop_probationary(&mut self) -> Option<(K, V)> {
        self.pop_segment(Segment::Probationary)
    }

    /// Evicts the protected LRU entry.
    pub fn pop_protected(&mut self) -> Option<(K, V)> {
        self.pop_segment(Segment::Protected)
    }

    fn pop_segment(&mut self, segment: Segment) -> Option<(K, V)> {
        let (id, key, value) = self.detach_tail(segment)?;
        self.free.push_front(&mut self.pool, id);

        #[cfg(feature = "metrics")]
        match segment {
            Segment::Probationary => self.metrics.record_probationary_eviction(),
            Segment::Protected => self.metrics.record_protected_eviction(),
        }
        self.notify_evict(&key);

        Some((key, value))
    }

    /// Returns every slot to the free list. Hooks are not fired.
    pub fn clear(&mut self) {
        for segment in [Segment::Probationary, Segment::Protected] {
            while let Some((id, _key, _value)) = self.detach_tail(segment) {
                self.free.push_front(&mut self.pool, id);
            }
        }
        self.map.clear();

        #[cfg(feature = "metrics")]
        self.metrics.record_clear();

        debug!(capacity = self.capacity(), "cleared SLRU cache");
    }

    // -----------------------------------------------------------------------
    // Read-only access
    // -----------------------------------------------------------------------

    /// Reads a value without promotion or reordering.
    #[inline]
    pub fn peek(&self, key: &K) -> Option<&V> {
        let &id = self.map.get(key)?;
        self.pool.value(id)
    }

    /// Returns `true` if `key` is resident. Does not promote.
    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Segment currently holding `key`.
    pub fn segment_of(&self, key: &K) -> Option<Segment> {
        let &id = self.map.get(key)?;
        match self.pool.owner(id)? {
            ListId::Probationary => Some(Segment::Probationary),
            ListId::Protected => Some(Segment::Protected),
            ListId::Free => None,
        }
    }

    /// Protected entries from most to least recently used.
    pub fn iter_protected(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.iter_list(&self.protected)
    }

    /// Probationary entries from most to least recently admitted.
    pub fn iter_probationary(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.iter_list(&self.probationary)
    }

    fn iter_list<'a>(&'a self, list: &'a IndexedList) -> impl Iterator<Item = (&'a K, &'a V)> + 'a {
        let pool = &self.pool;
        list.iter(pool)
            .filter_map(move |id| Some((pool.key(id)?, pool.value(id)?)))
    }

    /// Number of resident keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Total slots: `survivor_capacity + probationary_capacity`.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    #[inline]
    pub fn survivor_capacity(&self) -> usize {
        self.survivor_capacity
    }

    #[inline]
    pub fn probationary_capacity(&self) -> usize {
        self.probationary_capacity
    }

    #[inline]
    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    #[inline]
    pub fn probationary_len(&self) -> usize {
        self.probationary.len()
    }

    #[inline]
    pub fn protected_len(&self) -> usize {
        self.protected.len()
    }

    pub fn segment_sizes(&self) -> SegmentSizes {
        SegmentSizes {
            free: self.free.len(),
            probationary: self.probationary.len(),
            protected: self.protected.len(),
        }
    }

    // -----------------------------------------------------------------------
    // Sanity checking
    // -----------------------------------------------------------------------

    fn list_violations(&self) -> Vec<String> {
        let mut out = Vec::new();
        for list in [&self.free, &self.probationary, &self.protected] {
            list.collect_violations(&self.pool, &mut out);
        }

        if self.free.len() > self.capacity() {
            out.push(format!(
                "free: size overflow ({} > {})",
                self.free.len(),
                self.capacity()
            ));
        }
        if self.probationary.len() > self.probationary_capacity {
            out.push(format!(
                "probationary: size overflow ({} > {})",
                self.probationary.len(),
                self.probationary_capacity
            ));
        }
        if self.protected.len() > self.survivor_capacity {
            out.push(format!(
                "protected: size overflow ({} > {})",
                self.protected.len(),
                self.survivor_capacity
            ));
        }
        out
    }

    /// Walks all three lists and logs every violation at `error` level.
    ///
    /// Verifies back links, owner tags, tail pointers, tracked lengths and
    /// segment bounds. Returns `true` if anything is wrong; never panics.
    pub fn check_sanity(&self) -> bool {
        let violations = self.list_violations();
        for violation in &violations {
            error!(%violation, "SLRU sanity check failed");
        }
        !violations.is_empty()
    }

    /// Full structural check, returning the first violation found.
    ///
    /// In addition to [`check_sanity`](Self::check_sanity) this verifies that
    /// the lists partition the pool, that the key map and the segments agree,
    /// and that free slots are cleared.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let mut out = self.list_violations();

        let sizes = self.segment_sizes();
        if sizes.total() != self.capacity() {
            out.push(format!(
                "partition: lists hold {} slots, capacity is {}",
                sizes.total(),
                self.capacity()
            ));
        }

        for id in self.pool.ids() {
            let Some(entry) = self.pool.get(id) else {
                continue;
            };
            match entry.owner() {
                None => out.push(format!("slot {id} is not owned by any list")),
                Some(ListId::Free) => {
                    if !entry.is_vacant() {
                        out.push(format!("free slot {id} still holds an entry"));
                    }
                },
                Some(owner) => match entry.key() {
                    None => out.push(format!("{owner} slot {id} holds no key")),
                    Some(key) => {
                        if self.map.get(key) != Some(&id) {
                            out.push(format!("{owner} slot {id} is not mapped to its key"));
                        }
                    },
                },
            }
        }

        let resident = sizes.probationary + sizes.protected;
        if self.map.len() != resident {
            out.push(format!(
                "map holds {} keys, segments hold {resident}",
                self.map.len()
            ));
        }
        for (key, &id) in &self.map {
            if self.pool.key(id) != Some(key) {
                out.push(format!("map entry points at slot {id} holding another key"));
            }
        }

        match out.into_iter().next() {
            Some(first) => Err(InvariantError::new(first)),
            None => Ok(()),
        }
    }

    #[cold]
    #[inline(never)]
    fn fatal(&self, operation: &str, detail: fmt::Arguments<'_>) -> ! {
        self.check_sanity();
        error!(operation, %detail, "SLRU internal invariant violated");
        panic!("SLRU {operation}: {detail}");
    }

    // -----------------------------------------------------------------------
    // Metrics
    // -----------------------------------------------------------------------

    /// Counters plus segment gauges.
    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> SlruMetricsSnapshot {
        let sizes = self.segment_sizes();
        SlruMetricsSnapshot {
            cache_len: self.len(),
            capacity: self.capacity(),
            free_len: sizes.free,
            probationary_len: sizes.probationary,
            protected_len: sizes.protected,
            ..self.metrics.snapshot()
        }
    }

    #[cfg(feature = "metrics")]
    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }
}

impl<K, V> fmt::Debug for SlruCache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlruCache")
            .field("capacity", &self.capacity())
            .field("survivor_capacity", &self.survivor_capacity)
            .field("probationary_capacity", &self.probationary_capacity)
            .field("len", &self.map.len())
            .field("free_len", &self.free.len())
            .field("probationary_len", &self.probationary.len())
            .field("protected_len", &self.protected.len())
            .finish_non_exhaustive()
    }
}

impl<K, V> ReadOnlyCache<K, V> for SlruCache<K, V>
where
    K: Clone + Eq + Hash,
{
    #[inline]
    fn contains(&self, key: &K) -> bool {
        SlruCache::contains(self, key)
    }

    #[inline]
    fn len(&self) -> usize {
        SlruCache::len(self)
    }

    #[inline]
    fn capacity(&self) -> usize {
        SlruCache::capacity(self)
    }
}

impl<K, V> CoreCache<K, V> for SlruCache<K, V>
where
    K: Clone + Eq + Hash,
{
    #[inline]
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.upsert(key, value)
    }

    #[inline]
    fn get(&mut self, key: &K) -> Option<&V> {
        SlruCache::get(self, key)
    }

    fn clear(&mut self) {
        SlruCache::clear(self);
    }
}

impl<K, V> MutableCache<K, V> for SlruCache<K, V>
where
    K: Clone + Eq + Hash,
{
    #[inline]
    fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, value)| value)
    }
}

// ---------------------------------------------------------------------------
// ConcurrentSlruCache
// ---------------------------------------------------------------------------

/// Thread-safe wrapper around [`SlruCache`] using a `parking_lot::Mutex`.
///
/// Every operation, lookups included, mutates recency state, so a single
/// exclusive lock guards the whole cache. Hooks run while the lock is held.
#[cfg(feature = "concurrency")]
pub struct ConcurrentSlruCache<K, V> {
    inner: parking_lot::Mutex<SlruCache<K, V>>,
}

#[cfg(feature = "concurrency")]
impl<K, V> ConcurrentSlruCache<K, V>
where
    K: Clone + Eq + Hash,
{
    /// See [`SlruCache::new`].
    pub fn new(survivor_capacity: usize, probationary_capacity: usize) -> Self {
        Self::from_cache(SlruCache::new(survivor_capacity, probationary_capacity))
    }

    /// See [`SlruCache::try_new`].
    pub fn try_new(
        survivor_capacity: usize,
        probationary_capacity: usize,
    ) -> Result<Self, ConfigError> {
        SlruCache::try_new(survivor_capacity, probationary_capacity).map(Self::from_cache)
    }

    /// Wraps an existing cache, keeping its contents and hooks.
    pub fn from_cache(cache: SlruCache<K, V>) -> Self {
        Self {
            inner: parking_lot::Mutex::new(cache),
        }
    }

    pub fn insert(&self, key: K, value: V) {
        self.inner.lock().insert(key, value);
    }

    /// Inserts without blocking; hands the pair back if the lock is contended.
    pub fn try_insert(&self, key: K, value: V) -> Result<(), (K, V)> {
        match self.inner.try_lock() {
            Some(mut cache) => {
                cache.insert(key, value);
                Ok(())
            },
            None => Err((key, value)),
        }
    }

    pub fn remove(&self, key: &K) -> bool {
        self.inner.lock().remove(key)
    }

    /// Looks up `key` (with promotion) and runs `f` on the value.
    pub fn get_with<R>(&self, key: &K, f: impl FnOnce(&V) -> R) -> Option<R> {
        let mut cache = self.inner.lock();
        cache.get(key).map(f)
    }

    /// Reads `key` without promotion and runs `f` on the value.
    pub fn peek_with<R>(&self, key: &K, f: impl FnOnce(&V) -> R) -> Option<R> {
        let cache = self.inner.lock();
        cache.peek(key).map(f)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().contains(key)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    pub fn segment_sizes(&self) -> SegmentSizes {
        self.inner.lock().segment_sizes()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn check_sanity(&self) -> bool {
        self.inner.lock().check_sanity()
    }

    /// Runs `f` with exclusive access to the underlying cache.
    pub fn with_cache<R>(&self, f: impl FnOnce(&mut SlruCache<K, V>) -> R) -> R {
        let mut cache = self.inner.lock();
        f(&mut cache)
    }

    pub fn into_inner(self) -> SlruCache<K, V> {
        self.inner.into_inner()
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> ConcurrentSlruCache<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone,
{
    /// Looks up `key` (with promotion) and clones the value out.
    pub fn get_cloned(&self, key: &K) -> Option<V> {
        self.get_with(key, V::clone)
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> fmt::Debug for ConcurrentSlruCache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_lock() {
            Some(cache) => f
                .debug_struct("ConcurrentSlruCache")
                .field("inner", &*cache)
                .finish(),
            None => f
                .debug_struct("ConcurrentSlruCache")
                .field("inner", &"<locked>")
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn insert_n(cache: &mut SlruCache<String, String>, count: usize, offset: usize) {
        for n in 0..count {
            let s = (n + offset).to_string();
            cache.insert(s.clone(), s);
        }
    }

    fn lookup_n(cache: &mut SlruCache<String, String>, count: usize, offset: usize) {
        for n in 0..count {
            let s = (n + offset).to_string();
            cache.get(&s);
        }
    }

    fn sizes(free: usize, protected: usize, probationary: usize) -> SegmentSizes {
        SegmentSizes {
            free,
            probationary,
            protected,
        }
    }

    #[track_caller]
    fn assert_healthy<K: Clone + Eq + Hash, V>(cache: &SlruCache<K, V>) {
        assert!(!cache.check_sanity());
        if let Err(err) = cache.check_invariants() {
            panic!("invariant violated: {err}");
        }
    }

    // ==============================================
    // Construction
    // ==============================================

    mod construction {
        use super::*;

        #[test]
        fn new_cache_has_every_slot_free() {
            let cache: SlruCache<&str, i32> = SlruCache::new(10, 5);
            assert_eq!(cache.capacity(), 15);
            assert_eq!(cache.survivor_capacity(), 10);
            assert_eq!(cache.probationary_capacity(), 5);
            assert_eq!(cache.segment_sizes(), sizes(15, 0, 0));
            assert!(cache.is_empty());
            assert_healthy(&cache);
        }

        #[test]
        fn try_new_rejects_empty_segments() {
            let err = SlruCache::<u8, u8>::try_new(0, 4).unwrap_err();
            assert!(err.message().contains("survivor"));

            let err = SlruCache::<u8, u8>::try_new(4, 0).unwrap_err();
            assert!(err.message().contains("probationary"));

            let err = SlruCache::<u8, u8>::try_new(usize::MAX, 1).unwrap_err();
            assert!(err.message().contains("overflow"));
        }

        #[test]
        #[should_panic(expected = "probationary capacity must be > 0")]
        fn new_panics_on_zero_probationary() {
            let _cache: SlruCache<u8, u8> = SlruCache::new(4, 0);
        }

        #[test]
        fn map_reserves_room_for_in_place_cleanup() {
            for (survivor, probationary) in [(1, 1), (10, 10), (3, 50), (512, 512)] {
                let cache: SlruCache<u64, u64> = SlruCache::new(survivor, probationary);
                let capacity = survivor + probationary;
                assert!(cache.map.capacity() >= 2 * capacity + 2);
            }
        }

        #[test]
        fn map_never_grows_under_eviction_churn() {
            let mut cache: SlruCache<u64, u64> = SlruCache::new(10, 10);
            let reserved = cache.map.capacity();
            let mut key = 0u64;
            for i in 0..100_000u64 {
                key = key
                    .wrapping_mul(6_364_136_223_846_793_005)
                    .wrapping_add(1_442_695_040_888_963_407);
                cache.insert(key, i);
                if i % 3 == 0 {
                    cache.get(&key);
                }
            }
            // deleted markers can only shrink the reported capacity; growth would double it
            assert!(cache.map.capacity() <= reserved);
            assert_healthy(&cache);
        }

        #[test]
        fn debug_output_lists_segment_lengths() {
            let mut cache = SlruCache::new(2, 2);
            cache.insert(1, 1);
            let dbg = format!("{cache:?}");
            assert!(dbg.contains("probationary_len: 1"));
            assert!(dbg.contains("free_len: 3"));
        }
    }

    // ==============================================
    // Admission and promotion
    // ==============================================

    mod segment_behavior {
        use super::*;

        #[test]
        fn insert_admits_into_probationary() {
            let mut cache = SlruCache::new(10, 10);
            insert_n(&mut cache, 10, 0);
            assert_eq!(cache.segment_sizes(), sizes(10, 0, 10));
            for n in 0..10 {
                assert_eq!(
                    cache.segment_of(&n.to_string()),
                    Some(Segment::Probationary)
                );
            }
            assert_healthy(&cache);
        }

        #[test]
        fn insert_twice_with_doubled_probationary_capacity() {
            let mut cache = SlruCache::new(10, 20);
            insert_n(&mut cache, 10, 0);
            insert_n(&mut cache, 10, 0);
            assert_eq!(cache.segment_sizes(), sizes(20, 0, 10));
            assert_healthy(&cache);
        }

        #[test]
        fn lookup_promotes_to_protected_head() {
            let mut cache = SlruCache::new(4, 4);
            cache.insert("a", 1);
            cache.insert("b", 2);

            assert_eq!(cache.get(&"a"), Some(&1));
            assert_eq!(cache.segment_of(&"a"), Some(Segment::Protected));
            assert_eq!(cache.protected.front(), cache.map.get(&"a").copied());
            assert_eq!(cache.segment_of(&"b"), Some(Segment::Probationary));
            assert_healthy(&cache);
        }

        #[test]
        fn lookup_refreshes_protected_order() {
            let mut cache = SlruCache::new(3, 3);
            for k in ["a", "b", "c"] {
                cache.insert(k, 0);
                cache.get(&k);
            }
            let order: Vec<_> = cache.iter_protected().map(|(k, _)| *k).collect();
            assert_eq!(order, vec!["c", "b", "a"]);

            cache.get(&"a");
            let order: Vec<_> = cache.iter_protected().map(|(k, _)| *k).collect();
            assert_eq!(order, vec!["a", "c", "b"]);

            // head hit is a no-op
            cache.get(&"a");
            let order: Vec<_> = cache.iter_protected().map(|(k, _)| *k).collect();
            assert_eq!(order, vec!["a", "c", "b"]);
            assert_healthy(&cache);
        }

        #[test]
        fn promotion_displaces_protected_lru_into_free() {
            let mut cache = SlruCache::new(10, 10);
            insert_n(&mut cache, 10, 0);
            lookup_n(&mut cache, 10, 0);
            assert_eq!(cache.segment_sizes(), sizes(10, 10, 0));

            insert_n(&mut cache, 10, 10);
            assert_eq!(cache.segment_sizes(), sizes(0, 10, 10));

            lookup_n(&mut cache, 10, 5);
            assert_eq!(cache.segment_sizes(), sizes(5, 10, 5));

            // keys 0..5 were the protected LRU entries
            for n in 0..5 {
                assert!(!cache.contains(&n.to_string()));
            }
            for n in 5..15 {
                assert_eq!(
                    cache.segment_of(&n.to_string()),
                    Some(Segment::Protected)
                );
            }
            for n in 15..20 {
                assert_eq!(
                    cache.segment_of(&n.to_string()),
                    Some(Segment::Probationary)
                );
            }
            assert_healthy(&cache);
        }

        #[test]
        fn update_does_not_promote() {
            let mut cache = SlruCache::new(2, 2);
            cache.insert("a".to_string(), "1".to_string());
            cache.insert("a".to_string(), "2".to_string());
            assert_eq!(cache.segment_of(&"a".to_string()), Some(Segment::Probationary));
            assert_eq!(cache.len(), 1);
            assert_eq!(cache.get(&"a".to_string()), Some(&"2".to_string()));
        }

        #[test]
        fn update_does_not_refresh_probationary_order() {
            let mut cache = SlruCache::new(2, 2);
            cache.insert("old", 1);
            cache.insert("new", 2);
            cache.insert("old", 10);
            cache.insert("third", 3);

            // "old" stayed the LRU despite the write
            assert!(!cache.contains(&"old"));
            assert!(cache.contains(&"new"));
        }

        #[test]
        fn get_mut_promotes_and_writes_through() {
            let mut cache = SlruCache::new(2, 2);
            cache.insert(1, 10);
            if let Some(v) = cache.get_mut(&1) {
                *v += 5;
            }
            assert_eq!(cache.segment_of(&1), Some(Segment::Protected));
            assert_eq!(cache.peek(&1), Some(&15));
        }

        #[test]
        fn peek_and_contains_do_not_promote() {
            let mut cache = SlruCache::new(2, 2);
            cache.insert(1, 1);
            assert_eq!(cache.peek(&1), Some(&1));
            assert!(cache.contains(&1));
            assert_eq!(cache.segment_of(&1), Some(Segment::Probationary));
            assert_eq!(cache.peek(&2), None);
        }
    }

    // ==============================================
    // Eviction
    // ==============================================

    mod eviction_behavior {
        use super::*;

        #[test]
        fn probationary_evicts_lru_order() {
            let mut cache = SlruCache::new(3, 3);
            for k in 0..5 {
                cache.insert(k, k);
            }
            let order: Vec<_> = cache.iter_probationary().map(|(k, _)| *k).collect();
            assert_eq!(order, vec![4, 3, 2]);
            assert_eq!(cache.segment_sizes(), sizes(3, 0, 3));
            assert_healthy(&cache);
        }

        #[test]
        fn scan_does_not_flush_protected() {
            let mut cache = SlruCache::new(8, 4);
            for i in 0..8 {
                let key = format!("hot{i}");
                cache.insert(key.clone(), i);
                cache.get(&key);
            }
            for i in 0..1_000 {
                cache.insert(format!("scan{i}"), i);
            }
            for i in 0..8 {
                assert_eq!(
                    cache.segment_of(&format!("hot{i}")),
                    Some(Segment::Protected)
                );
            }
            assert_eq!(cache.segment_sizes(), sizes(0, 8, 4));
            assert_healthy(&cache);
        }

        #[test]
        fn pop_segments_return_lru_entries() {
            let mut cache = SlruCache::new(2, 2);
            cache.insert("p", 1);
            cache.get(&"p");
            cache.insert("a", 2);
            cache.insert("b", 3);

            assert_eq!(cache.pop_probationary(), Some(("a", 2)));
            assert_eq!(cache.pop_protected(), Some(("p", 1)));
            assert_eq!(cache.pop_protected(), None);
            assert_eq!(cache.segment_sizes(), sizes(3, 0, 1));
            assert_healthy(&cache);
        }

        #[test]
        fn single_slot_segments() {
            let mut cache = SlruCache::new(1, 1);
            cache.insert("a", 1);
            cache.get(&"a");
            cache.insert("b", 2);
            cache.get(&"b");

            assert!(!cache.contains(&"a"));
            assert_eq!(cache.segment_of(&"b"), Some(Segment::Protected));
            assert_eq!(cache.segment_sizes(), sizes(1, 1, 0));
            assert_healthy(&cache);
        }
    }

    // ==============================================
    // Removal
    // ==============================================

    mod removal {
        use super::*;

        #[test]
        fn removal_frees_slot_for_reuse() {
            let mut cache = SlruCache::new(1, 1);
            cache.insert("x".to_string(), 1);
            assert!(cache.remove(&"x".to_string()));
            assert_eq!(cache.get(&"x".to_string()), None);

            cache.insert("y".to_string(), 2);
            assert_eq!(cache.peek(&"y".to_string()), Some(&2));
            assert_eq!(cache.segment_sizes(), sizes(1, 0, 1));
            assert_healthy(&cache);
        }

        #[test]
        fn remove_missing_key_has_no_effect() {
            let mut cache = SlruCache::new(2, 2);
            cache.insert(1, 1);
            assert!(!cache.remove(&2));
            assert_eq!(cache.segment_sizes(), sizes(3, 0, 1));
        }

        #[test]
        fn remove_from_protected_interior() {
            let mut cache = SlruCache::new(3, 3);
            for k in 0..3 {
                cache.insert(k, k);
                cache.get(&k);
            }
            assert_eq!(cache.remove_entry(&1), Some((1, 1)));
            let order: Vec<_> = cache.iter_protected().map(|(k, _)| *k).collect();
            assert_eq!(order, vec![2, 0]);
            assert_healthy(&cache);
        }

        #[test]
        fn clear_resets_all_segments() {
            let mut cache = SlruCache::new(3, 3);
            for k in 0..6 {
                cache.insert(k, k);
            }
            cache.get(&4);
            cache.clear();

            assert!(cache.is_empty());
            assert_eq!(cache.segment_sizes(), sizes(6, 0, 0));
            assert_healthy(&cache);

            cache.insert(9, 9);
            assert_eq!(cache.get(&9), Some(&9));
        }

        #[test]
        fn trait_remove_returns_value() {
            let mut cache: SlruCache<&str, i32> = SlruCache::new(2, 2);
            cache.insert("k", 7);
            assert_eq!(MutableCache::remove(&mut cache, &"k"), Some(7));
            assert_eq!(MutableCache::remove(&mut cache, &"k"), None);
        }

        #[test]
        fn trait_insert_returns_old_value() {
            let mut cache: SlruCache<&str, i32> = SlruCache::new(2, 2);
            assert_eq!(CoreCache::insert(&mut cache, "k", 1), None);
            assert_eq!(CoreCache::insert(&mut cache, "k", 2), Some(1));
            assert_eq!(ReadOnlyCache::len(&cache), 1);
        }
    }

    // ==============================================
    // Hooks
    // ==============================================

    mod hooks {
        use super::*;

        type Log = Arc<Mutex<Vec<String>>>;

        fn recording_cache(survivor: usize, probationary: usize) -> (SlruCache<String, u32>, Log, Log) {
            let promoted: Log = Arc::default();
            let evicted: Log = Arc::default();
            let mut cache = SlruCache::new(survivor, probationary);
            let p = Arc::clone(&promoted);
            cache.set_on_promote(move |k: &String| p.lock().unwrap().push(k.clone()));
            let e = Arc::clone(&evicted);
            cache.set_on_evict(move |k: &String| e.lock().unwrap().push(k.clone()));
            (cache, promoted, evicted)
        }

        fn logged(log: &Log) -> Vec<String> {
            log.lock().unwrap().clone()
        }

        #[test]
        fn hook_may_own_unsynchronized_state() {
            use std::cell::Cell;
            use std::sync::mpsc;

            let (tx, rx) = mpsc::channel();
            let seen = Cell::new(0usize);
            let mut cache = SlruCache::new(1, 1);
            cache.set_on_evict(move |_: &u32| {
                seen.set(seen.get() + 1);
                let _ = tx.send(seen.get());
            });

            for k in 0..3 {
                cache.insert(k, k);
            }
            assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![1, 2]);

            fn assert_send<T: Send>(_: &T) {}
            assert_send(&cache);
        }

        #[test]
        fn promote_fires_once_per_promotion() {
            let (mut cache, promoted, evicted) = recording_cache(2, 2);
            cache.insert("a".into(), 1);
            cache.get(&"a".into());
            cache.get(&"a".into());
            cache.get(&"a".into());
            assert_eq!(logged(&promoted), vec!["a"]);
            assert!(logged(&evicted).is_empty());
        }

        #[test]
        fn evict_fires_for_both_segments_and_remove() {
            let (mut cache, promoted, evicted) = recording_cache(1, 1);
            cache.insert("a".into(), 1);
            cache.get(&"a".into());
            cache.insert("b".into(), 2);
            cache.insert("c".into(), 3); // evicts "b" from probationary
            cache.get(&"c".into()); // evicts "a" from protected
            assert!(cache.remove(&"c".into()));

            assert_eq!(logged(&promoted), vec!["a", "c"]);
            assert_eq!(logged(&evicted), vec!["b", "a", "c"]);
        }

        #[test]
        fn update_and_clear_are_silent() {
            let (mut cache, promoted, evicted) = recording_cache(2, 2);
            cache.insert("a".into(), 1);
            cache.insert("a".into(), 2);
            cache.clear();
            assert!(logged(&promoted).is_empty());
            assert!(logged(&evicted).is_empty());
        }

        #[test]
        fn clear_hooks_stops_notifications() {
            let (mut cache, promoted, _evicted) = recording_cache(2, 2);
            cache.clear_hooks();
            cache.insert("a".into(), 1);
            cache.get(&"a".into());
            assert!(logged(&promoted).is_empty());
        }
    }

    // ==============================================
    // Sanity checker and fatal paths
    // ==============================================

    mod sanity_checker {
        use super::*;

        #[test]
        fn detects_owner_tag_corruption() {
            let mut cache = SlruCache::new(2, 2);
            cache.insert(1, 1);
            let id = cache.map[&1];
            cache.pool.entry_mut(id).owner = Some(ListId::Protected);

            assert!(cache.check_sanity());
            let err = cache.check_invariants().unwrap_err();
            assert!(err.message().contains("probationary"), "{err}");
        }

        #[test]
        fn detects_stale_payload_in_free_slot() {
            let mut cache: SlruCache<u32, u32> = SlruCache::new(2, 2);
            let id = cache.free.back().unwrap();
            cache.pool.entry_mut(id).value = Some(5);

            // links are fine, so only the full check notices
            assert!(!cache.check_sanity());
            let err = cache.check_invariants().unwrap_err();
            assert!(err.message().contains("free slot"), "{err}");
        }

        #[test]
        fn detects_leaked_mapping() {
            let mut cache: SlruCache<u32, u32> = SlruCache::new(2, 2);
            let id = cache.free.back().unwrap();
            cache.map.insert(42, id);
            let err = cache.check_invariants().unwrap_err();
            assert!(err.message().contains("map"), "{err}");
        }

        #[test]
        fn detects_segment_overflow() {
            let mut cache = SlruCache::new(2, 2);
            cache.insert(1, 1);
            cache.insert(2, 2);
            cache.probationary_capacity = 1;
            assert!(cache.check_sanity());
        }

        #[test]
        #[should_panic(expected = "SLRU lookup")]
        fn lookup_of_free_owned_slot_is_fatal() {
            let mut cache = SlruCache::new(2, 2);
            cache.insert(1, 1);
            let id = cache.map[&1];
            cache.pool.entry_mut(id).owner = Some(ListId::Free);
            cache.get(&1);
        }

        #[test]
        #[should_panic(expected = "no free slot available")]
        fn insert_without_free_slot_is_fatal() {
            let mut cache: SlruCache<u8, u8> = SlruCache::new(1, 1);
            while cache.free.pop_back(&mut cache.pool).is_some() {}
            cache.insert(1, 1);
        }
    }

    // ==============================================
    // Property tests
    // ==============================================

    mod property_tests {
        use super::*;
        use proptest::prelude::*;
        use std::collections::{HashMap, VecDeque};

        #[derive(Debug, Clone)]
        enum Op {
            Insert(u8, u32),
            Get(u8),
            Peek(u8),
            Remove(u8),
            PopProbationary,
            PopProtected,
        }

        fn op_strategy() -> impl Strategy<Value = Op> {
            prop_oneof![
                4 => (0u8..24, any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
                4 => (0u8..24).prop_map(Op::Get),
                1 => (0u8..24).prop_map(Op::Peek),
                1 => (0u8..24).prop_map(Op::Remove),
                1 => Just(Op::PopProbationary),
                1 => Just(Op::PopProtected),
            ]
        }

        /// Straightforward deque model: front = MRU, back = LRU.
        #[derive(Default)]
        struct Model {
            survivor: usize,
            probationary_cap: usize,
            probationary: VecDeque<u8>,
            protected: VecDeque<u8>,
            values: HashMap<u8, u32>,
        }

        impl Model {
            fn drop_key(deque: &mut VecDeque<u8>, key: u8) -> bool {
                match deque.iter().position(|&k| k == key) {
                    Some(pos) => {
                        deque.remove(pos);
                        true
                    },
                    None => false,
                }
            }

            fn get(&mut self, key: u8) -> Option<u32> {
                let value = *self.values.get(&key)?;
                if Self::drop_key(&mut self.protected, key) {
                    self.protected.push_front(key);
                } else {
                    if self.protected.len() >= self.survivor {
                        if let Some(old) = self.protected.pop_back() {
                            self.values.remove(&old);
                        }
                    }
                    Self::drop_key(&mut self.probationary, key);
                    self.protected.push_front(key);
                }
                Some(value)
            }

            fn insert(&mut self, key: u8, value: u32) {
                if let Some(v) = self.values.get_mut(&key) {
                    *v = value;
                    return;
                }
                if self.probationary.len() >= self.probationary_cap {
                    if let Some(old) = self.probationary.pop_back() {
                        self.values.remove(&old);
                    }
                }
                self.probationary.push_front(key);
                self.values.insert(key, value);
            }

            fn remove(&mut self, key: u8) -> bool {
                if self.values.remove(&key).is_none() {
                    return false;
                }
                Self::drop_key(&mut self.protected, key) || Self::drop_key(&mut self.probationary, key)
            }
        }

        proptest! {
            #[cfg_attr(miri, ignore)]
            #[test]
            fn prop_matches_deque_model(
                survivor in 1usize..8,
                probationary in 1usize..8,
                ops in prop::collection::vec(op_strategy(), 0..200)
            ) {
                let mut cache: SlruCache<u8, u32> = SlruCache::new(survivor, probationary);
                let mut model = Model {
                    survivor,
                    probationary_cap: probationary,
                    ..Default::default()
                };

                for op in ops {
                    match op {
                        Op::Insert(k, v) => {
                            cache.insert(k, v);
                            model.insert(k, v);
                        },
                        Op::Get(k) => {
                            prop_assert_eq!(cache.get(&k).copied(), model.get(k));
                        },
                        Op::Peek(k) => {
                            prop_assert_eq!(cache.peek(&k).copied(), model.values.get(&k).copied());
                        },
                        Op::Remove(k) => {
                            prop_assert_eq!(cache.remove(&k), model.remove(k));
                        },
                        Op::PopProbationary => {
                            let expected = model.probationary.pop_back();
                            if let Some(k) = expected {
                                model.values.remove(&k);
                            }
                            prop_assert_eq!(cache.pop_probationary().map(|(k, _)| k), expected);
                        },
                        Op::PopProtected => {
                            let expected = model.protected.pop_back();
                            if let Some(k) = expected {
                                model.values.remove(&k);
                            }
                            prop_assert_eq!(cache.pop_protected().map(|(k, _)| k), expected);
                        },
                    }

                    prop_assert!(cache.check_invariants().is_ok(), "{:?}", cache.check_invariants());
                    let protected: Vec<u8> = cache.iter_protected().map(|(k, _)| *k).collect();
                    let probationary: Vec<u8> = cache.iter_probationary().map(|(k, _)| *k).collect();
                    prop_assert_eq!(protected, model.protected.iter().copied().collect::<Vec<_>>());
                    prop_assert_eq!(probationary, model.probationary.iter().copied().collect::<Vec<_>>());
                }
            }

            #[cfg_attr(miri, ignore)]
            #[test]
            fn prop_fresh_insert_is_probationary(
                warmup in prop::collection::vec((0u8..32, any::<bool>()), 0..100),
                key in 32u8..64
            ) {
                let mut cache: SlruCache<u8, u8> = SlruCache::new(4, 4);
                for (k, read) in warmup {
                    cache.insert(k, k);
                    if read {
                        cache.get(&k);
                    }
                }
                cache.insert(key, key);
                prop_assert_eq!(cache.segment_of(&key), Some(Segment::Probationary));

                cache.get(&key);
                prop_assert_eq!(cache.protected.front(), cache.map.get(&key).copied());
            }

            #[cfg_attr(miri, ignore)]
            #[test]
            fn prop_links_are_symmetric(
                keys in prop::collection::vec((0u16..64, any::<bool>()), 0..300)
            ) {
                let mut cache: SlruCache<u16, u16> = SlruCache::new(6, 5);
                for (k, read) in keys {
                    if read {
                        cache.get(&k);
                    } else {
                        cache.insert(k, k);
                    }
                }
                for list in [&cache.free, &cache.probationary, &cache.protected] {
                    let forward: Vec<_> = list.iter(&cache.pool).collect();
                    let mut backward: Vec<_> = list.iter_rev(&cache.pool).collect();
                    backward.reverse();
                    prop_assert_eq!(forward.len(), list.len());
                    prop_assert_eq!(forward, backward);
                }
                prop_assert_eq!(cache.segment_sizes().total(), cache.capacity());
            }
        }
    }

    // ==============================================
    // Metrics
    // ==============================================

    #[cfg(feature = "metrics")]
    mod metrics {
        use super::*;

        #[test]
        fn snapshot_tracks_segment_movement() {
            let mut cache = SlruCache::new(1, 1);
            cache.insert("a", 1);
            cache.get(&"a");
            cache.get(&"missing");
            cache.insert("b", 2);
            cache.insert("c", 3);
            cache.get(&"c");
            cache.insert("c", 4);
            cache.remove(&"c");

            let snap = cache.metrics_snapshot();
            assert_eq!(snap.get_calls, 3);
            assert_eq!(snap.get_hits, 2);
            assert_eq!(snap.get_misses, 1);
            assert_eq!(snap.insert_calls, 4);
            assert_eq!(snap.insert_new, 3);
            assert_eq!(snap.insert_updates, 1);
            assert_eq!(snap.probationary_to_protected, 2);
            assert_eq!(snap.probationary_evictions, 1);
            assert_eq!(snap.protected_evictions, 1);
            assert_eq!(snap.removals, 1);
            assert_eq!(snap.free_len, 2);
            assert_eq!(snap.capacity, 2);

            cache.reset_metrics();
            assert_eq!(cache.metrics_snapshot().get_calls, 0);
        }
    }

    // ==============================================
    // Concurrent wrapper
    // ==============================================

    #[cfg(feature = "concurrency")]
    mod concurrent {
        use super::*;

        #[test]
        fn basic_ops_through_lock() {
            let cache = ConcurrentSlruCache::new(2, 2);
            cache.insert(1, "one".to_string());
            assert_eq!(cache.peek_with(&1, |v| v.len()), Some(3));
            assert_eq!(cache.get_cloned(&1), Some("one".to_string()));
            assert_eq!(cache.segment_sizes().protected, 1);
            assert!(cache.try_insert(2, "two".to_string()).is_ok());
            assert!(cache.remove(&2));
            assert_eq!(cache.len(), 1);
            assert!(!cache.check_sanity());

            let inner = cache.into_inner();
            assert_eq!(inner.segment_of(&1), Some(Segment::Protected));
        }

        #[test]
        fn wrapper_is_sync_with_send_only_hooks() {
            use std::cell::Cell;

            let calls = Cell::new(0u32);
            let mut inner: SlruCache<u32, u32> = SlruCache::new(1, 1);
            inner.set_on_promote(move |_| calls.set(calls.get() + 1));
            let cache = ConcurrentSlruCache::from_cache(inner);

            fn assert_sync<T: Sync>(_: &T) {}
            assert_sync(&cache);

            std::thread::scope(|scope| {
                scope.spawn(|| {
                    cache.insert(7, 70);
                    assert_eq!(cache.get_cloned(&7), Some(70));
                });
            });
            assert_eq!(cache.segment_sizes().protected, 1);
        }

        #[test]
        fn try_insert_hands_back_pair_when_locked() {
            let cache: ConcurrentSlruCache<u32, u32> = ConcurrentSlruCache::new(2, 2);
            let returned = cache.with_cache(|_inner| cache.try_insert(1, 10));
            assert_eq!(returned, Err((1, 10)));
            assert!(cache.is_empty());
        }
    }
}
