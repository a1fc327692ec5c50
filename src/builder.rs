//! Builder for [`SlruCache`] configuration.
//!
//! Collects segment sizes and hooks up front so a cache can be created in one
//! expression, either from explicit segment capacities or from a total
//! capacity plus a probationary fraction.
//!
//! ## Example
//!
//! ```rust
//! use slrukit::builder::SlruBuilder;
//!
//! let mut cache = SlruBuilder::new(8, 4)
//!     .on_evict(|key: &u64| println!("evicted {key}"))
//!     .build::<String>();
//!
//! cache.insert(1, "hello".to_string());
//! assert_eq!(cache.get(&1), Some(&"hello".to_string()));
//! ```

use std::fmt;
use std::hash::Hash;

use crate::error::ConfigError;
use crate::policy::slru::{KeyHook, SlruCache};

/// Configuration for an [`SlruCache`] keyed by `K`.
pub struct SlruBuilder<K> {
    survivor_capacity: usize,
    probationary_capacity: usize,
    on_promote: Option<KeyHook<K>>,
    on_evict: Option<KeyHook<K>>,
}

impl<K> SlruBuilder<K>
where
    K: Clone + Eq + Hash,
{
    /// Create a builder with explicit segment capacities.
    pub fn new(survivor_capacity: usize, probationary_capacity: usize) -> Self {
        Self {
            survivor_capacity,
            probationary_capacity,
            on_promote: None,
            on_evict: None,
        }
    }

    /// Split `capacity` slots, giving `probationary_frac` of them to the
    /// probationary segment.
    ///
    /// The fraction is clamped to `0.0..=1.0`. With `capacity >= 2` each
    /// segment receives at least one slot; smaller totals are rejected by
    /// [`try_build`](Self::try_build).
    ///
    /// ```rust
    /// use slrukit::builder::SlruBuilder;
    ///
    /// let builder = SlruBuilder::<u64>::with_total(100, 0.2);
    /// assert_eq!(builder.capacities(), (80, 20));
    ///
    /// let builder = SlruBuilder::<u64>::with_total(10, 1.0);
    /// assert_eq!(builder.capacities(), (1, 9));
    /// ```
    pub fn with_total(capacity: usize, probationary_frac: f64) -> Self {
        let frac = if probationary_frac.is_nan() {
            0.0
        } else {
            probationary_frac.clamp(0.0, 1.0)
        };

        let probationary = if capacity < 2 {
            capacity
        } else {
            let wanted = (capacity as f64 * frac).round() as usize;
            wanted.clamp(1, capacity - 1)
        };

        Self::new(capacity - probationary, probationary)
    }

    /// `(survivor_capacity, probationary_capacity)` as currently configured.
    pub fn capacities(&self) -> (usize, usize) {
        (self.survivor_capacity, self.probationary_capacity)
    }

    /// Hook fired when a key is promoted into the protected segment.
    pub fn on_promote<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&K) + Send + 'static,
    {
        self.on_promote = Some(Box::new(hook));
        self
    }

    /// Hook fired when a key's slot is reclaimed.
    pub fn on_evict<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&K) + Send + 'static,
    {
        self.on_evict = Some(Box::new(hook));
        self
    }

    /// Build the cache.
    ///
    /// # Panics
    ///
    /// Panics if either segment capacity is zero.
    pub fn build<V>(self) -> SlruCache<K, V> {
        match self.try_build() {
            Ok(cache) => cache,
            Err(err) => panic!("invalid SLRU configuration: {err}"),
        }
    }

    /// Build the cache, reporting invalid capacities as [`ConfigError`].
    ///
    /// ```rust
    /// use slrukit::builder::SlruBuilder;
    ///
    /// assert!(SlruBuilder::<u64>::new(0, 4).try_build::<u64>().is_err());
    /// assert!(SlruBuilder::<u64>::with_total(1, 0.5).try_build::<u64>().is_err());
    /// ```
    pub fn try_build<V>(self) -> Result<SlruCache<K, V>, ConfigError> {
        let mut cache = SlruCache::try_new(self.survivor_capacity, self.probationary_capacity)?;
        cache.install_hooks(self.on_promote, self.on_evict);
        Ok(cache)
    }
}

impl<K> fmt::Debug for SlruBuilder<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlruBuilder")
            .field("survivor_capacity", &self.survivor_capacity)
            .field("probationary_capacity", &self.probationary_capacity)
            .field("on_promote", &self.on_promote.is_some())
            .field("on_evict", &self.on_evict.is_some())
            .finish()
    }
}
