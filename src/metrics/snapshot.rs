/// Copy of [`SlruMetrics`](super::SlruMetrics) counters plus segment gauges.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SlruMetricsSnapshot {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,

    pub insert_calls: u64,
    pub insert_updates: u64,
    pub insert_new: u64,

    pub evict_calls: u64,
    pub evicted_entries: u64,
    pub probationary_to_protected: u64,
    pub protected_evictions: u64,
    pub probationary_evictions: u64,
    pub removals: u64,
    pub clears: u64,

    // gauges captured at snapshot time
    pub cache_len: usize,
    pub capacity: usize,
    pub free_len: usize,
    pub probationary_len: usize,
    pub protected_len: usize,
}

impl SlruMetricsSnapshot {
    /// Fraction of lookups that hit, or `0.0` before the first lookup.
    pub fn hit_ratio(&self) -> f64 {
        if self.get_calls == 0 {
            0.0
        } else {
            self.get_hits as f64 / self.get_calls as f64
        }
    }
}
