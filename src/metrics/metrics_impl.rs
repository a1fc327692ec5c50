use crate::metrics::snapshot::SlruMetricsSnapshot;
use crate::metrics::traits::{CoreMetricsRecorder, MetricsSnapshotProvider, SlruMetricsRecorder};

// ---------------------------------------------------------------------------
// SlruMetrics
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone)]
pub struct SlruMetrics {
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
}

impl SlruMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl CoreMetricsRecorder for SlruMetrics {
    fn record_get_hit(&mut self) {
        self.get_calls += 1;
        self.get_hits += 1;
    }
    fn record_get_miss(&mut self) {
        self.get_calls += 1;
        self.get_misses += 1;
    }
    fn record_insert_call(&mut self) {
        self.insert_calls += 1;
    }
    fn record_insert_new(&mut self) {
        self.insert_new += 1;
    }
    fn record_insert_update(&mut self) {
        self.insert_updates += 1;
    }
    fn record_evict_call(&mut self) {
        self.evict_calls += 1;
    }
    fn record_evicted_entry(&mut self) {
        self.evicted_entries += 1;
    }
    fn record_clear(&mut self) {
        self.clears += 1;
    }
}

impl SlruMetricsRecorder for SlruMetrics {
    fn record_probationary_to_protected(&mut self) {
        self.probationary_to_protected += 1;
    }
    fn record_protected_eviction(&mut self) {
        self.record_evict_call();
        self.record_evicted_entry();
        self.protected_evictions += 1;
    }
    fn record_probationary_eviction(&mut self) {
        self.record_evict_call();
        self.record_evicted_entry();
        self.probationary_evictions += 1;
    }
    fn record_remove(&mut self) {
        self.removals += 1;
    }
}

/// Counter-only snapshot; the cache fills in the gauges.
impl MetricsSnapshotProvider<SlruMetricsSnapshot> for SlruMetrics {
    fn snapshot(&self) -> SlruMetricsSnapshot {
        SlruMetricsSnapshot {
            get_calls: self.get_calls,
            get_hits: self.get_hits,
            get_misses: self.get_misses,
            insert_calls: self.insert_calls,
            insert_updates: self.insert_updates,
            insert_new: self.insert_new,
            evict_calls: self.evict_calls,
            evicted_entries: self.evicted_entries,
            probationary_to_protected: self.probationary_to_protected,
            protected_evictions: self.protected_evictions,
            probationary_evictions: self.probationary_evictions,
            removals: self.removals,
            clears: self.clears,
            ..Default::default()
        }
    }
}
