//! # Metrics Traits
//!
//! Recording and snapshotting are kept apart: recorders only write counters,
//! snapshot providers only read them.
//!
//! ```text
//!   ┌─────────────────────────────┐
//!   │     CoreMetricsRecorder     │  get hit/miss, insert, evict, clear
//!   └──────────────┬──────────────┘
//!                  ▼
//!   ┌─────────────────────────────┐
//!   │     SlruMetricsRecorder     │  promotion, per-segment eviction, remove
//!   └─────────────────────────────┘
//!
//!   ┌─────────────────────────────┐
//!   │ MetricsSnapshotProvider<S>  │  point-in-time copy for tests / benches
//!   └─────────────────────────────┘
//! ```

/// Common counters for any cache policy.
pub trait CoreMetricsRecorder {
    fn record_get_hit(&mut self);
    fn record_get_miss(&mut self);
    fn record_insert_call(&mut self);
    fn record_insert_new(&mut self);
    fn record_insert_update(&mut self);
    fn record_evict_call(&mut self);
    fn record_evicted_entry(&mut self);
    fn record_clear(&mut self);
}

/// Segment movement counters.
pub trait SlruMetricsRecorder: CoreMetricsRecorder {
    fn record_probationary_to_protected(&mut self);
    fn record_protected_eviction(&mut self);
    fn record_probationary_eviction(&mut self);
    fn record_remove(&mut self);
}

/// Produces a point-in-time snapshot of the recorded counters.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}
