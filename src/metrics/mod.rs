//! Hit/miss, admission and eviction counters for [`SlruCache`](crate::policy::slru::SlruCache).
//!
//! Compiled only with the `metrics` feature. Recording is plain `u64`
//! arithmetic on the cache's own fields, so it adds no synchronization.

pub mod metrics_impl;
pub mod snapshot;
pub mod traits;

pub use metrics_impl::SlruMetrics;
pub use snapshot::SlruMetricsSnapshot;
pub use traits::{CoreMetricsRecorder, MetricsSnapshotProvider, SlruMetricsRecorder};
