//! Commonly used types, for glob import.
//!
//! ```rust
//! use slrukit::prelude::*;
//!
//! let mut cache = SlruCache::new(4, 4);
//! cache.insert("k", 1);
//! assert_eq!(cache.segment_of(&"k"), Some(Segment::Probationary));
//! ```

pub use crate::builder::SlruBuilder;
pub use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "concurrency")]
pub use crate::policy::slru::ConcurrentSlruCache;
pub use crate::policy::slru::{Segment, SegmentSizes, SlruCache};
pub use crate::traits::{CoreCache, MutableCache, ReadOnlyCache};

#[cfg(feature = "metrics")]
pub use crate::metrics::SlruMetricsSnapshot;
