//! slrukit: a fixed-capacity segmented LRU (SLRU) cache.
//!
//! Entries live in a pre-sized slot pool threaded by three index-linked
//! lists (free, probationary, protected). New keys enter the probationary
//! segment; a lookup hit promotes them into the protected segment.
//!
//! See `DESIGN.md` for internal architecture and invariants.

pub mod builder;
pub mod ds;
pub mod error;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod policy;
pub mod prelude;
pub mod traits;

pub use crate::builder::SlruBuilder;
pub use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "concurrency")]
pub use crate::policy::slru::ConcurrentSlruCache;
pub use crate::policy::slru::{Segment, SegmentSizes, SlruCache};
