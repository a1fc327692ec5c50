//! Error types for slrukit.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned by fallible constructors when a segment
//!   capacity cannot produce a working cache.
//! - [`InvariantError`]: Returned by
//!   [`SlruCache::check_invariants`](crate::policy::slru::SlruCache::check_invariants)
//!   when the slot partition, the key map or the list links disagree.
//!
//! ## Example Usage
//!
//! ```
//! use slrukit::error::ConfigError;
//! use slrukit::policy::slru::SlruCache;
//!
//! let cache: Result<SlruCache<String, i32>, ConfigError> = SlruCache::try_new(8, 4);
//! assert!(cache.is_ok());
//!
//! let bad = SlruCache::<String, i32>::try_new(8, 0);
//! assert!(bad.unwrap_err().to_string().contains("probationary"));
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Carries a human-readable description of the first failed check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by [`SlruCache::try_new`](crate::policy::slru::SlruCache::try_new)
/// and [`SlruBuilder::try_build`](crate::builder::SlruBuilder::try_build).
///
/// # Example
///
/// ```
/// use slrukit::policy::slru::SlruCache;
///
/// let err = SlruCache::<u64, u64>::try_new(0, 4).unwrap_err();
/// assert!(err.to_string().contains("survivor"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
