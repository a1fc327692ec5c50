//! Cache eviction policies.

pub mod slru;
