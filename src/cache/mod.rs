//! Cache Module
//!
//! Provides a generic in-memory cache with idle-time (TTL) expiration and a
//! pluggable disposal callback for evicted values.

mod entry;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::{EvictFn, ExpiringCache};
