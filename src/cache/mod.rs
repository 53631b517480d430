//! Cache Module
//!
//! Provides in-memory record caching with TTL expiration and LRU eviction.

use std::sync::Arc;

use tokio::sync::RwLock;

mod entry;
mod lru;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use stats::{CacheStats, StatsRecorder};
pub use store::CacheStore;

/// Cache handle shared between the orchestrator and the sweep task.
///
/// Reads take the shared lock; the hit/miss counters are atomic.
pub type SharedCache = Arc<RwLock<CacheStore>>;
