//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::Duration;

use tokio::time::Instant;

use crate::models::Record;

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored record
    pub value: Record,
    /// Insertion time
    pub inserted_at: Instant,
    /// Expiration time
    pub expires_at: Instant,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry inserted at `now` living for `ttl`.
    pub fn new(value: Record, now: Instant, ttl: Duration) -> Self {
        Self {
            value,
            inserted_at: now,
            expires_at: now + ttl,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// Boundary condition: an entry is expired once `now >= expires_at`, so a
    /// record is never served at the exact instant its TTL elapses.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}
