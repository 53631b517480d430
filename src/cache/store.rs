//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with LRU tracking and TTL expiration.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use crate::cache::{CacheEntry, CacheStats, LruTracker, StatsRecorder};
use crate::models::Record;

// == Cache Store ==
/// Bounded record cache with a uniform TTL and LRU eviction.
///
/// Recency is driven by writes only: `get` neither refreshes the TTL nor
/// moves the entry in the eviction order. Because every write stamps a
/// fresh TTL of the same length, the LRU order is also expiry order.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Write-order tracker
    lru: LruTracker,
    /// Performance statistics
    stats: StatsRecorder,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// Lifetime of every entry
    ttl: Duration,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore with specified capacity and TTL.
    ///
    /// A capacity of zero is treated as one.
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: StatsRecorder::new(),
            max_entries: max_entries.max(1),
            ttl,
        }
    }

    // == Set ==
    /// Stores a record, overwriting any previous value and resetting its TTL.
    ///
    /// If the cache is at capacity, the least recently written entry is
    /// evicted first.
    pub fn set(&mut self, key: String, value: Record) {
        self.set_at(key, value, Instant::now());
    }

    pub fn set_at(&mut self, key: String, value: Record, now: Instant) {
        let is_overwrite = self.entries.contains_key(&key);

        if !is_overwrite && self.entries.len() >= self.max_entries {
            if let Some(evicted_key) = self.lru.evict_oldest() {
                self.entries.remove(&evicted_key);
                self.stats.record_eviction();
            }
        }

        self.entries
            .insert(key.clone(), CacheEntry::new(value, now, self.ttl));
        self.lru.touch(&key);
    }

    // == Set If Absent ==
    /// Stores a record only if no live entry exists for `key`.
    ///
    /// An expired but not yet swept entry counts as absent. Returns whether
    /// the write happened. Does not touch hit/miss counters.
    pub fn set_if_absent(&mut self, key: String, value: Record) -> bool {
        self.set_if_absent_at(key, value, Instant::now())
    }

    pub fn set_if_absent_at(&mut self, key: String, value: Record, now: Instant) -> bool {
        let live = self
            .entries
            .get(&key)
            .is_some_and(|entry| !entry.is_expired_at(now));
        if live {
            return false;
        }
        self.set_at(key, value, now);
        true
    }

    // == Get ==
    /// Retrieves a live record by key, counting a hit or a miss.
    ///
    /// Expired entries are reported as misses but left for the sweeper.
    pub fn get(&self, key: &str) -> Option<Record> {
        self.get_at(key, Instant::now())
    }

    pub fn get_at(&self, key: &str, now: Instant) -> Option<Record> {
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired_at(now) => {
                self.stats.record_hit();
                Some(entry.value.clone())
            }
            _ => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Clear ==
    /// Removes every entry. Statistics are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
    }

    // == Record Response Time ==
    pub fn record_response_time(&self, ms: f64) {
        self.stats.record_response_time(ms);
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.entries.len())
    }

    // == Purge Expired ==
    /// Removes up to `limit` expired entries, oldest first.
    ///
    /// Returns the number of entries removed. A return value below `limit`
    /// means no expired entries remain.
    pub fn purge_expired(&mut self, limit: usize) -> usize {
        self.purge_expired_at(Instant::now(), limit)
    }

    pub fn purge_expired_at(&mut self, now: Instant, limit: usize) -> usize {
        let mut removed = 0;
        while removed < limit {
            let expired = match self.lru.peek_oldest() {
                Some(key) => self
                    .entries
                    .get(key)
                    .map_or(true, |entry| entry.is_expired_at(now)),
                None => break,
            };
            if !expired {
                break;
            }
            if let Some(key) = self.lru.evict_oldest() {
                self.entries.remove(&key);
                removed += 1;
            }
        }
        removed
    }

    // == Length ==
    /// Returns the number of stored entries.
    ///
    /// Expired entries still count until the sweeper removes them.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
