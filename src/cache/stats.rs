//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, evictions and
//! response times.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Point-in-time snapshot of cache performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// Number of entries evicted due to LRU policy
    pub evictions: u64,
    /// Sum of recorded response times
    pub total_response_time_ms: f64,
    /// Number of recorded response times
    pub response_count: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
}

impl CacheStats {
    // == Average Response Time ==
    /// Returns the mean recorded response time, or 0.0 without samples.
    pub fn avg_response_time_ms(&self) -> f64 {
        if self.response_count == 0 {
            0.0
        } else {
            self.total_response_time_ms / self.response_count as f64
        }
    }
}

// == Stats Recorder ==
/// Process-lifetime counters, updated lock-free so lookups can record
/// through a shared reference. Never reset by clearing the cache.
#[derive(Debug, Default)]
pub struct StatsRecorder {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    /// Microseconds, to keep sub-millisecond samples in an integer counter
    total_response_us: AtomicU64,
    response_count: AtomicU64,
}

impl StatsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    /// Accumulates one response time sample, independent of hit or miss.
    pub fn record_response_time(&self, ms: f64) {
        let us = (ms.max(0.0) * 1000.0).round() as u64;
        self.total_response_us.fetch_add(us, Ordering::Relaxed);
        self.response_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Captures the counters together with the current entry count.
    pub fn snapshot(&self, total_entries: usize) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            total_response_time_ms: self.total_response_us.load(Ordering::Relaxed) as f64
                / 1000.0,
            response_count: self.response_count.load(Ordering::Relaxed),
            total_entries,
        }
    }
}
