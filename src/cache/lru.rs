//! LRU Tracker Module
//!
//! Implements Least Recently Used tracking for cache eviction.

use std::collections::{BTreeMap, HashMap};

// == LRU Tracker ==
/// Tracks write order for LRU eviction.
///
/// Every touch stamps the key with a fresh, strictly increasing sequence
/// number. The smallest live stamp is the least recently written key, so
/// ties in wall-clock time fall back to insertion order.
#[derive(Debug, Default)]
pub struct LruTracker {
    /// Sequence number -> key, ascending = oldest first
    order: BTreeMap<u64, String>,
    /// Key -> its current sequence number
    stamps: HashMap<String, u64>,
    next_seq: u64,
}

impl LruTracker {
    // == Constructor ==
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as most recently written.
    pub fn touch(&mut self, key: &str) {
        let seq = self.next_seq;
        self.next_seq += 1;

        if let Some(old) = self.stamps.insert(key.to_string(), seq) {
            self.order.remove(&old);
        }
        self.order.insert(seq, key.to_string());
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently used key.
    ///
    /// Returns None if tracker is empty.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let (_, key) = self.order.pop_first()?;
        self.stamps.remove(&key);
        Some(key)
    }

    // == Peek Oldest ==
    /// Returns the least recently used key without removing it.
    pub fn peek_oldest(&self) -> Option<&str> {
        self.order.first_key_value().map(|(_, key)| key.as_str())
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.order.clear();
        self.stamps.clear();
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.order.len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[cfg(test)]
    fn contains(&self, key: &str) -> bool {
        self.stamps.contains_key(key)
    }
}
