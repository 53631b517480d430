//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the store against its documented invariants.

use proptest::prelude::*;
use std::collections::HashSet;
use std::time::Duration;

use tokio::time::Instant;

use crate::cache::CacheStore;
use crate::models::Record;

// == Test Configuration ==
const TEST_MAX_ENTRIES: usize = 100;
const TEST_TTL: Duration = Duration::from_secs(60);

// == Strategies ==
/// Generates cache keys
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{1,16}"
}

fn record_strategy() -> impl Strategy<Value = Record> {
    (any::<u64>(), "[a-zA-Z ]{1,32}", "[a-z]{1,12}@example\\.com")
        .prop_map(|(id, name, email)| Record::new(id, name, email))
}

/// Generates a sequence of cache operations for testing
#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: Record },
    SetIfAbsent { key: String, value: Record },
    Get { key: String },
    Clear,
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        4 => (key_strategy(), record_strategy())
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        2 => (key_strategy(), record_strategy())
            .prop_map(|(key, value)| CacheOp::SetIfAbsent { key, value }),
        4 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        1 => Just(CacheOp::Clear),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Hit and miss counters reflect exactly the gets that were served or
    // not, and survive clears.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let mut store = CacheStore::new(TEST_MAX_ENTRIES, TEST_TTL);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => store.set(key, value),
                CacheOp::SetIfAbsent { key, value } => {
                    store.set_if_absent(key, value);
                }
                CacheOp::Get { key } => match store.get(&key) {
                    Some(_) => expected_hits += 1,
                    None => expected_misses += 1,
                },
                CacheOp::Clear => store.clear(),
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.total_entries, store.len(), "Total entries mismatch");
    }

    // A set is immediately visible to the next get.
    #[test]
    fn prop_set_then_get(key in key_strategy(), value in record_strategy()) {
        let mut store = CacheStore::new(TEST_MAX_ENTRIES, TEST_TTL);

        store.set(key.clone(), value.clone());
        prop_assert_eq!(store.get(&key), Some(value));
    }

    // Clearing removes every previously set key.
    #[test]
    fn prop_clear_removes_everything(
        entries in prop::collection::vec((key_strategy(), record_strategy()), 1..50)
    ) {
        let mut store = CacheStore::new(TEST_MAX_ENTRIES, TEST_TTL);
        for (key, value) in &entries {
            store.set(key.clone(), value.clone());
        }

        store.clear();

        prop_assert_eq!(store.len(), 0);
        for (key, _) in &entries {
            prop_assert!(store.get(key).is_none());
        }
    }

    // The number of entries never exceeds capacity.
    #[test]
    fn prop_capacity_enforcement(
        entries in prop::collection::vec((key_strategy(), record_strategy()), 1..200)
    ) {
        let max_entries = 25;
        let mut store = CacheStore::new(max_entries, TEST_TTL);

        for (key, value) in entries {
            store.set(key, value);
            prop_assert!(
                store.len() <= max_entries,
                "Cache size {} exceeds max {}",
                store.len(),
                max_entries
            );
        }
    }

    // A record is served strictly before its deadline and never at or after it.
    #[test]
    fn prop_ttl_boundary(
        key in key_strategy(),
        value in record_strategy(),
        ttl_ms in 1u64..100_000,
        read_ms in 0u64..200_000,
    ) {
        let ttl = Duration::from_millis(ttl_ms);
        let mut store = CacheStore::new(TEST_MAX_ENTRIES, ttl);
        let t0 = Instant::now();

        store.set_at(key.clone(), value, t0);
        let found = store.get_at(&key, t0 + Duration::from_millis(read_ms)).is_some();

        prop_assert_eq!(found, read_ms < ttl_ms);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Inserting capacity + 1 distinct keys evicts exactly the first key set.
    #[test]
    fn prop_lru_eviction_order(
        initial_keys in prop::collection::vec(key_strategy(), 2..20),
        new_key in key_strategy(),
        new_value in record_strategy()
    ) {
        let mut seen = HashSet::new();
        let unique_keys: Vec<String> = initial_keys
            .into_iter()
            .filter(|k| seen.insert(k.clone()))
            .collect();

        prop_assume!(unique_keys.len() >= 2);
        prop_assume!(!unique_keys.contains(&new_key));

        let capacity = unique_keys.len();
        let mut store = CacheStore::new(capacity, TEST_TTL);

        for (i, key) in unique_keys.iter().enumerate() {
            store.set(key.clone(), Record::new(i as u64, "n", "e@example.com"));
        }
        prop_assert_eq!(store.len(), capacity);

        store.set(new_key.clone(), new_value);

        prop_assert_eq!(store.len(), capacity);
        prop_assert!(store.get(&unique_keys[0]).is_none(), "Oldest key should be evicted");
        prop_assert!(store.get(&new_key).is_some());
        for key in unique_keys.iter().skip(1) {
            prop_assert!(store.get(key).is_some(), "Key '{}' should survive", key);
        }
    }

    // Rewriting a key makes it the newest, so the next-oldest is evicted.
    #[test]
    fn prop_rewrite_refreshes_recency(
        initial_keys in prop::collection::vec(key_strategy(), 3..20),
        new_key in key_strategy(),
    ) {
        let mut seen = HashSet::new();
        let unique_keys: Vec<String> = initial_keys
            .into_iter()
            .filter(|k| seen.insert(k.clone()))
            .collect();

        prop_assume!(unique_keys.len() >= 3);
        prop_assume!(!unique_keys.contains(&new_key));

        let mut store = CacheStore::new(unique_keys.len(), TEST_TTL);
        for (i, key) in unique_keys.iter().enumerate() {
            store.set(key.clone(), Record::new(i as u64, "n", "e@example.com"));
        }

        store.set(unique_keys[0].clone(), Record::new(99, "n", "e@example.com"));
        store.set(new_key, Record::new(100, "n", "e@example.com"));

        prop_assert!(store.get(&unique_keys[0]).is_some());
        prop_assert!(store.get(&unique_keys[1]).is_none());
    }
}
