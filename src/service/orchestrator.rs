//! Request Orchestrator
//!
//! Per-lookup control flow: limiter, then cache, then a coalesced source
//! fetch on a miss. The coalesced fetch writes a found record back into the
//! cache before anyone else can miss on it.

use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use crate::cache::{CacheStore, SharedCache};
use crate::coalesce::FetchCoalescer;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{NewRecord, Provenance, Record, StatusResponse};
use crate::ratelimit::SlidingWindowLimiter;
use crate::source::{MockDatabase, RecordSource, RecordStore};

/// A successful lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup {
    pub provenance: Provenance,
    pub record: Record,
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

// == Request Orchestrator ==
pub struct RequestOrchestrator {
    cache: SharedCache,
    coalescer: FetchCoalescer,
    limiter: Arc<SlidingWindowLimiter>,
    store: Arc<dyn RecordStore>,
}

impl RequestOrchestrator {
    pub fn new(
        cache: SharedCache,
        limiter: Arc<SlidingWindowLimiter>,
        source: Arc<dyn RecordSource>,
        store: Arc<dyn RecordStore>,
    ) -> Self {
        Self {
            coalescer: FetchCoalescer::new(source, cache.clone()),
            cache,
            limiter,
            store,
        }
    }

    /// Builds an orchestrator over `db` with every parameter taken from
    /// the configuration.
    pub fn with_database(config: &Config, db: Arc<MockDatabase>) -> Self {
        let cache = Arc::new(RwLock::new(CacheStore::new(
            config.cache_capacity,
            config.cache_ttl(),
        )));
        let limiter = Arc::new(SlidingWindowLimiter::new(config.rate_limit()));
        Self::new(cache, limiter, db.clone(), db)
    }

    /// Builds an orchestrator over the seeded demo database.
    pub fn from_config(config: &Config) -> Self {
        let db = Arc::new(MockDatabase::seeded(config.source_latency()));
        Self::with_database(config, db)
    }

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    pub fn limiter(&self) -> &Arc<SlidingWindowLimiter> {
        &self.limiter
    }

    pub fn coalescer(&self) -> &FetchCoalescer {
        &self.coalescer
    }

    // == Admit ==
    /// Charges one request to `identity`, failing with `RateLimited` if
    /// the client must back off.
    pub fn admit(&self, identity: &str) -> Result<()> {
        if self.limiter.check(identity).is_admitted() {
            Ok(())
        } else {
            Err(AppError::RateLimited)
        }
    }

    // == Lookup ==
    /// Resolves `key` for `identity`.
    ///
    /// Rejected requests touch neither the cache nor the timing stats.
    /// Failed fetches are not timed.
    pub async fn lookup(&self, identity: &str, key: &str) -> Result<Lookup> {
        self.admit(identity)?;
        let started = Instant::now();

        {
            let cache = self.cache.read().await;
            if let Some(record) = cache.get(key) {
                cache.record_response_time(elapsed_ms(started));
                return Ok(Lookup {
                    provenance: Provenance::Cache,
                    record,
                });
            }
        }

        let fetched = self.coalescer.fetch(key).await?;
        self.cache
            .read()
            .await
            .record_response_time(elapsed_ms(started));

        match fetched {
            Some(record) => Ok(Lookup {
                provenance: Provenance::Source,
                record,
            }),
            None => Err(AppError::NotFound(key.to_string())),
        }
    }

    // == Create ==
    /// Validates and stores a new record, then caches it under its id.
    pub async fn create(&self, fields: NewRecord) -> Result<Record> {
        fields.validate()?;
        let record = self.store.insert(fields).await?;
        self.cache.write().await.set(record.key(), record.clone());
        debug!(id = record.id, "record created");
        Ok(record)
    }

    // == Clear Cache ==
    pub async fn clear_cache(&self) {
        self.cache.write().await.clear();
    }

    // == Cache Status ==
    pub async fn cache_status(&self) -> StatusResponse {
        let stats = self.cache.read().await.stats();
        StatusResponse::new(
            stats.hits,
            stats.misses,
            stats.total_entries,
            stats.avg_response_time_ms(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use futures::future::join_all;
    use tokio_test::{assert_err, assert_ok};

    const IP: &str = "127.0.0.1";

    fn setup() -> (Arc<RequestOrchestrator>, Arc<MockDatabase>) {
        let config = Config::default();
        let db = Arc::new(MockDatabase::seeded(config.source_latency()));
        let orchestrator = Arc::new(RequestOrchestrator::with_database(&config, db.clone()));
        (orchestrator, db)
    }

    fn relaxed_limits() -> Config {
        Config {
            long_limit: 1_000,
            burst_limit: 1_000,
            ..Config::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cold_then_warm_lookup() {
        let (svc, db) = setup();

        let first = svc.lookup(IP, "1").await.unwrap();
        assert_eq!(first.provenance, Provenance::Source);
        assert_eq!(first.record.name, "John Doe");

        let status = svc.cache_status().await;
        assert_eq!(status.size, 1);
        assert_eq!(status.misses, 1);
        assert!(status.avg_response_time_ms >= 200.0);

        let second = svc.lookup(IP, "1").await.unwrap();
        assert_eq!(second.provenance, Provenance::Cache);
        assert_eq!(second.record, first.record);

        let status = svc.cache_status().await;
        assert_eq!(status.size, 1);
        assert_eq!(status.hits, 1);
        // 200ms and 0ms averaged
        assert!((status.avg_response_time_ms - 100.0).abs() < 1.0);
        assert_eq!(db.fetch_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_key_not_found() {
        let (svc, _db) = setup();

        let result = svc.lookup(IP, "999").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let status = svc.cache_status().await;
        assert_eq!(status.size, 0);
        assert_eq!(status.misses, 1);
        assert_eq!(svc.coalescer().in_flight(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_lookups_fetch_once() {
        let config = relaxed_limits();
        let db = Arc::new(MockDatabase::seeded(config.source_latency()));
        let svc = Arc::new(RequestOrchestrator::with_database(&config, db.clone()));

        let results = join_all((0..25).map(|_| {
            let svc = svc.clone();
            async move { svc.lookup(IP, "2").await }
        }))
        .await;

        assert_eq!(db.fetch_count(), 1);
        for result in results {
            let lookup = result.unwrap();
            assert_eq!(lookup.provenance, Provenance::Source);
            assert_eq!(lookup.record.id, 2);
        }
        assert_eq!(svc.cache_status().await.size, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_source_failure_is_internal_error() {
        let (svc, db) = setup();
        db.set_failing(true);

        let result = svc.lookup(IP, "1").await;
        assert!(matches!(result, Err(AppError::Source(_))));

        let status = svc.cache_status().await;
        assert_eq!(status.size, 0);
        assert_eq!(status.avg_response_time_ms, 0.0);
        assert_eq!(svc.coalescer().in_flight(), 0);

        db.set_failing(false);
        assert_ok!(svc.lookup(IP, "1").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_lookup_skips_cache() {
        let (svc, _db) = setup();

        for _ in 0..10 {
            assert_ok!(svc.lookup(IP, "1").await);
        }
        let before = svc.cache_status().await;

        let result = svc.lookup(IP, "1").await;
        assert!(matches!(result, Err(AppError::RateLimited)));
        assert_eq!(svc.cache_status().await, before);

        // Other clients are unaffected
        assert_ok!(svc.lookup("10.0.0.2", "1").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetched_value_does_not_overwrite_fresher_write() {
        let (svc, _db) = setup();

        let lookup = {
            let svc = svc.clone();
            tokio::spawn(async move { svc.lookup(IP, "1").await })
        };

        // Populate the cache directly while the fetch is outstanding
        tokio::time::sleep(Duration::from_millis(50)).await;
        let fresh = Record::new(1, "Johnny", "johnny@example.com");
        svc.cache().write().await.set("1".to_string(), fresh.clone());

        let result = lookup.await.unwrap().unwrap();
        assert_eq!(result.provenance, Provenance::Source);
        assert_eq!(svc.cache().read().await.get("1"), Some(fresh));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_leader_does_not_cause_second_fetch() {
        let (svc, db) = setup();

        // Leader is polled once, then not again until well after the
        // source has answered
        let mut leader = Box::pin(svc.lookup("10.0.0.1", "1"));
        assert!(futures::poll!(leader.as_mut()).is_pending());
        tokio::time::sleep(Duration::from_millis(250)).await;

        let second = svc.lookup("10.0.0.2", "1").await.unwrap();
        assert_eq!(second.provenance, Provenance::Cache);
        assert_eq!(db.fetch_count(), 1);

        let first = leader.await.unwrap();
        assert_eq!(first.provenance, Provenance::Source);
        assert_eq!(svc.cache_status().await.size, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_lookup_still_populates_cache() {
        let (svc, db) = setup();

        let gave_up = tokio::time::timeout(Duration::from_millis(50), svc.lookup(IP, "3")).await;
        assert!(gave_up.is_err());
        tokio::time::sleep(Duration::from_millis(300)).await;

        let lookup = svc.lookup(IP, "3").await.unwrap();
        assert_eq!(lookup.provenance, Provenance::Cache);
        assert_eq!(db.fetch_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_caches_record() {
        let (svc, db) = setup();

        let record = svc
            .create(NewRecord::new("Bob", "bob@example.com"))
            .await
            .unwrap();
        assert_eq!(record.id, 4);

        let lookup = svc.lookup(IP, "4").await.unwrap();
        assert_eq!(lookup.provenance, Provenance::Cache);
        assert_eq!(lookup.record, record);
        assert_eq!(db.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let (svc, _db) = setup();

        let result = svc.create(NewRecord::new("Bob", "")).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(svc.cache_status().await.size, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_cache_keeps_counters() {
        let (svc, _db) = setup();

        svc.lookup(IP, "1").await.unwrap();
        svc.lookup(IP, "1").await.unwrap();
        let _ = svc.lookup(IP, "999").await;
        let before = svc.cache_status().await;

        svc.clear_cache().await;

        let after = svc.cache_status().await;
        assert_eq!(after.size, 0);
        assert_eq!(after.hits, before.hits);
        assert_eq!(after.misses, before.misses);
    }

    #[tokio::test]
    async fn test_admit() {
        let (svc, _db) = setup();
        for _ in 0..10 {
            assert_ok!(svc.admit(IP));
        }
        assert_err!(svc.admit(IP));
    }
}
