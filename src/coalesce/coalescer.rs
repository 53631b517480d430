//! Fetch Coalescer
//!
//! The first caller for a key (the leader) spawns the source fetch and
//! publishes a shared handle to its result; callers arriving while it is
//! outstanding (followers) await that same handle. The fetch runs on its
//! own task, so it completes even if every caller gives up waiting.
//!
//! A found record is written to the cache (set-if-absent) by the fetch task
//! itself, before the key's in-flight slot is released. A caller arriving
//! after completion therefore hits either the slot or the cache, never
//! neither.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, warn};

use crate::cache::SharedCache;
use crate::error::SourceError;
use crate::models::Record;
use crate::source::RecordSource;

/// Result of one source fetch, as seen by every caller that shared it.
pub type FetchOutcome = Result<Option<Record>, SourceError>;

type SharedFetch = Shared<BoxFuture<'static, FetchOutcome>>;
type InFlightTable = Arc<Mutex<HashMap<String, SharedFetch>>>;

fn lock(table: &InFlightTable) -> MutexGuard<'_, HashMap<String, SharedFetch>> {
    table.lock().unwrap_or_else(PoisonError::into_inner)
}

// == In-Flight Guard ==
/// Releases a key's in-flight slot when the fetch task ends, however it
/// ends (completion, panic or runtime shutdown).
struct InFlightGuard {
    table: InFlightTable,
    key: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        lock(&self.table).remove(&self.key);
    }
}

// == Fetch Coalescer ==
pub struct FetchCoalescer {
    source: Arc<dyn RecordSource>,
    cache: SharedCache,
    in_flight: InFlightTable,
}

impl FetchCoalescer {
    /// Creates a coalescer over `source` that populates `cache`.
    pub fn new(source: Arc<dyn RecordSource>, cache: SharedCache) -> Self {
        Self {
            source,
            cache,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Fetches `key` from the source, joining an outstanding fetch for the
    /// same key if there is one.
    ///
    /// Absence and failure are shared with followers and never remembered:
    /// the next call after completion starts a fresh fetch.
    pub async fn fetch(&self, key: &str) -> FetchOutcome {
        let pending = self.join_or_lead(key);
        pending.await
    }

    /// Number of keys with an outstanding fetch.
    pub fn in_flight(&self) -> usize {
        lock(&self.in_flight).len()
    }

    fn join_or_lead(&self, key: &str) -> SharedFetch {
        // Check and insert under one lock so only one caller can lead
        let mut table = lock(&self.in_flight);
        if let Some(pending) = table.get(key) {
            debug!(key, "joining in-flight fetch");
            return pending.clone();
        }

        debug!(key, "starting source fetch");
        let guard = InFlightGuard {
            table: self.in_flight.clone(),
            key: key.to_string(),
        };
        let source = self.source.clone();
        let cache = self.cache.clone();
        let task = tokio::spawn(async move {
            let outcome = source.fetch(&guard.key).await;
            match &outcome {
                Ok(Some(record)) => {
                    let written = cache
                        .write()
                        .await
                        .set_if_absent(guard.key.clone(), record.clone());
                    if !written {
                        debug!(key = %guard.key, "cache already populated, keeping existing entry");
                    }
                }
                Ok(None) => {}
                Err(err) => warn!(key = %guard.key, error = %err, "source fetch failed"),
            }
            drop(guard);
            outcome
        });

        let pending = async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(err) => Err(SourceError::Aborted(err.to_string())),
            }
        }
        .boxed()
        .shared();

        table.insert(key.to_string(), pending.clone());
        pending
    }
}
