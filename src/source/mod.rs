//! Record Source Module
//!
//! The slow keyed data source fronted by the cache, and a simulated
//! in-memory implementation with fixed latency.

mod mock;

use async_trait::async_trait;

use crate::error::SourceError;
use crate::models::{NewRecord, Record};

pub use mock::MockDatabase;

/// Asynchronous exact-key lookup against the backing store.
#[async_trait]
pub trait RecordSource: Send + Sync + 'static {
    /// Returns the record for `key`, `None` if it does not exist.
    async fn fetch(&self, key: &str) -> Result<Option<Record>, SourceError>;
}

/// Write side of the backing store.
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    /// Inserts a new record and returns it with its assigned id.
    async fn insert(&self, fields: NewRecord) -> Result<Record, SourceError>;
}
