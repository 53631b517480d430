//! Simulated Database
//!
//! An in-memory record table behind an artificial delay.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::{RecordSource, RecordStore};
use crate::error::SourceError;
use crate::models::{NewRecord, Record};

// == Mock Database ==
#[derive(Debug)]
pub struct MockDatabase {
    records: RwLock<Table>,
    latency: Duration,
    failing: AtomicBool,
    fetches: AtomicUsize,
}

#[derive(Debug)]
struct Table {
    rows: HashMap<u64, Record>,
    next_id: u64,
}

impl MockDatabase {
    /// Creates an empty database answering after `latency`.
    pub fn new(latency: Duration) -> Self {
        Self {
            records: RwLock::new(Table {
                rows: HashMap::new(),
                next_id: 1,
            }),
            latency,
            failing: AtomicBool::new(false),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Creates a database holding the three demo users.
    pub fn seeded(latency: Duration) -> Self {
        let seed = [
            Record::new(1, "John Doe", "john@example.com"),
            Record::new(2, "Jane Smith", "jane@example.com"),
            Record::new(3, "Alice Johnson", "alice@example.com"),
        ];
        let rows: HashMap<u64, Record> = seed.into_iter().map(|r| (r.id, r)).collect();

        Self {
            records: RwLock::new(Table { rows, next_id: 4 }),
            ..Self::new(latency)
        }
    }

    /// Makes every subsequent fetch fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of fetches that reached the database.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordSource for MockDatabase {
    async fn fetch(&self, key: &str) -> Result<Option<Record>, SourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        debug!(key, "database fetch");
        tokio::time::sleep(self.latency).await;

        if self.failing.load(Ordering::SeqCst) {
            return Err(SourceError::Unavailable("simulated database failure".into()));
        }

        // Non-numeric keys can never match a row
        let Ok(id) = key.parse::<u64>() else {
            return Ok(None);
        };
        Ok(self.records.read().await.rows.get(&id).cloned())
    }
}

#[async_trait]
impl RecordStore for MockDatabase {
    async fn insert(&self, fields: NewRecord) -> Result<Record, SourceError> {
        let mut table = self.records.write().await;
        let record = Record::new(table.next_id, fields.name, fields.email);
        table.next_id += 1;
        table.rows.insert(record.id, record.clone());
        Ok(record)
    }
}
