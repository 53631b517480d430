//! Record Model
//!
//! The value type stored by the data source and held in the cache.

use serde::{Deserialize, Serialize};

/// A user record, identified by its numeric id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: u64,
    pub name: String,
    pub email: String,
}

impl Record {
    pub fn new(id: u64, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
        }
    }

    /// Cache key under which this record is stored.
    pub fn key(&self) -> String {
        self.id.to_string()
    }
}

/// Where a looked-up record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Served from the TTL cache
    Cache,
    /// Fetched from the record source
    Source,
}
