//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use super::{Provenance, Record};

/// Response body for a lookup (GET /users/:id)
#[derive(Debug, Clone, Serialize)]
pub struct LookupResponse {
    /// Whether the record came from the cache or the source
    pub source: Provenance,
    pub user: Record,
}

impl LookupResponse {
    pub fn new(source: Provenance, user: Record) -> Self {
        Self { source, user }
    }
}

/// Response body for record creation (POST /users)
#[derive(Debug, Clone, Serialize)]
pub struct CreateResponse {
    pub user: Record,
}

/// Response body for DELETE /cache
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub ok: bool,
}

impl ClearResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

/// Response body for the cache status endpoint (GET /cache-status)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Entries currently stored, including expired ones not yet swept
    pub size: usize,
    /// Mean recorded response time, rounded to two decimals
    pub avg_response_time_ms: f64,
}

impl StatusResponse {
    pub fn new(hits: u64, misses: u64, size: usize, avg_response_time_ms: f64) -> Self {
        Self {
            hits,
            misses,
            size,
            avg_response_time_ms: (avg_response_time_ms * 100.0).round() / 100.0,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
