//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Lifetime of a cached record in milliseconds
    pub cache_ttl_ms: u64,
    /// Maximum number of records the cache can hold
    pub cache_capacity: usize,
    /// Background sweep interval in milliseconds
    pub sweep_interval_ms: u64,
    /// Maximum entries examined per cache lock acquisition during a sweep
    pub sweep_batch: usize,
    /// Long rate-limit window in milliseconds
    pub long_window_ms: u64,
    /// Requests allowed in the long window
    pub long_limit: usize,
    /// Burst rate-limit window in milliseconds
    pub burst_window_ms: u64,
    /// Requests allowed in the burst window
    pub burst_limit: usize,
    /// Extra time an idle client is remembered past the long window
    pub idle_grace_ms: u64,
    /// Simulated latency of the record source in milliseconds
    pub source_latency_ms: u64,
}

/// Sliding-window limiter parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub long_window: Duration,
    pub long_limit: usize,
    pub burst_window: Duration,
    pub burst_limit: usize,
    pub idle_grace: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Config::default().rate_limit()
    }
}

fn env_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> T {
    lookup(name)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 8000)
    /// - `CACHE_TTL_MS` - Record lifetime (default: 60000)
    /// - `CACHE_CAPACITY` - Maximum cached records (default: 10000)
    /// - `SWEEP_INTERVAL_MS` - Expiry sweep frequency (default: 5000)
    /// - `SWEEP_BATCH` - Entries per sweep lock acquisition (default: 256)
    /// - `RATE_LONG_WINDOW_MS` / `RATE_LONG_LIMIT` (default: 60000 / 10)
    /// - `RATE_BURST_WINDOW_MS` / `RATE_BURST_LIMIT` (default: 10000 / 5)
    /// - `RATE_IDLE_GRACE_MS` - Idle client retention slack (default: 10000)
    /// - `SOURCE_LATENCY_MS` - Simulated fetch latency (default: 200)
    pub fn from_env() -> Self {
        Self::from_env_with(|name| env::var(name).ok())
    }

    /// Builds a Config reading each variable through `lookup`.
    ///
    /// Missing or unparsable values fall back to the defaults.
    pub fn from_env_with<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        Self {
            server_port: env_or(&lookup, "SERVER_PORT", d.server_port),
            cache_ttl_ms: env_or(&lookup, "CACHE_TTL_MS", d.cache_ttl_ms),
            cache_capacity: env_or(&lookup, "CACHE_CAPACITY", d.cache_capacity).max(1),
            sweep_interval_ms: env_or(&lookup, "SWEEP_INTERVAL_MS", d.sweep_interval_ms).max(1),
            sweep_batch: env_or(&lookup, "SWEEP_BATCH", d.sweep_batch).max(1),
            long_window_ms: env_or(&lookup, "RATE_LONG_WINDOW_MS", d.long_window_ms),
            long_limit: env_or(&lookup, "RATE_LONG_LIMIT", d.long_limit),
            burst_window_ms: env_or(&lookup, "RATE_BURST_WINDOW_MS", d.burst_window_ms),
            burst_limit: env_or(&lookup, "RATE_BURST_LIMIT", d.burst_limit),
            idle_grace_ms: env_or(&lookup, "RATE_IDLE_GRACE_MS", d.idle_grace_ms),
            source_latency_ms: env_or(&lookup, "SOURCE_LATENCY_MS", d.source_latency_ms),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }

    pub fn source_latency(&self) -> Duration {
        Duration::from_millis(self.source_latency_ms)
    }

    /// Limiter parameters derived from this configuration.
    pub fn rate_limit(&self) -> RateLimitConfig {
        RateLimitConfig {
            long_window: Duration::from_millis(self.long_window_ms),
            long_limit: self.long_limit,
            burst_window: Duration::from_millis(self.burst_window_ms),
            burst_limit: self.burst_limit,
            idle_grace: Duration::from_millis(self.idle_grace_ms),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8000,
            cache_ttl_ms: 60_000,
            cache_capacity: 10_000,
            sweep_interval_ms: 5_000,
            sweep_batch: 256,
            long_window_ms: 60_000,
            long_limit: 10,
            burst_window_ms: 10_000,
            burst_limit: 5,
            idle_grace_ms: 10_000,
            source_latency_ms: 200,
        }
    }
}
