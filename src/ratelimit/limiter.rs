//! Sliding-Window Limiter
//!
//! Admits or rejects requests per client identity based on recent history.
//!
//! A request is rejected only when the long window AND the burst window are
//! both saturated. A client that already used its long-window allowance is
//! still admitted while it stays quiet in the burst window. This is more
//! permissive than the usual either-window rule and is kept on purpose,
//! since the combined rule is the observable behaviour clients rely on.

use dashmap::DashMap;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::RateWindow;
use crate::config::RateLimitConfig;

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Admitted,
    Throttled,
}

impl Decision {
    pub fn is_admitted(self) -> bool {
        self == Decision::Admitted
    }
}

// == Sliding Window Limiter ==
/// In-memory, single-process limiter keyed by an opaque identity string.
///
/// Each identity's window is updated under its map shard lock, so
/// concurrent checks for the same identity do not lose updates.
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    windows: DashMap<String, RateWindow>,
    config: RateLimitConfig,
}

impl SlidingWindowLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            windows: DashMap::new(),
            config,
        }
    }

    /// Checks and, if admitted, records a request from `identity` now.
    pub fn check(&self, identity: &str) -> Decision {
        self.check_at(identity, Instant::now())
    }

    pub fn check_at(&self, identity: &str, now: Instant) -> Decision {
        let cfg = &self.config;
        let mut window = self.windows.entry(identity.to_string()).or_default();

        window.prune(now, cfg.long_window);
        let burst = window.count_within(now, cfg.burst_window);

        if window.len() >= cfg.long_limit && burst >= cfg.burst_limit {
            warn!(identity, recent = window.len(), burst, "rate limit exceeded");
            return Decision::Throttled;
        }

        window.record(now, cfg.long_limit.saturating_mul(2).max(1));
        Decision::Admitted
    }

    /// Forgets identities idle for longer than the long window plus the
    /// configured grace period. Returns how many were dropped.
    pub fn sweep_idle(&self) -> usize {
        self.sweep_idle_at(Instant::now())
    }

    pub fn sweep_idle_at(&self, now: Instant) -> usize {
        let horizon = self.config.long_window + self.config.idle_grace;
        let before = self.windows.len();

        self.windows.retain(|_, window| {
            window
                .last_seen()
                .is_some_and(|last| now.saturating_duration_since(last) < horizon)
        });

        let removed = before.saturating_sub(self.windows.len());
        if removed > 0 {
            debug!(removed, "dropped idle rate windows");
        }
        removed
    }

    /// Number of identities currently tracked.
    pub fn tracked_identities(&self) -> usize {
        self.windows.len()
    }

    /// Admissions currently remembered for `identity`.
    pub fn recorded(&self, identity: &str) -> usize {
        self.windows.get(identity).map_or(0, |w| w.len())
    }
}

impl Default for SlidingWindowLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}
