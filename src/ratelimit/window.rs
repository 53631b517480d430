//! Rate Window Module
//!
//! Request history of a single client identity.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

// == Rate Window ==
/// Admission timestamps of one client, oldest first.
#[derive(Debug, Default, Clone)]
pub struct RateWindow {
    timestamps: VecDeque<Instant>,
}

impl RateWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops timestamps that are `window` or more in the past.
    pub fn prune(&mut self, now: Instant, window: Duration) {
        while let Some(&oldest) = self.timestamps.front() {
            if now.saturating_duration_since(oldest) >= window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    /// Counts timestamps strictly younger than `window`.
    pub fn count_within(&self, now: Instant, window: Duration) -> usize {
        self.timestamps
            .iter()
            .rev()
            .take_while(|&&t| now.saturating_duration_since(t) < window)
            .count()
    }

    /// Appends an admission, keeping at most `cap` of the newest entries.
    pub fn record(&mut self, now: Instant, cap: usize) {
        self.timestamps.push_back(now);
        while self.timestamps.len() > cap {
            self.timestamps.pop_front();
        }
    }

    /// Most recent admission, if any.
    pub fn last_seen(&self) -> Option<Instant> {
        self.timestamps.back().copied()
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }
}
