//! Per-client fixed-window rate limiting.
//!
//! Best-effort abuse guard, not a security control: state is in-process and
//! lost on restart, and the client key is whatever network identity the
//! boundary layer derived (spoofing is out of scope).

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

/// Outcome of admitting one request against a client's window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,

    /// Requests left in the current window, zero once exhausted
    pub remaining: u32,

    /// When the current window resets
    pub reset_at: DateTime<Utc>,
}

impl RateDecision {
    /// Whole seconds until the window resets, for Retry-After style headers
    pub fn retry_after_secs(&self) -> u64 {
        (self.reset_at - Utc::now()).num_seconds().max(0) as u64
    }
}

#[derive(Debug)]
struct RateWindow {
    count: u32,
    reset_at: DateTime<Utc>,
}

/// Fixed-window request counter keyed by client identity.
///
/// Budget and window length are shared by all clients. Every `admit` call
/// mutates the stored window for its key; denied calls still count so the
/// reported `remaining` reflects true exhaustion.
pub struct RateLimiter {
    windows: DashMap<String, RateWindow>,
    budget: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(budget: u32, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            budget,
            window,
        }
    }

    /// Record one request from `client_key` and decide whether to admit it
    pub fn admit(&self, client_key: &str) -> RateDecision {
        let now = Utc::now();
        let mut entry = self
            .windows
            .entry(client_key.to_string())
            .or_insert_with(|| RateWindow {
                count: 0,
                reset_at: now + self.window,
            });

        if now >= entry.reset_at {
            entry.count = 0;
            entry.reset_at = now + self.window;
        }
        entry.count += 1;

        RateDecision {
            allowed: entry.count <= self.budget,
            remaining: self.budget.saturating_sub(entry.count),
            reset_at: entry.reset_at,
        }
    }

    pub fn budget(&self) -> u32 {
        self.budget
    }

    /// Drop windows whose reset has passed; safe to call opportunistically
    pub fn evict_stale(&self) {
        let now = Utc::now();
        let before = self.windows.len();
        self.windows.retain(|_, w| w.reset_at > now);
        let evicted = before - self.windows.len();
        if evicted > 0 {
            tracing::debug!("Evicted {} stale rate windows", evicted);
        }
    }

    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}
