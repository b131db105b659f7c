//! Sliding-window limiter.

use crate::error::RateLimitError;
use campus_core::{Clock, RouteLimit, SystemClock};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Arc;

/// Outcome of a single [`RateLimiter::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    /// The event was recorded.
    Allowed {
        /// Events still admissible in the current window.
        remaining: u32,
    },
    /// The window is full; nothing was recorded.
    Denied {
        /// Seconds until the oldest counted event leaves the window.
        retry_after_secs: u64,
    },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// Admitted events for one key, oldest first.
#[derive(Debug)]
struct Window {
    events: VecDeque<DateTime<Utc>>,
    /// Span used by the most recent check, reused by [`RateLimiter::sweep`].
    span: Duration,
}

impl Window {
    fn new(span: Duration) -> Self {
        Self {
            events: VecDeque::new(),
            span,
        }
    }

    fn evict(&mut self, now: DateTime<Utc>) {
        // A span reaching before the representable range covers all history.
        let Some(start) = now.checked_sub_signed(self.span) else {
            return;
        };
        while self.events.front().is_some_and(|ts| *ts < start) {
            self.events.pop_front();
        }
    }
}

/// In-memory sliding-window rate limiter.
///
/// Windows are created lazily per key in a sharded map. The
/// evict/count/append sequence for a key runs under that key's shard lock, so
/// concurrent checks on one key never admit more than `limit` events, while
/// keys on other shards proceed in parallel.
#[derive(Debug)]
pub struct RateLimiter {
    windows: DashMap<String, Window>,
    clock: Arc<dyn Clock>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::with_system_clock()
    }
}

impl RateLimiter {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            windows: DashMap::new(),
            clock,
        }
    }

    pub fn with_system_clock() -> Self {
        Self::new(Arc::new(SystemClock))
    }

    /// Record an event for `key` if fewer than `limit` events happened within
    /// the trailing `window`.
    ///
    /// An event exactly `window` old still counts.
    pub fn check(&self, key: &str, limit: u32, window: Duration) -> RateDecision {
        let now = self.clock.now();
        let mut entry = self
            .windows
            .entry(key.to_owned())
            .or_insert_with(|| Window::new(window));
        entry.span = window;
        entry.evict(now);

        let count = entry.events.len();
        if count >= limit as usize {
            let retry_after_secs = entry
                .events
                .front()
                .and_then(|oldest| oldest.checked_add_signed(window))
                .map(|until| ceil_secs(until - now))
                .unwrap_or_else(|| ceil_secs(window));
            tracing::debug!(key, limit, count, retry_after_secs, "rate limit hit");
            return RateDecision::Denied { retry_after_secs };
        }

        entry.events.push_back(now);
        RateDecision::Allowed {
            remaining: limit - count as u32 - 1,
        }
    }

    /// [`check`](Self::check) surfaced as an error on denial.
    pub fn enforce(&self, key: &str, limit: u32, window: Duration) -> Result<(), RateLimitError> {
        match self.check(key, limit, window) {
            RateDecision::Allowed { .. } => Ok(()),
            RateDecision::Denied { retry_after_secs } => Err(RateLimitError::Exceeded {
                limit,
                window_secs: window.num_seconds().max(0) as u64,
                retry_after_secs,
            }),
        }
    }

    /// [`enforce`](Self::enforce) with a configured route threshold.
    pub fn enforce_route(&self, key: &str, route: RouteLimit) -> Result<(), RateLimitError> {
        let window = i64::try_from(route.window_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);
        self.enforce(key, route.limit, window)
    }

    /// Events currently counted for `key`, after eviction.
    pub fn count(&self, key: &str) -> usize {
        let now = self.clock.now();
        match self.windows.get_mut(key) {
            Some(mut window) => {
                window.evict(now);
                window.events.len()
            }
            None => 0,
        }
    }

    /// Number of keys holding a window, including dormant ones not yet swept.
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }

    /// Forget every key.
    pub fn clear(&self) {
        self.windows.clear();
    }

    /// Drop keys whose windows are empty after eviction. Returns how many
    /// were removed.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let before = self.windows.len();
        self.windows.retain(|_, window| {
            window.evict(now);
            !window.events.is_empty()
        });
        let removed = before.saturating_sub(self.windows.len());
        if removed > 0 {
            tracing::debug!(removed, remaining = self.windows.len(), "swept idle rate-limit keys");
        }
        removed
    }
}

/// Whole seconds covering `d`, at least one.
fn ceil_secs(d: Duration) -> u64 {
    let millis = d.num_milliseconds().max(0) as u64;
    millis.div_ceil(1000).max(1)
}
