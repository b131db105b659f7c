//! Rate-limit thresholds.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Longest window accepted by validation (one year).
pub const MAX_WINDOW_SECS: u64 = 365 * 24 * 60 * 60;

/// Longest sweep interval accepted by validation (one day).
pub const MAX_SWEEP_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// Per-route rate-limit thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Whether rate limiting is applied at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Fallback limit (per minute) for routes without an explicit entry.
    #[serde(default = "default_per_minute")]
    pub per_minute: u32,

    /// Explicit thresholds keyed by route name (e.g. "register", "login").
    #[serde(default = "default_routes")]
    pub routes: BTreeMap<String, RouteLimit>,

    /// How often dormant keys are swept from memory, in seconds.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

/// A single threshold: at most `limit` events in any trailing `window_secs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteLimit {
    pub limit: u32,
    pub window_secs: u64,
}

impl RouteLimit {
    pub const fn new(limit: u32, window_secs: u64) -> Self {
        Self { limit, window_secs }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            per_minute: default_per_minute(),
            routes: default_routes(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

impl RateLimitConfig {
    /// Threshold for a named route, falling back to `per_minute` over 60s.
    pub fn route(&self, name: &str) -> RouteLimit {
        self.routes
            .get(name)
            .copied()
            .unwrap_or(RouteLimit::new(self.per_minute, 60))
    }
}

fn default_true() -> bool {
    true
}

fn default_per_minute() -> u32 {
    100
}

fn default_sweep_interval() -> u64 {
    300
}

fn default_routes() -> BTreeMap<String, RouteLimit> {
    BTreeMap::from([
        ("register".to_string(), RouteLimit::new(10, 60)),
        ("login".to_string(), RouteLimit::new(20, 60)),
    ])
}
