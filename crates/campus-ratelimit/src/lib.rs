//! # campus-ratelimit
//!
//! Per-key sliding-window rate limiting held in process memory.
//!
//! Every key (typically `client_ip:route`) owns an ascending list of the
//! instants at which it was allowed through. A check first drops instants
//! older than the window, then admits the event only if fewer than `limit`
//! remain. Denied attempts are not recorded, so a client that keeps hammering
//! a route regains access as soon as its oldest admitted event ages out.
//!
//! State lives in a [`RateLimiter`] value passed to whoever needs it; there
//! is no global instance. It is not shared across processes and does not
//! survive a restart.

pub mod error;
pub mod limiter;

pub use error::RateLimitError;
pub use limiter::{RateDecision, RateLimiter};
