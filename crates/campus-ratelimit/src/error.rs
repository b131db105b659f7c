//! Error types for rate limiting.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateLimitError {
    /// The key already used its allowance for the current window.
    #[error("rate limit exceeded: {limit} requests per {window_secs}s, retry in {retry_after_secs}s")]
    Exceeded {
        limit: u32,
        window_secs: u64,
        retry_after_secs: u64,
    },
}

impl RateLimitError {
    /// Seconds the client should wait, for the `Retry-After` header.
    pub fn retry_after_secs(&self) -> u64 {
        match self {
            Self::Exceeded {
                retry_after_secs, ..
            } => *retry_after_secs,
        }
    }
}
