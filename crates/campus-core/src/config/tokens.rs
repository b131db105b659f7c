//! Token lifetime and password hashing policy.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Lifetimes for issued tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Access-token lifetime in minutes.
    #[serde(default = "default_access_minutes")]
    pub access_token_expire_minutes: i64,

    /// Refresh-token lifetime in days.
    #[serde(default = "default_refresh_days")]
    pub refresh_token_expire_days: i64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access_token_expire_minutes: default_access_minutes(),
            refresh_token_expire_days: default_refresh_days(),
        }
    }
}

impl TokenConfig {
    /// Access-token lifetime. Saturates instead of overflowing on values
    /// validation would reject.
    pub fn access_ttl(&self) -> Duration {
        Duration::try_minutes(self.access_token_expire_minutes).unwrap_or(Duration::MAX)
    }

    /// Refresh-token lifetime.
    pub fn refresh_ttl(&self) -> Duration {
        Duration::try_days(self.refresh_token_expire_days).unwrap_or(Duration::MAX)
    }
}

/// Credential hashing policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordConfig {
    /// PBKDF2 iteration count for newly created hashes.
    #[serde(default = "default_iterations")]
    pub iterations: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
        }
    }
}

/// Longest access-token lifetime accepted by validation (one year).
pub const MAX_ACCESS_TOKEN_MINUTES: i64 = 60 * 24 * 365;

/// Longest refresh-token lifetime accepted by validation.
pub const MAX_REFRESH_TOKEN_DAYS: i64 = 3_650;

/// Lowest iteration count accepted by configuration validation.
pub const MIN_PASSWORD_ITERATIONS: u32 = 100_000;

fn default_access_minutes() -> i64 {
    60
}

fn default_refresh_days() -> i64 {
    7
}

fn default_iterations() -> u32 {
    200_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttls_saturate_on_overflow() {
        let cfg = TokenConfig {
            access_token_expire_minutes: 200_000_000_000_000,
            refresh_token_expire_days: i64::MAX,
        };
        assert_eq!(cfg.access_ttl(), Duration::MAX);
        assert_eq!(cfg.refresh_ttl(), Duration::MAX);
    }
}
