//! # campus-core
//!
//! Shared building blocks for the Campus authentication core:
//!
//! - [`config`]: the process configuration, loaded once at start-up from YAML
//!   and environment variables, then passed by value into the token engine,
//!   the rate limiter and the HTTP layer.
//! - [`clock`]: the time source consumed by everything that reasons about
//!   expiry or windows, so tests can drive time explicitly.

pub mod clock;
pub mod config;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    CampusConfig, ConfigError, Environment, LoggingConfig, PasswordConfig, RateLimitConfig,
    RouteLimit, SecretConfig, ServerConfig, TokenConfig,
};
