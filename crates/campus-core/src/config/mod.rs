//! Configuration types for the Campus auth core.
//!
//! Configuration is read once at process start (from `campus.yaml` plus
//! environment overrides), validated, and then shared read-only. Components
//! receive the pieces they need through their constructors; nothing reads
//! configuration lazily from a global.
//!
//! # Environment overrides
//!
//! | Variable | Field |
//! |----------|-------|
//! | `SECRET_KEY` | `secret.secret_key_env` default source |
//! | `ACCESS_TOKEN_EXPIRE_MINUTES` | `tokens.access_token_expire_minutes` |
//! | `REFRESH_TOKEN_EXPIRE_DAYS` | `tokens.refresh_token_expire_days` |
//! | `RATE_LIMIT_PER_MINUTE` | `rate_limit.per_minute` |
//! | `CAMPUS_BIND` | `server.bind` |
//! | `CAMPUS_ENV` | `environment` |

pub mod rate_limit;
pub mod secret;
pub mod server;
pub mod tokens;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use rate_limit::{MAX_SWEEP_INTERVAL_SECS, MAX_WINDOW_SECS, RateLimitConfig, RouteLimit};
pub use secret::SecretConfig;
pub use server::{LoggingConfig, ServerConfig};
pub use tokens::{
    MAX_ACCESS_TOKEN_MINUTES, MAX_REFRESH_TOKEN_DAYS, MIN_PASSWORD_ITERATIONS, PasswordConfig,
    TokenConfig,
};

/// Secret used when running in development with nothing configured.
pub const DEVELOPMENT_SECRET: &str = "change-me";

/// Complete Campus configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampusConfig {
    /// Application name, used in log lines and the health endpoint.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Deployment environment.
    #[serde(default)]
    pub environment: Environment,

    /// Token signing secret.
    #[serde(default)]
    pub secret: SecretConfig,

    /// Token lifetimes.
    #[serde(default)]
    pub tokens: TokenConfig,

    /// Credential hashing policy.
    #[serde(default)]
    pub password: PasswordConfig,

    /// Rate-limit thresholds.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// HTTP listener.
    #[serde(default)]
    pub server: ServerConfig,

    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for CampusConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            environment: Environment::default(),
            secret: SecretConfig::default(),
            tokens: TokenConfig::default(),
            password: PasswordConfig::default(),
            rate_limit: RateLimitConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "staging" => Ok(Self::Staging),
            "production" | "prod" => Ok(Self::Production),
            other => Err(ConfigError::Config(format!("unknown environment '{other}'"))),
        }
    }
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },

    #[error("no signing secret configured (set SECRET_KEY or secret.secret_key_file)")]
    MissingSecret,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CampusConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    /// Load, apply process environment overrides and validate.
    ///
    /// With no path, starts from defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production, a map in tests).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("ACCESS_TOKEN_EXPIRE_MINUTES") {
            self.tokens.access_token_expire_minutes =
                parse_env("ACCESS_TOKEN_EXPIRE_MINUTES", value)?;
        }
        if let Some(value) = lookup("REFRESH_TOKEN_EXPIRE_DAYS") {
            self.tokens.refresh_token_expire_days = parse_env("REFRESH_TOKEN_EXPIRE_DAYS", value)?;
        }
        if let Some(value) = lookup("RATE_LIMIT_PER_MINUTE") {
            self.rate_limit.per_minute = parse_env("RATE_LIMIT_PER_MINUTE", value)?;
        }
        if let Some(value) = lookup("CAMPUS_BIND") {
            self.server.bind = value;
        }
        if let Some(value) = lookup("CAMPUS_ENV") {
            self.environment = value.parse().map_err(|_| ConfigError::InvalidEnv {
                var: "CAMPUS_ENV",
                value,
            })?;
        }
        Ok(())
    }

    /// Reject configurations that would make the core unsafe or inert.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_ACCESS_TOKEN_MINUTES).contains(&self.tokens.access_token_expire_minutes) {
            return Err(ConfigError::Config(format!(
                "tokens.access_token_expire_minutes must be between 1 and {MAX_ACCESS_TOKEN_MINUTES}"
            )));
        }
        if !(1..=MAX_REFRESH_TOKEN_DAYS).contains(&self.tokens.refresh_token_expire_days) {
            return Err(ConfigError::Config(format!(
                "tokens.refresh_token_expire_days must be between 1 and {MAX_REFRESH_TOKEN_DAYS}"
            )));
        }
        if self.password.iterations < MIN_PASSWORD_ITERATIONS {
            return Err(ConfigError::Config(format!(
                "password.iterations must be at least {MIN_PASSWORD_ITERATIONS}"
            )));
        }
        for (route, limit) in &self.rate_limit.routes {
            if !(1..=MAX_WINDOW_SECS).contains(&limit.window_secs) {
                return Err(ConfigError::Config(format!(
                    "rate_limit.routes.{route}.window_secs must be between 1 and {MAX_WINDOW_SECS}"
                )));
            }
        }
        if !(1..=MAX_SWEEP_INTERVAL_SECS).contains(&self.rate_limit.sweep_interval_secs) {
            return Err(ConfigError::Config(format!(
                "rate_limit.sweep_interval_secs must be between 1 and {MAX_SWEEP_INTERVAL_SECS}"
            )));
        }
        if self.environment == Environment::Production {
            match self.secret.resolve()? {
                Some(secret) if secret != DEVELOPMENT_SECRET => {}
                _ => return Err(ConfigError::MissingSecret),
            }
        }
        Ok(())
    }

    /// Resolve the signing secret.
    ///
    /// Development falls back to [`DEVELOPMENT_SECRET`]; other environments
    /// require an explicit secret.
    pub fn resolve_secret(&self) -> Result<String, ConfigError> {
        match self.secret.resolve()? {
            Some(secret) => Ok(secret),
            None if self.environment == Environment::Development => {
                tracing::warn!("no signing secret configured, using the development default");
                Ok(DEVELOPMENT_SECRET.to_string())
            }
            None => Err(ConfigError::MissingSecret),
        }
    }
}

fn parse_env<T: FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { var, value })
}

fn default_app_name() -> String {
    "community-learning-api".to_string()
}
