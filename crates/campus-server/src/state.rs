//! Shared application state.

use crate::error::ServerError;
use campus_auth::{AuthService, InMemoryUserStore, UserStore};
use campus_core::{CampusConfig, Clock, SystemClock};
use campus_password::PasswordHasher;
use campus_ratelimit::RateLimiter;
use campus_token::{SecretKey, TokenEngine};
use std::sync::Arc;

/// Shared application state, cheap to clone into every handler.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: CampusConfig,
    auth: AuthService,
    limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Assemble state from already-built parts.
    pub fn new(config: CampusConfig, auth: AuthService, limiter: Arc<RateLimiter>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                auth,
                limiter,
            }),
        }
    }

    /// Build the token engine, hasher, limiter and user store described by
    /// `config`, all reading `clock`.
    pub fn from_config_with_clock(
        config: CampusConfig,
        store: Arc<dyn UserStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ServerError> {
        let secret = SecretKey::new(config.resolve_secret()?)?;
        let tokens = Arc::new(TokenEngine::new(secret, config.tokens.clone(), clock.clone()));
        let hasher = PasswordHasher::from_config(&config.password);
        let auth = AuthService::new(store, tokens, hasher);
        let limiter = Arc::new(RateLimiter::new(clock));
        Ok(Self::new(config, auth, limiter))
    }

    /// [`from_config_with_clock`](Self::from_config_with_clock) with the
    /// system clock and an empty in-memory user store.
    pub fn from_config(config: CampusConfig) -> Result<Self, ServerError> {
        Self::from_config_with_clock(
            config,
            Arc::new(InMemoryUserStore::new()),
            Arc::new(SystemClock),
        )
    }

    pub fn config(&self) -> &CampusConfig {
        &self.inner.config
    }

    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.inner.limiter
    }
}
