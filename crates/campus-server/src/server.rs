//! Server lifecycle.

use crate::error::ServerError;
use crate::routes;
use crate::state::AppState;
use campus_ratelimit::RateLimiter;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// The Campus HTTP server.
pub struct CampusServer {
    state: AppState,
}

impl CampusServer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Bind, serve until Ctrl-C, then stop the sweeper.
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = self.state.config().server.bind.clone();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;

        tracing::info!(
            address = %addr,
            app = %self.state.config().app_name,
            environment = ?self.state.config().environment,
            "starting Campus API"
        );

        let sweeper = spawn_sweeper(
            self.state.limiter().clone(),
            Duration::from_secs(
                self.state
                    .config()
                    .rate_limit
                    .sweep_interval_secs
                    .clamp(1, campus_core::config::MAX_SWEEP_INTERVAL_SECS),
            ),
        );

        let app = routes::create_router(self.state);
        let result = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve);

        sweeper.abort();
        tracing::info!("server stopped");
        result
    }
}

/// Periodically drop rate-limit keys that have gone quiet.
pub fn spawn_sweeper(limiter: Arc<RateLimiter>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            limiter.sweep();
        }
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
