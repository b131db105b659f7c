//! Request middleware: request ids, timing and rate limiting.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{ConnectInfo, OriginalUri, Request, State};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::net::SocketAddr;
use std::time::Instant;

pub const REQUEST_ID_HEADER: &str = "x-request-id";
pub const PROCESS_TIME_HEADER: &str = "x-process-time-ms";

/// Echo or assign `x-request-id` and report handling time in
/// `x-process-time-ms`.
pub async fn request_context(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let started = Instant::now();
    let mut response = next.run(request).await;
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        headers.insert(REQUEST_ID_HEADER, value);
    }
    if let Ok(value) = HeaderValue::from_str(&format!("{elapsed_ms:.2}")) {
        headers.insert(PROCESS_TIME_HEADER, value);
    }
    response
}

/// State for [`rate_limit`]: which configured route threshold applies.
#[derive(Clone)]
pub struct RateLimitGuard {
    pub state: AppState,
    pub route: &'static str,
}

impl RateLimitGuard {
    pub fn new(state: AppState, route: &'static str) -> Self {
        Self { state, route }
    }
}

/// Reject the request with 429 once `client_ip:path` exceeds the route's
/// threshold.
pub async fn rate_limit(
    State(guard): State<RateLimitGuard>,
    request: Request,
    next: Next,
) -> Response {
    let config = &guard.state.config().rate_limit;
    if !config.enabled {
        return next.run(request).await;
    }

    let key = client_key(&request);
    let threshold = config.route(guard.route);
    if let Err(e) = guard.state.limiter().enforce_route(&key, threshold) {
        tracing::warn!(key = %key, route = guard.route, limit = threshold.limit, "rate limit exceeded");
        return ApiError::from(e).into_response();
    }
    next.run(request).await
}

/// `client_ip:path`, with `unknown` standing in when the peer address is not
/// available.
fn client_key(request: &Request) -> String {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let path = request
        .extensions()
        .get::<OriginalUri>()
        .map(|OriginalUri(uri)| uri.path())
        .unwrap_or_else(|| request.uri().path());
    format!("{client}:{path}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_client_key_without_peer() {
        let request = Request::builder()
            .uri("/api/v1/auth/login")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_key(&request), "unknown:/api/v1/auth/login");
    }

    #[test]
    fn test_client_key_with_peer() {
        let mut request = Request::builder()
            .uri("/api/v1/auth/login")
            .body(Body::empty())
            .unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([10, 1, 2, 3], 5555))));
        assert_eq!(client_key(&request), "10.1.2.3:/api/v1/auth/login");
    }
}
