//! Route definitions.

use crate::handlers;
use crate::middleware::{RateLimitGuard, rate_limit, request_context};
use crate::state::AppState;
use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

/// Build the full application router.
///
/// Health routes sit at the root; everything else is nested under the
/// configured API prefix (`/api/v1` by default).
pub fn create_router(state: AppState) -> Router {
    let auth = Router::new()
        .route(
            "/register",
            post(handlers::register).route_layer(from_fn_with_state(
                RateLimitGuard::new(state.clone(), "register"),
                rate_limit,
            )),
        )
        .route(
            "/login",
            post(handlers::login).route_layer(from_fn_with_state(
                RateLimitGuard::new(state.clone(), "login"),
                rate_limit,
            )),
        )
        .route("/refresh", post(handlers::refresh))
        .route("/me", get(handlers::me));

    let users = Router::new()
        .route("/", get(handlers::list_users))
        .route("/me", get(handlers::me));

    let api = Router::new().nest("/auth", auth).nest("/users", users);

    let prefix = state.config().server.api_prefix.trim_end_matches('/').to_string();
    let root = Router::new()
        .route("/health", get(handlers::health))
        .route("/info", get(handlers::info));
    // axum refuses to nest at the root.
    let root = if prefix.is_empty() {
        root.merge(api)
    } else {
        root.nest(&prefix, api)
    };

    root
        .layer(from_fn(request_context))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
