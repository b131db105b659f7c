//! # campus-server
//!
//! HTTP surface for the Campus auth flows.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | GET | `/health` | liveness |
//! | GET | `/info` | app name, environment, API prefix |
//! | POST | `{prefix}/auth/register` | JSON body, rate-limited, 201 |
//! | POST | `{prefix}/auth/login` | form `username`/`password`, rate-limited |
//! | POST | `{prefix}/auth/refresh` | JSON `{"refresh_token": ...}` |
//! | GET | `{prefix}/auth/me`, `{prefix}/users/me` | bearer access token |
//! | GET | `{prefix}/users` | admin only |
//!
//! Every token failure is answered with the same 401 body, so clients cannot
//! tell a bad signature from an expired token.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;
pub mod telemetry;

pub use error::{ApiError, ServerError};
pub use routes::create_router;
pub use server::CampusServer;
pub use state::AppState;
