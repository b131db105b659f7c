//! # campus-auth
//!
//! Account flows for the Campus backend, built on the token engine and the
//! credential hasher:
//!
//! - registration (new accounts start as [`Role::Member`])
//! - login, returning an access/refresh [`TokenPair`](campus_token::TokenPair)
//! - refresh, exchanging a refresh token for a new pair
//! - resolving the active user behind an access token
//! - role checks via [`require_roles`]
//!
//! Users live behind the [`UserStore`] trait; [`InMemoryUserStore`] is the
//! bundled implementation.

pub mod error;
pub mod role;
pub mod service;
pub mod store;

pub use error::{AuthError, StoreError};
pub use role::{ParseRoleError, Role};
pub use service::{AuthService, Registration, require_roles};
pub use store::{InMemoryUserStore, NewUser, UserRecord, UserStore};
