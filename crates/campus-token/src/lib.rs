//! # campus-token
//!
//! Stateless signed tokens for the Campus auth core.
//!
//! This crate provides functionality for:
//! - Encoding token segments as unpadded base64url ([`codec`])
//! - Signing `header.payload` with HMAC-SHA256 ([`signer`])
//! - Issuing access and refresh tokens and verifying them ([`token`])
//!
//! ## Wire format
//!
//! ```text
//! base64url({"alg":"HS256","typ":"JWT"}) . base64url(payload) . base64url(hmac)
//! ```
//!
//! The payload always starts with `sub`, `role`, `type`, `iat`, `exp` in that
//! order, followed by any extra caller-supplied fields sorted by key, so the
//! same claims always produce the same bytes and the same signature.
//!
//! ## Token kinds
//!
//! | Kind | Lifetime | Accepted by |
//! |------|----------|-------------|
//! | **access** | minutes | per-request authentication |
//! | **refresh** | days | the refresh endpoint only |
//!
//! [`TokenEngine::verify`] does not look at the token kind; callers check it
//! with [`Claims::require_type`] (or use [`TokenEngine::verify_token`]).

pub mod claims;
pub mod codec;
pub mod error;
pub mod keys;
pub mod signer;
pub mod token;

pub use claims::{Claims, TokenType};
pub use codec::DecodeError;
pub use error::TokenError;
pub use keys::SecretKey;
pub use token::{TokenEngine, TokenPair, inspect_unverified};
