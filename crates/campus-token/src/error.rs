//! Error types for the token crate.

use crate::claims::TokenType;
use crate::codec::DecodeError;
use thiserror::Error;

/// Errors that can occur while issuing or verifying tokens.
///
/// The variants exist for logs and tests. HTTP callers must collapse all of
/// them into a single "could not validate credentials" response so a client
/// cannot learn which check failed.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Not three non-empty dot-separated segments, or a payload that is not a
    /// JSON object.
    #[error("malformed token")]
    Malformed,

    /// A segment is not valid base64url.
    #[error("malformed token segment: {0}")]
    Decode(#[from] DecodeError),

    /// Signature does not match `header.payload` under the configured secret.
    #[error("invalid token signature")]
    InvalidSignature,

    /// Payload has no `exp`.
    #[error("token missing expiration")]
    MissingExpiry,

    /// `exp` is present but not an integer.
    #[error("invalid token expiration")]
    InvalidExpiry,

    /// `exp` lies in the past.
    #[error("token has expired at {expired_at}")]
    Expired { expired_at: i64 },

    /// A required claim is absent or has the wrong shape.
    #[error("token missing required claim: {claim}")]
    InvalidClaims { claim: &'static str },

    /// The token is valid but of the other kind.
    #[error("expected {expected} token, got {actual}")]
    WrongTokenType {
        expected: TokenType,
        actual: TokenType,
    },

    /// Negative lifetime requested at issue time.
    #[error("token lifetime must not be negative")]
    InvalidTtl,

    /// An extra claim tried to overwrite one of the registered claims.
    #[error("claim '{0}' is reserved")]
    ReservedClaim(String),

    /// The signing secret is empty.
    #[error("signing secret must not be empty")]
    EmptySecret,

    /// Failed to serialize/deserialize a token segment.
    #[error("token serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error (reading secret files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TokenError {
    /// Whether the failure concerns the `exp` claim.
    pub fn is_expiry(&self) -> bool {
        matches!(
            self,
            Self::Expired { .. } | Self::MissingExpiry | Self::InvalidExpiry
        )
    }

    /// Short, stable label for structured logs.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Malformed | Self::Decode(_) => "malformed",
            Self::InvalidSignature => "invalid_signature",
            Self::MissingExpiry => "missing_expiry",
            Self::InvalidExpiry => "invalid_expiry",
            Self::Expired { .. } => "expired",
            Self::InvalidClaims { .. } => "invalid_claims",
            Self::WrongTokenType { .. } => "wrong_token_type",
            Self::InvalidTtl => "invalid_ttl",
            Self::ReservedClaim(_) => "reserved_claim",
            Self::EmptySecret => "empty_secret",
            Self::Serialization(_) => "serialization",
            Self::Io(_) => "io",
        }
    }
}
