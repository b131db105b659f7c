//! Error types for the auth service.

use campus_token::TokenError;
use thiserror::Error;

/// Errors that can occur in the auth service.
///
/// Messages are safe to show to clients; token failures deliberately share
/// one message.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Registration input failed validation.
    #[error("{0}")]
    Validation(String),

    /// An account with this email already exists.
    #[error("Email is already registered")]
    EmailTaken,

    /// Unknown email or wrong password.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Correct credentials for a deactivated account.
    #[error("User account is inactive")]
    Inactive,

    /// Any token failure, including the wrong token kind.
    #[error("Could not validate credentials")]
    Token(#[from] TokenError),

    /// Verified token whose subject is not a user id.
    #[error("Could not validate credentials")]
    InvalidSubject,

    /// Verified token for a user that no longer exists or is inactive.
    #[error("User not found or inactive")]
    UserNotFound,

    /// Authenticated but not allowed.
    #[error("You do not have permission to perform this action")]
    Forbidden,

    /// User store failure.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// A blocking hashing task failed to complete.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Errors raised by [`UserStore`](crate::store::UserStore) implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Unique email constraint violated.
    #[error("email already exists: {0}")]
    DuplicateEmail(String),

    #[error("user not found: {0}")]
    NotFound(uuid::Uuid),

    /// Backend-specific failure.
    #[error("{0}")]
    Backend(String),
}
