//! # campus-password
//!
//! Salted PBKDF2-HMAC-SHA256 credential hashing.
//!
//! Stored hashes are self-describing:
//!
//! ```text
//! pbkdf2_sha256$200000$<32 hex chars of salt>$<64 hex chars of digest>
//! ```
//!
//! Verification reads the iteration count from the stored value, so raising
//! [`DEFAULT_ITERATIONS`] never locks out existing users; use
//! [`PasswordHasher::needs_rehash`] to upgrade them on their next login.
//!
//! Hashing is CPU-bound. Async callers should run it on a blocking
//! thread (`tokio::task::spawn_blocking`).

pub mod hasher;

pub use hasher::{
    ALGORITHM, DEFAULT_ITERATIONS, MAX_ITERATIONS, PasswordHasher, hash_password, verify_password,
};
