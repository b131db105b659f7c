//! CLI command implementations for the `campus` binary.

pub mod check;
pub mod keys;
pub mod password;
pub mod token;
