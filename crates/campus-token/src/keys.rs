//! Signing secret management.

use crate::error::TokenError;
use rand::RngCore;
use std::path::Path;

/// The process-wide HMAC secret.
///
/// The secret is the UTF-8 text of the configured key, so keys produced by
/// [`SecretKey::generate`] and hand-written passphrases are both accepted.
/// `Debug` never prints the key material.
#[derive(Clone)]
pub struct SecretKey {
    secret: String,
}

impl SecretKey {
    /// Wrap an existing secret.
    pub fn new(secret: impl Into<String>) -> Result<Self, TokenError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }
        Ok(Self { secret })
    }

    /// Generate a new random secret (32 random bytes, hex-encoded).
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);

        Self {
            secret: hex::encode(bytes),
        }
    }

    /// Load a secret from a file, ignoring surrounding whitespace.
    pub fn load_from_file(path: &Path) -> Result<Self, TokenError> {
        let raw = std::fs::read_to_string(path)?;
        Self::new(raw.trim())
    }

    /// Save the secret to a file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), TokenError> {
        std::fs::write(path, &self.secret)?;
        Ok(())
    }

    /// Key bytes fed to HMAC.
    pub fn as_bytes(&self) -> &[u8] {
        self.secret.as_bytes()
    }

    /// The secret text, for writing it out once at generation time.
    pub fn expose(&self) -> &str {
        &self.secret
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}
