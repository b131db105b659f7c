//! Signing secret configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the HMAC signing secret comes from.
///
/// Resolution order: inline `secret_key`, then the environment variable named
/// by `secret_key_env`, then the file at `secret_key_file`.
#[derive(Clone, Serialize, Deserialize)]
pub struct SecretConfig {
    /// Secret given inline. Prefer the env or file forms outside development.
    #[serde(default)]
    pub secret_key: Option<String>,

    /// Environment variable containing the secret.
    #[serde(default = "default_secret_env")]
    pub secret_key_env: Option<String>,

    /// Path to a file containing the secret.
    #[serde(default)]
    pub secret_key_file: Option<PathBuf>,
}

impl Default for SecretConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            secret_key_env: default_secret_env(),
            secret_key_file: None,
        }
    }
}

// Redacts the inline secret.
impl std::fmt::Debug for SecretConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretConfig")
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("secret_key_env", &self.secret_key_env)
            .field("secret_key_file", &self.secret_key_file)
            .finish()
    }
}

impl SecretConfig {
    /// Resolve the secret from inline value, environment or file.
    pub fn resolve(&self) -> Result<Option<String>, std::io::Error> {
        if let Some(key) = &self.secret_key
            && !key.trim().is_empty()
        {
            return Ok(Some(key.clone()));
        }

        if let Some(env_var) = &self.secret_key_env
            && let Ok(key) = std::env::var(env_var)
            && !key.trim().is_empty()
        {
            return Ok(Some(key));
        }

        if let Some(path) = &self.secret_key_file
            && path.exists()
        {
            let key = std::fs::read_to_string(path)?;
            return Ok(Some(key.trim().to_string()));
        }

        Ok(None)
    }
}

fn default_secret_env() -> Option<String> {
    Some("SECRET_KEY".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_inline_secret_wins() {
        let cfg = SecretConfig {
            secret_key: Some("inline".into()),
            secret_key_env: None,
            secret_key_file: None,
        };
        assert_eq!(cfg.resolve().unwrap().as_deref(), Some("inline"));
    }

    #[test]
    fn test_secret_from_file_is_trimmed() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "  from-file  ").unwrap();

        let cfg = SecretConfig {
            secret_key: None,
            secret_key_env: None,
            secret_key_file: Some(file.path().to_path_buf()),
        };
        assert_eq!(cfg.resolve().unwrap().as_deref(), Some("from-file"));
    }

    #[test]
    fn test_missing_sources_resolve_to_none() {
        let cfg = SecretConfig {
            secret_key: Some("   ".into()),
            secret_key_env: Some("CAMPUS_TEST_SECRET_THAT_IS_NOT_SET".into()),
            secret_key_file: Some("/nonexistent/secret.key".into()),
        };
        assert!(cfg.resolve().unwrap().is_none());
    }

    #[test]
    fn test_debug_redacts_inline_secret() {
        let cfg = SecretConfig {
            secret_key: Some("super-secret-value".into()),
            ..Default::default()
        };
        let printed = format!("{cfg:?}");
        assert!(!printed.contains("super-secret-value"));
        assert!(printed.contains("<redacted>"));
    }
}
