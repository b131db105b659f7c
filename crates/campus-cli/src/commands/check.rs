//! `campus config check` command implementation.
//!
//! Loads a configuration file the way the server does (file, then
//! environment overrides, then validation) and reports problems plus
//! settings that are legal but risky.

use anyhow::Context;
use campus_core::config::DEVELOPMENT_SECRET;
use campus_core::{CampusConfig, Environment};
use std::path::Path;

/// Severity level for check results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "WARN"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// A single check finding.
#[derive(Debug, Clone)]
pub struct CheckFinding {
    pub severity: Severity,
    pub message: String,
}

impl CheckFinding {
    fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

/// Run every check against an already-parsed configuration.
pub fn check_config<F>(mut config: CampusConfig, lookup: F) -> Vec<CheckFinding>
where
    F: Fn(&str) -> Option<String>,
{
    let mut findings = Vec::new();

    if let Err(e) = config.apply_overrides(lookup) {
        findings.push(CheckFinding::error(e.to_string()));
        return findings;
    }
    if let Err(e) = config.validate() {
        findings.push(CheckFinding::error(e.to_string()));
    }

    match config.secret.resolve() {
        Ok(None) if config.environment == Environment::Development => findings.push(
            CheckFinding::warning("no signing secret configured; the development default will be used"),
        ),
        Ok(Some(secret)) if secret == DEVELOPMENT_SECRET => findings.push(CheckFinding::warning(
            "signing secret is the development default",
        )),
        Ok(Some(secret)) if secret.len() < 32 => findings.push(CheckFinding::warning(
            "signing secret is shorter than 32 characters",
        )),
        Err(e) => findings.push(CheckFinding::error(format!("cannot read secret: {e}"))),
        _ => {}
    }

    if !config.rate_limit.enabled {
        findings.push(CheckFinding::warning("rate limiting is disabled"));
    }
    for (route, limit) in &config.rate_limit.routes {
        if limit.limit == 0 {
            findings.push(CheckFinding::warning(format!(
                "rate_limit.routes.{route}.limit is 0; every request will be rejected"
            )));
        }
    }

    findings.sort_by(|a, b| b.severity.cmp(&a.severity));
    findings
}

/// Check the configuration at `path` (defaults when absent).
pub fn run(path: Option<&Path>) -> anyhow::Result<()> {
    let config = match path {
        Some(path) => CampusConfig::from_file(path)
            .with_context(|| format!("Failed to read configuration: {}", path.display()))?,
        None => CampusConfig::default(),
    };

    let findings = check_config(config, |name| std::env::var(name).ok());
    for finding in &findings {
        println!("[{}] {}", finding.severity, finding.message);
    }

    let errors = findings
        .iter()
        .filter(|f| f.severity == Severity::Error)
        .count();
    if errors > 0 {
        anyhow::bail!("configuration has {errors} error(s)");
    }
    println!("✔ Configuration OK ({} warning(s))", findings.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_default_config_only_warns() {
        let mut config = CampusConfig::default();
        config.secret.secret_key_env = None;

        let findings = check_config(config, no_env);
        assert!(findings.iter().all(|f| f.severity == Severity::Warning));
        assert!(findings.iter().any(|f| f.message.contains("development default")));
    }

    #[test]
    fn test_production_without_secret_is_an_error() {
        let mut config = CampusConfig::default();
        config.environment = Environment::Production;
        config.secret.secret_key_env = None;

        let findings = check_config(config, no_env);
        assert_eq!(findings[0].severity, Severity::Error);
    }

    #[test]
    fn test_bad_env_override_is_an_error() {
        let env: HashMap<&str, &str> = HashMap::from([("ACCESS_TOKEN_EXPIRE_MINUTES", "soon")]);
        let findings = check_config(CampusConfig::default(), |name| {
            env.get(name).map(|v| v.to_string())
        });
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Error);
    }

    #[test]
    fn test_run_with_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "secret:\n  secret_key: \"0123456789abcdef0123456789abcdef\"\n  secret_key_env: null"
        )
        .unwrap();
        assert!(run(Some(file.path())).is_ok());

        let mut bad = NamedTempFile::new().unwrap();
        writeln!(bad, "tokens:\n  access_token_expire_minutes: 0").unwrap();
        assert!(run(Some(bad.path())).is_err());
    }
}
