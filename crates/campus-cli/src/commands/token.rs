//! Token commands.
//!
//! `campus token issue` - Issue an access or refresh token.
//! `campus token verify` - Verify a token's signature and expiry.
//! `campus token inspect` - Decode a token's payload without verification.

use anyhow::Context;
use campus_core::{CampusConfig, TokenConfig};
use campus_token::{Claims, SecretKey, TokenEngine, TokenType, inspect_unverified};
use chrono::Duration;
use std::path::Path;

/// Configuration file loaded the way the server loads it, or `None` when no
/// path is given.
fn load_config(path: Option<&Path>) -> anyhow::Result<Option<CampusConfig>> {
    path.map(|path| {
        CampusConfig::load(Some(path))
            .with_context(|| format!("Failed to load configuration from {}", path.display()))
    })
    .transpose()
}

/// Resolve the signing secret from a file path or the secret text itself
/// (e.g. from the SECRET_KEY env var), falling back to the configuration.
fn resolve_secret(
    secret: Option<String>,
    config: Option<&CampusConfig>,
) -> anyhow::Result<SecretKey> {
    let secret = match (secret, config) {
        (Some(secret), _) => secret,
        (None, Some(config)) => config
            .resolve_secret()
            .context("Configuration does not provide a signing secret")?,
        (None, None) => anyhow::bail!(
            "Signing secret not provided. Either pass --secret <path|value>, set SECRET_KEY or pass --config"
        ),
    };

    let path = Path::new(&secret);
    if path.exists() {
        return SecretKey::load_from_file(path)
            .with_context(|| format!("Failed to load secret from file: {}", path.display()));
    }

    SecretKey::new(secret.trim()).context("Signing secret must not be empty")
}

/// Build an engine from the optional configuration file.
fn engine(secret: Option<String>, config_path: Option<&Path>) -> anyhow::Result<TokenEngine> {
    let config = load_config(config_path)?;
    let key = resolve_secret(secret, config.as_ref())?;
    let tokens = config.map(|c| c.tokens).unwrap_or_else(TokenConfig::default);
    Ok(TokenEngine::with_system_clock(key, tokens))
}

/// Read the token from a file when given a path, otherwise use it as is.
fn resolve_token(token: String) -> anyhow::Result<String> {
    if Path::new(&token).exists() {
        Ok(std::fs::read_to_string(&token)?.trim().to_string())
    } else {
        Ok(token)
    }
}

/// Parse a lifetime like "15m", "12h", "7d" or "30s". Bare numbers are
/// minutes.
pub fn parse_duration(s: &str) -> anyhow::Result<Duration> {
    let s = s.trim().to_lowercase();

    let (value, build): (&str, fn(i64) -> Option<Duration>) =
        if let Some(days) = s.strip_suffix('d') {
            (days, Duration::try_days)
        } else if let Some(hours) = s.strip_suffix('h') {
            (hours, Duration::try_hours)
        } else if let Some(minutes) = s.strip_suffix('m') {
            (minutes, Duration::try_minutes)
        } else if let Some(seconds) = s.strip_suffix('s') {
            (seconds, Duration::try_seconds)
        } else {
            (s.as_str(), Duration::try_minutes)
        };

    build(value.parse()?).context("Duration out of range")
}

/// Issue a token; `ttl` defaults to the configured lifetime of `kind`.
pub fn issue_token(
    secret: Option<String>,
    config: Option<&Path>,
    subject: &str,
    role: &str,
    kind: TokenType,
    ttl: Option<&str>,
) -> anyhow::Result<String> {
    let engine = engine(secret, config)?;
    let ttl = match ttl {
        Some(ttl) => parse_duration(ttl).with_context(|| format!("Invalid --ttl '{ttl}'"))?,
        None => match kind {
            TokenType::Access => engine.config().access_ttl(),
            TokenType::Refresh => engine.config().refresh_ttl(),
        },
    };

    Ok(engine.issue(subject, role, kind, ttl)?)
}

/// Verify a token, optionally requiring a kind.
pub fn verify_token(
    secret: Option<String>,
    config: Option<&Path>,
    token: String,
    expect: Option<TokenType>,
) -> anyhow::Result<Claims> {
    let engine = engine(secret, config)?;
    let token = resolve_token(token)?;
    engine
        .verify_token(&token, expect)
        .context("Token verification failed")
}

pub fn issue(
    secret: Option<String>,
    config: Option<&Path>,
    subject: String,
    role: String,
    kind: TokenType,
    ttl: Option<String>,
) -> anyhow::Result<()> {
    let token = issue_token(secret, config, &subject, &role, kind, ttl.as_deref())?;
    println!("{token}");
    Ok(())
}

pub fn verify(
    secret: Option<String>,
    config: Option<&Path>,
    token: String,
    expect: Option<TokenType>,
) -> anyhow::Result<()> {
    let claims = verify_token(secret, config, token, expect)?;

    println!("✔ Token is valid");
    println!();
    println!("Token Details:");
    println!("  Subject: {}", claims.subject);
    println!("  Role: {}", claims.role);
    println!("  Type: {}", claims.token_type);
    println!("  Issued at: {}", format_timestamp(claims.issued_at));
    println!("  Expires at: {}", format_timestamp(claims.expires_at));
    if !claims.extra.is_empty() {
        println!("  Extra: {}", serde_json::to_string(&claims.extra)?);
    }
    Ok(())
}

/// Print a token's payload without checking it.
pub fn inspect(token: String) -> anyhow::Result<()> {
    let payload = inspect_unverified(&resolve_token(token)?)?;

    println!("Token payload (unverified):");
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn format_timestamp(seconds: i64) -> String {
    chrono::DateTime::from_timestamp(seconds, 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| seconds.to_string())
}
