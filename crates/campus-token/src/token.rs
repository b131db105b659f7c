//! Token issuance and verification.

use crate::claims::{Claims, RESERVED_CLAIMS, TokenType, parse_expiry};
use crate::codec;
use crate::error::TokenError;
use crate::keys::SecretKey;
use crate::signer;
use campus_core::{Clock, SystemClock, TokenConfig};
use chrono::Duration;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Fixed token header.
#[derive(Serialize)]
struct Header {
    alg: &'static str,
    typ: &'static str,
}

const HEADER: Header = Header {
    alg: "HS256",
    typ: "JWT",
};

/// An access/refresh token pair, as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Always "bearer".
    pub token_type: String,
}

impl TokenPair {
    fn new(access_token: String, refresh_token: String) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// Issues and verifies signed tokens.
///
/// Holds the secret, the configured lifetimes and a clock; it has no mutable
/// state, so one engine can be shared across all request handlers.
#[derive(Debug, Clone)]
pub struct TokenEngine {
    secret: SecretKey,
    config: TokenConfig,
    clock: Arc<dyn Clock>,
}

impl TokenEngine {
    /// Create an engine with an explicit clock.
    pub fn new(secret: SecretKey, config: TokenConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            secret,
            config,
            clock,
        }
    }

    /// Create an engine reading wall-clock time.
    pub fn with_system_clock(secret: SecretKey, config: TokenConfig) -> Self {
        Self::new(secret, config, Arc::new(SystemClock))
    }

    /// Configured lifetimes.
    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Issue a token of the given kind valid for `ttl` from now.
    pub fn issue(
        &self,
        subject: &str,
        role: &str,
        token_type: TokenType,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        self.issue_with_extra(subject, role, token_type, ttl, BTreeMap::new())
    }

    /// Issue a token carrying additional claims.
    ///
    /// Extra claims are serialized after the registered ones, sorted by key.
    pub fn issue_with_extra(
        &self,
        subject: &str,
        role: &str,
        token_type: TokenType,
        ttl: Duration,
        extra: BTreeMap<String, Value>,
    ) -> Result<String, TokenError> {
        if ttl < Duration::zero() {
            return Err(TokenError::InvalidTtl);
        }
        // Mirror the verify-side requirements so every issued token verifies.
        if subject.is_empty() {
            return Err(TokenError::InvalidClaims { claim: "sub" });
        }
        if role.is_empty() {
            return Err(TokenError::InvalidClaims { claim: "role" });
        }
        if let Some(key) = extra.keys().find(|k| RESERVED_CLAIMS.contains(&k.as_str())) {
            return Err(TokenError::ReservedClaim(key.clone()));
        }

        let issued_at = self.clock.unix_seconds();
        let expires_at = issued_at
            .checked_add(ttl.num_seconds())
            .ok_or(TokenError::InvalidTtl)?;
        let claims = Claims {
            subject: subject.to_string(),
            role: role.to_string(),
            token_type,
            issued_at,
            expires_at,
            extra,
        };

        let token = self.encode(&claims)?;
        tracing::debug!(
            subject = %claims.subject,
            token_type = %token_type,
            expires_at = claims.expires_at,
            "issued token"
        );
        Ok(token)
    }

    /// Issue a short-lived access token.
    pub fn issue_access(&self, subject: &str, role: &str) -> Result<String, TokenError> {
        self.issue(subject, role, TokenType::Access, self.config.access_ttl())
    }

    /// Issue a long-lived refresh token.
    pub fn issue_refresh(&self, subject: &str, role: &str) -> Result<String, TokenError> {
        self.issue(subject, role, TokenType::Refresh, self.config.refresh_ttl())
    }

    /// Issue an access token and a refresh token for the same identity.
    pub fn issue_pair(&self, subject: &str, role: &str) -> Result<TokenPair, TokenError> {
        Ok(TokenPair::new(
            self.issue_access(subject, role)?,
            self.issue_refresh(subject, role)?,
        ))
    }

    /// Verify signature and expiry, returning fully populated claims.
    ///
    /// Checks run in order (split, signature, expiry, claim shape) and the
    /// first failure is returned. The token kind is not checked here.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let result = self.verify_inner(token);
        if let Err(e) = &result {
            tracing::debug!(reason = e.reason(), "token rejected");
        }
        result
    }

    /// [`verify`](Self::verify), then require the given kind if any.
    pub fn verify_token(
        &self,
        token: &str,
        expected: Option<TokenType>,
    ) -> Result<Claims, TokenError> {
        let claims = self.verify(token)?;
        if let Some(expected) = expected {
            claims.require_type(expected)?;
        }
        Ok(claims)
    }

    fn verify_inner(&self, token: &str) -> Result<Claims, TokenError> {
        let (header_b64, payload_b64, signature_b64) = split(token)?;

        let signing_input = signing_input(header_b64, payload_b64);
        let provided = codec::decode(signature_b64)?;
        if !signer::verify(signing_input.as_bytes(), self.secret.as_bytes(), &provided) {
            return Err(TokenError::InvalidSignature);
        }

        let payload = decode_payload(payload_b64)?;
        let expires_at = parse_expiry(&payload)?;
        if expires_at < self.clock.unix_seconds() {
            return Err(TokenError::Expired {
                expired_at: expires_at,
            });
        }

        Claims::from_payload(payload, expires_at)
    }

    // Serialize `payload` directly; going through `Value` re-sorts the keys.
    fn encode<T: Serialize>(&self, payload: &T) -> Result<String, TokenError> {
        let header_b64 = codec::encode(serde_json::to_vec(&HEADER)?);
        let payload_b64 = codec::encode(serde_json::to_vec(payload)?);

        let signing_input = signing_input(&header_b64, &payload_b64);
        let signature = signer::sign(signing_input.as_bytes(), self.secret.as_bytes());

        Ok(format!("{signing_input}.{}", codec::encode(signature)))
    }
}

/// Decode a token's payload without checking signature or expiry.
///
/// For diagnostics only; never base an access decision on the result.
pub fn inspect_unverified(token: &str) -> Result<Map<String, Value>, TokenError> {
    let (_, payload_b64, _) = split(token)?;
    decode_payload(payload_b64)
}

fn split(token: &str) -> Result<(&str, &str, &str), TokenError> {
    let mut parts = token.split('.');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(h), Some(p), Some(s), None) if !h.is_empty() && !p.is_empty() && !s.is_empty() => {
            Ok((h, p, s))
        }
        _ => Err(TokenError::Malformed),
    }
}

fn signing_input(header_b64: &str, payload_b64: &str) -> String {
    format!("{header_b64}.{payload_b64}")
}

fn decode_payload(payload_b64: &str) -> Result<Map<String, Value>, TokenError> {
    let bytes = codec::decode(payload_b64)?;
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(TokenError::Malformed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_core::ManualClock;
    use serde_json::json;

    const NOW: i64 = 1_750_000_000;

    fn engine() -> (TokenEngine, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::at_unix(NOW));
        let engine = TokenEngine::new(
            SecretKey::new("test-secret").unwrap(),
            TokenConfig::default(),
            clock.clone(),
        );
        (engine, clock)
    }

    #[test]
    fn test_issue_and_verify_access_token() {
        let (engine, _) = engine();
        let token = engine.issue_access("user-1", "member").unwrap();
        assert_eq!(token.split('.').count(), 3);
        assert!(!token.contains('='));

        let claims = engine.verify(&token).unwrap();
        assert_eq!(claims.subject, "user-1");
        assert_eq!(claims.role, "member");
        assert_eq!(claims.token_type, TokenType::Access);
        assert_eq!(claims.issued_at, NOW);
        assert_eq!(claims.expires_at, NOW + 60 * 60);
    }

    #[test]
    fn test_refresh_ttl_from_config() {
        let (engine, _) = engine();
        let claims = engine
            .verify(&engine.issue_refresh("u", "admin").unwrap())
            .unwrap();
        assert_eq!(claims.token_type, TokenType::Refresh);
        assert_eq!(claims.expires_at - claims.issued_at, 7 * 24 * 60 * 60);
    }

    #[test]
    fn test_header_and_payload_layout() {
        let (engine, _) = engine();
        let token = engine
            .issue("7", "lead", TokenType::Access, Duration::seconds(30))
            .unwrap();
        let mut parts = token.split('.');

        let header = codec::decode(parts.next().unwrap()).unwrap();
        assert_eq!(header, br#"{"alg":"HS256","typ":"JWT"}"#);

        let payload = codec::decode(parts.next().unwrap()).unwrap();
        let expected = format!(
            r#"{{"sub":"7","role":"lead","type":"access","iat":{NOW},"exp":{}}}"#,
            NOW + 30
        );
        assert_eq!(String::from_utf8(payload).unwrap(), expected);
    }

    #[test]
    fn test_issue_is_reproducible() {
        let (engine, _) = engine();
        let a = engine.issue_access("1", "member").unwrap();
        let b = engine.issue_access("1", "member").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_extra_claims_roundtrip() {
        let (engine, _) = engine();
        let extra = BTreeMap::from([("class_id".to_string(), json!("c-9"))]);
        let token = engine
            .issue_with_extra("1", "member", TokenType::Access, Duration::minutes(1), extra)
            .unwrap();

        let claims = engine.verify(&token).unwrap();
        assert_eq!(claims.extra.get("class_id"), Some(&json!("c-9")));
    }

    #[test]
    fn test_reserved_extra_claim_rejected() {
        let (engine, _) = engine();
        let extra = BTreeMap::from([("exp".to_string(), json!(0))]);
        let err = engine
            .issue_with_extra("1", "member", TokenType::Access, Duration::minutes(1), extra)
            .unwrap_err();
        assert!(matches!(err, TokenError::ReservedClaim(k) if k == "exp"));
    }

    #[test]
    fn test_negative_ttl_rejected() {
        let (engine, _) = engine();
        assert!(matches!(
            engine.issue("1", "member", TokenType::Access, Duration::seconds(-1)),
            Err(TokenError::InvalidTtl)
        ));
    }

    #[test]
    fn test_empty_identity_rejected_at_issue() {
        let (engine, _) = engine();
        assert!(matches!(
            engine.issue_access("", "member"),
            Err(TokenError::InvalidClaims { claim: "sub" })
        ));
        assert!(matches!(
            engine.issue_refresh("1", ""),
            Err(TokenError::InvalidClaims { claim: "role" })
        ));
        assert!(engine.issue_pair("", "").is_err());
    }

    #[test]
    fn test_oversized_ttls_do_not_panic() {
        let (engine, _) = engine();
        let token = engine
            .issue("1", "member", TokenType::Access, Duration::MAX)
            .unwrap();
        assert_eq!(engine.verify(&token).unwrap().subject, "1");

        let config = TokenConfig {
            access_token_expire_minutes: 200_000_000_000_000,
            refresh_token_expire_days: 7,
        };
        let engine = TokenEngine::new(
            SecretKey::new("secret").unwrap(),
            config,
            Arc::new(ManualClock::at_unix(NOW)),
        );
        assert!(engine.issue_access("1", "member").is_ok());
    }

    #[test]
    fn test_zero_ttl_expires_after_one_second() {
        let (engine, clock) = engine();
        let token = engine
            .issue("1", "member", TokenType::Access, Duration::zero())
            .unwrap();
        assert!(engine.verify(&token).is_ok());

        clock.advance(Duration::seconds(1));
        let err = engine.verify(&token).unwrap_err();
        assert!(err.is_expiry());
        assert!(matches!(err, TokenError::Expired { expired_at } if expired_at == NOW));
    }

    #[test]
    fn test_expired_token_fails_even_with_valid_signature() {
        let (engine, clock) = engine();
        let token = engine.issue_access("1", "member").unwrap();

        clock.advance(Duration::minutes(60));
        assert!(engine.verify(&token).is_ok());

        clock.advance(Duration::seconds(1));
        assert!(engine.verify(&token).unwrap_err().is_expiry());
    }

    #[test]
    fn test_malformed_tokens() {
        let (engine, _) = engine();
        for token in ["", "abc", "a.b", "a.b.c.d", ".b.c", "a..c", "a.b."] {
            assert!(
                matches!(engine.verify(token), Err(TokenError::Malformed)),
                "{token:?}"
            );
        }
    }

    #[test]
    fn test_undecodable_signature_segment() {
        let (engine, _) = engine();
        let token = engine.issue_access("1", "member").unwrap();
        let (head, _) = token.rsplit_once('.').unwrap();
        assert!(matches!(
            engine.verify(&format!("{head}.@@@")),
            Err(TokenError::Decode(_))
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let (engine, clock) = engine();
        let token = engine.issue_access("1", "member").unwrap();

        let other = TokenEngine::new(
            SecretKey::new("another-secret").unwrap(),
            TokenConfig::default(),
            clock,
        );
        assert!(matches!(
            other.verify(&token),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let (engine, _) = engine();
        let token = engine.issue_access("1", "member").unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        let forged_payload = codec::encode(
            serde_json::to_vec(&json!({
                "sub": "1", "role": "admin", "type": "access", "iat": NOW, "exp": NOW + 3600
            }))
            .unwrap(),
        );
        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);
        assert!(matches!(
            engine.verify(&forged),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn test_missing_and_invalid_expiry() {
        let (engine, _) = engine();

        let no_exp = engine
            .encode(&json!({"sub": "1", "role": "member", "type": "access", "iat": NOW}))
            .unwrap();
        assert!(matches!(
            engine.verify(&no_exp),
            Err(TokenError::MissingExpiry)
        ));

        let bad_exp = engine
            .encode(&json!({
                "sub": "1", "role": "member", "type": "access", "iat": NOW, "exp": "tomorrow"
            }))
            .unwrap();
        assert!(matches!(
            engine.verify(&bad_exp),
            Err(TokenError::InvalidExpiry)
        ));
    }

    #[test]
    fn test_string_expiry_accepted() {
        let (engine, _) = engine();
        let token = engine
            .encode(&json!({
                "sub": "1", "role": "member", "type": "access", "iat": NOW,
                "exp": (NOW + 10).to_string()
            }))
            .unwrap();
        assert_eq!(engine.verify(&token).unwrap().expires_at, NOW + 10);
    }

    #[test]
    fn test_signed_payload_missing_claims() {
        let (engine, _) = engine();
        let token = engine
            .encode(&json!({"role": "member", "type": "access", "iat": NOW, "exp": NOW + 10}))
            .unwrap();
        assert!(matches!(
            engine.verify(&token),
            Err(TokenError::InvalidClaims { claim: "sub" })
        ));
    }

    #[test]
    fn test_non_object_payload_is_malformed() {
        let (engine, _) = engine();
        let token = engine.encode(&json!([1, 2, 3])).unwrap();
        assert!(matches!(engine.verify(&token), Err(TokenError::Malformed)));
    }

    #[test]
    fn test_verify_token_enforces_kind() {
        let (engine, _) = engine();
        let pair = engine.issue_pair("1", "member").unwrap();
        assert_eq!(pair.token_type, "bearer");

        assert!(
            engine
                .verify_token(&pair.access_token, Some(TokenType::Access))
                .is_ok()
        );
        assert!(matches!(
            engine.verify_token(&pair.refresh_token, Some(TokenType::Access)),
            Err(TokenError::WrongTokenType { .. })
        ));
        assert!(matches!(
            engine.verify_token(&pair.access_token, Some(TokenType::Refresh)),
            Err(TokenError::WrongTokenType { .. })
        ));
        assert!(engine.verify_token(&pair.refresh_token, None).is_ok());
    }

    #[test]
    fn test_inspect_unverified() {
        let (engine, _) = engine();
        let token = engine.issue_access("9", "admin").unwrap();
        let payload = inspect_unverified(&token).unwrap();
        assert_eq!(payload.get("sub"), Some(&json!("9")));
        assert!(matches!(
            inspect_unverified("nope"),
            Err(TokenError::Malformed)
        ));
    }
}
