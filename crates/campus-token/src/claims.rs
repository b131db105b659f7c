//! Token claims.

use crate::error::TokenError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Payload keys owned by the engine; extra claims may not use them.
pub const RESERVED_CLAIMS: [&str; 5] = ["sub", "role", "type", "iat", "exp"];

/// The two token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Short-lived, presented on every authenticated request.
    Access,
    /// Long-lived, only exchanged for a new token pair.
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenType {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "access" => Ok(Self::Access),
            "refresh" => Ok(Self::Refresh),
            _ => Err(TokenError::InvalidClaims { claim: "type" }),
        }
    }
}

/// Claims carried by a token.
///
/// Field order is the serialized key order: registered claims first, then
/// `extra` sorted by key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Claims {
    /// Owning user id, as text.
    #[serde(rename = "sub")]
    pub subject: String,

    /// Role label; its meaning belongs to the caller's RBAC policy.
    pub role: String,

    #[serde(rename = "type")]
    pub token_type: TokenType,

    /// Issue time, seconds since the Unix epoch.
    #[serde(rename = "iat")]
    pub issued_at: i64,

    /// Expiry time, seconds since the Unix epoch.
    #[serde(rename = "exp")]
    pub expires_at: i64,

    /// Additional caller-supplied claims.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Claims {
    /// Fail with [`TokenError::WrongTokenType`] unless this is an `expected`
    /// token.
    pub fn require_type(&self, expected: TokenType) -> Result<(), TokenError> {
        if self.token_type == expected {
            Ok(())
        } else {
            Err(TokenError::WrongTokenType {
                expected,
                actual: self.token_type,
            })
        }
    }

    /// Seconds left before expiry at `now` (negative once expired).
    pub fn seconds_until_expiry(&self, now: i64) -> i64 {
        self.expires_at - now
    }

    /// Build typed claims from a decoded payload whose `exp` has already been
    /// validated.
    pub(crate) fn from_payload(
        mut payload: Map<String, Value>,
        expires_at: i64,
    ) -> Result<Self, TokenError> {
        let subject = take_string(&mut payload, "sub")?;
        let role = take_string(&mut payload, "role")?;
        let token_type = take_string(&mut payload, "type")?.parse()?;
        let issued_at = payload
            .remove("iat")
            .and_then(|v| v.as_i64())
            .ok_or(TokenError::InvalidClaims { claim: "iat" })?;
        payload.remove("exp");

        Ok(Self {
            subject,
            role,
            token_type,
            issued_at,
            expires_at,
            extra: payload.into_iter().collect(),
        })
    }
}

fn take_string(payload: &mut Map<String, Value>, claim: &'static str) -> Result<String, TokenError> {
    match payload.remove(claim) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s),
        _ => Err(TokenError::InvalidClaims { claim }),
    }
}

/// Parse the `exp` claim: a JSON integer or a string of decimal digits.
pub(crate) fn parse_expiry(payload: &Map<String, Value>) -> Result<i64, TokenError> {
    match payload.get("exp") {
        None | Some(Value::Null) => Err(TokenError::MissingExpiry),
        Some(Value::Number(n)) => n.as_i64().ok_or(TokenError::InvalidExpiry),
        Some(Value::String(s)) => s.trim().parse().map_err(|_| TokenError::InvalidExpiry),
        Some(_) => Err(TokenError::InvalidExpiry),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(token_type: TokenType) -> Claims {
        Claims {
            subject: "42".into(),
            role: "member".into(),
            token_type,
            issued_at: 100,
            expires_at: 200,
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn test_serialized_key_order() {
        let mut c = claims(TokenType::Access);
        c.extra.insert("zone".into(), json!("b"));
        c.extra.insert("class_id".into(), json!(7));

        let text = serde_json::to_string(&c).unwrap();
        assert_eq!(
            text,
            r#"{"sub":"42","role":"member","type":"access","iat":100,"exp":200,"class_id":7,"zone":"b"}"#
        );
    }

    #[test]
    fn test_require_type() {
        assert!(claims(TokenType::Access).require_type(TokenType::Access).is_ok());

        let err = claims(TokenType::Refresh)
            .require_type(TokenType::Access)
            .unwrap_err();
        assert!(matches!(
            err,
            TokenError::WrongTokenType {
                expected: TokenType::Access,
                actual: TokenType::Refresh
            }
        ));
    }

    #[test]
    fn test_parse_expiry_shapes() {
        let obj = |v: Value| v.as_object().unwrap().clone();

        assert_eq!(parse_expiry(&obj(json!({"exp": 5}))).unwrap(), 5);
        assert_eq!(parse_expiry(&obj(json!({"exp": "17"}))).unwrap(), 17);
        assert!(matches!(
            parse_expiry(&obj(json!({}))),
            Err(TokenError::MissingExpiry)
        ));
        assert!(matches!(
            parse_expiry(&obj(json!({"exp": null}))),
            Err(TokenError::MissingExpiry)
        ));
        for bad in [json!(1.5), json!("soon"), json!(true), json!([1])] {
            assert!(matches!(
                parse_expiry(&obj(json!({ "exp": bad }))),
                Err(TokenError::InvalidExpiry)
            ));
        }
    }

    #[test]
    fn test_from_payload_requires_every_claim() {
        let full = json!({"sub": "1", "role": "admin", "type": "refresh", "iat": 1, "exp": 2, "x": 1});
        let parsed = Claims::from_payload(full.as_object().unwrap().clone(), 2).unwrap();
        assert_eq!(parsed.token_type, TokenType::Refresh);
        assert_eq!(parsed.extra.get("x"), Some(&json!(1)));
        assert!(!parsed.extra.contains_key("exp"));

        for missing in ["sub", "role", "type", "iat"] {
            let mut payload = full.as_object().unwrap().clone();
            payload.remove(missing);
            let err = Claims::from_payload(payload, 2).unwrap_err();
            assert!(matches!(err, TokenError::InvalidClaims { claim } if claim == missing));
        }
    }

    #[test]
    fn test_unknown_token_type() {
        let payload = json!({"sub": "1", "role": "admin", "type": "id", "iat": 1});
        assert!(matches!(
            Claims::from_payload(payload.as_object().unwrap().clone(), 2),
            Err(TokenError::InvalidClaims { claim: "type" })
        ));
    }
}
