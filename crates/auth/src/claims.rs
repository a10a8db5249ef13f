use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use reportdesk_core::UserId;

/// JWT claims model.
///
/// `sub` is the username, `user_id` the numeric account id and `groups` the
/// authority list granted at issuance. Times are Unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: username.
    pub sub: String,

    /// Numeric user id. Absent when missing or not a number.
    #[serde(default, deserialize_with = "lenient_user_id", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,

    /// Authorities granted when the token was issued.
    #[serde(default)]
    pub groups: Vec<String>,

    /// Issued-at.
    pub iat: i64,

    /// Expiration.
    pub exp: i64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (iat is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,

    #[error("token subject is empty")]
    EmptySubject,
}

/// Deterministically validate decoded claims against `now`.
///
/// Signature checking happens before this, in `TokenService`.
pub fn validate_claims(claims: &TokenClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.sub.trim().is_empty() {
        return Err(TokenValidationError::EmptySubject);
    }
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    let now = now.timestamp();
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

fn lenient_user_id<'de, D>(deserializer: D) -> Result<Option<UserId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    let id = match raw {
        Some(serde_json::Value::Number(n)) => n.as_i64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    Ok(id.filter(|v| *v > 0).map(UserId::new))
}
