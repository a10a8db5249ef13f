//! Signed, time-limited identity tokens (HS512 JWT).
//!
//! Validation is a pure function of the token string, the shared secret and
//! the current time: no storage round-trip is involved.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use reportdesk_core::UserId;

use crate::claims::{validate_claims, TokenClaims, TokenValidationError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("invalid token signature")]
    BadSignature,

    #[error("unsupported token: {0}")]
    Unsupported(String),

    #[error("token claims are empty: {0}")]
    EmptyClaims(String),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),

    #[error("signing secret too short: {actual} bytes, need at least {min}")]
    WeakSecret { min: usize, actual: usize },

    #[error("failed to sign token: {0}")]
    Encoding(String),
}

impl TokenError {
    pub fn is_expired(&self) -> bool {
        matches!(self, TokenError::Claims(TokenValidationError::Expired))
    }
}

/// What gets embedded into an issued token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenIdentity {
    pub username: String,
    pub user_id: UserId,
    pub authorities: Vec<String>,
}

/// Issues and validates tokens with a symmetric key.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl core::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &Algorithm::HS512)
            .field("ttl_secs", &self.ttl.num_seconds())
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// HS512 needs a key at least as long as its 512-bit output.
    pub const MIN_SECRET_LEN: usize = 64;

    pub fn new(secret: &[u8], ttl: Duration) -> Result<Self, TokenError> {
        if secret.len() < Self::MIN_SECRET_LEN {
            return Err(TokenError::WeakSecret {
                min: Self::MIN_SECRET_LEN,
                actual: secret.len(),
            });
        }

        // Expiry is checked by `validate_claims` against an explicit clock.
        let mut validation = Validation::new(Algorithm::HS512);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token for `identity`, valid from `now` until `now + ttl`.
    pub fn issue(&self, identity: &TokenIdentity, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = TokenClaims {
            sub: identity.username.clone(),
            user_id: Some(identity.user_id),
            groups: identity.authorities.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS512), &claims, &self.encoding)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Validate against the wall clock.
    pub fn validate(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.validate_at(token, Utc::now())
    }

    /// Verify signature and format, then check the time window at `now`.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        let result = self.decode_claims(token).and_then(|claims| {
            validate_claims(&claims, now)?;
            Ok(claims)
        });
        if let Err(e) = &result {
            tracing::debug!(reason = %e, "token rejected");
        }
        result
    }

    /// Username of a valid token.
    pub fn subject(&self, token: &str) -> Result<String, TokenError> {
        self.validate(token).map(|claims| claims.sub)
    }

    /// Numeric user id of a valid token; `None` on any failure.
    pub fn user_id(&self, token: &str) -> Option<UserId> {
        self.validate(token).ok().and_then(|claims| claims.user_id)
    }

    /// Resolve the user id from a raw `Authorization` header value.
    pub fn user_id_from_authorization(&self, header: Option<&str>) -> Option<UserId> {
        header.and_then(bearer_token).and_then(|token| self.user_id(token))
    }

    fn decode_claims(&self, token: &str) -> Result<TokenClaims, TokenError> {
        if token.trim().is_empty() {
            return Err(TokenError::EmptyClaims("token string is empty".into()));
        }
        decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                ErrorKind::InvalidAlgorithm
                | ErrorKind::InvalidAlgorithmName
                | ErrorKind::MissingAlgorithm
                | ErrorKind::InvalidKeyFormat => TokenError::Unsupported(e.to_string()),
                ErrorKind::MissingRequiredClaim(claim) => TokenError::EmptyClaims(format!("missing '{claim}'")),
                _ => TokenError::Malformed(e.to_string()),
            })
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let token = header_value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
