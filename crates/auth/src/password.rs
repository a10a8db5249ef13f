//! Password hashing (Argon2id) and the new-password policy.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("invalid hashing parameters: {0}")]
    Params(String),

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),
}

/// One-way password hashing used by the credential store.
pub trait PasswordHasher: Send + Sync {
    /// Hash `plain` into a self-describing (PHC) string.
    fn hash(&self, plain: &str) -> Result<String, PasswordError>;

    /// `Ok(false)` on mismatch, `Err` only when `hash` cannot be parsed.
    fn verify(&self, plain: &str, hash: &str) -> Result<bool, PasswordError>;
}

/// Argon2 cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashingParams {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    pub fn new(params: HashingParams) -> Result<Self, PasswordError> {
        let params = Params::new(params.memory_kib, params.iterations, params.parallelism, None)
            .map_err(|e| PasswordError::Params(e.to_string()))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, plain: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(plain.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| PasswordError::Hash(e.to_string()))
    }

    fn verify(&self, plain: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed = PasswordHash::new(hash).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;
        match self.argon2().verify_password(plain.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::MalformedHash(e.to_string())),
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PasswordPolicyViolation {
    #[error("password must be at least 8 characters long")]
    TooShort,
    #[error("password must be at most 100 characters long")]
    TooLong,
    #[error("password must contain a digit")]
    MissingDigit,
    #[error("password must contain a lowercase letter")]
    MissingLowercase,
    #[error("password must contain an uppercase letter")]
    MissingUppercase,
    #[error("password must contain one of @#$%^&+=")]
    MissingSpecial,
    #[error("password must not contain whitespace")]
    Whitespace,
    #[error("password confirmation does not match")]
    Mismatch,
}

const SPECIALS: &str = "@#$%^&+=";

/// Policy applied when an administrator sets a new password.
pub fn validate_new_password(new_password: &str, confirmation: &str) -> Result<(), PasswordPolicyViolation> {
    let len = new_password.chars().count();
    if len < 8 {
        return Err(PasswordPolicyViolation::TooShort);
    }
    if len > 100 {
        return Err(PasswordPolicyViolation::TooLong);
    }
    if new_password.chars().any(char::is_whitespace) {
        return Err(PasswordPolicyViolation::Whitespace);
    }
    if !new_password.chars().any(|c| c.is_ascii_digit()) {
        return Err(PasswordPolicyViolation::MissingDigit);
    }
    if !new_password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(PasswordPolicyViolation::MissingLowercase);
    }
    if !new_password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(PasswordPolicyViolation::MissingUppercase);
    }
    if !new_password.chars().any(|c| SPECIALS.contains(c)) {
        return Err(PasswordPolicyViolation::MissingSpecial);
    }
    if new_password != confirmation {
        return Err(PasswordPolicyViolation::Mismatch);
    }
    Ok(())
}
