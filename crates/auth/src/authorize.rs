use thiserror::Error;

use reportdesk_core::DomainError;

use crate::{Caller, Permission};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("caller identity could not be resolved")]
    Unauthenticated,

    #[error("forbidden: missing permission '{0}'")]
    Forbidden(Permission),

    #[error("forbidden: resource is not assigned to the caller")]
    NotOwner,
}

impl From<AuthzError> for DomainError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Unauthenticated => DomainError::unauthorized("Unable to identify user"),
            AuthzError::Forbidden(p) => DomainError::forbidden(format!("Access denied: missing permission {p}")),
            AuthzError::NotOwner => DomainError::forbidden("Access denied"),
        }
    }
}

/// Check that the caller holds `required`.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(caller: &Caller, required: Permission) -> Result<(), AuthzError> {
    if caller.permissions().contains(required) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required))
    }
}
