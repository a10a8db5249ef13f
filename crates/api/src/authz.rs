//! Coarse permission checks for the user and access-group endpoints.
//!
//! Report endpoints do not use this: `ReportService` runs its own permission
//! and ownership checks.

use axum::response::Response;

use reportdesk_auth::{Caller, Permission};
use reportdesk_core::DomainError;

use crate::app::errors;

/// Reject with 403 unless `caller` holds `permission`.
pub fn require(caller: &Caller, permission: Permission) -> Result<(), Response> {
    caller
        .require(permission)
        .map_err(|e| errors::domain_error_to_response(DomainError::from(e)))
}
