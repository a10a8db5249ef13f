use serde::Serialize;

use reportdesk_core::UserId;

use crate::{authorize, AuthzError, Permission, PermissionSet};

/// The authenticated identity behind one request.
///
/// Built by the authentication gate from a validated token plus the user's
/// current group memberships, then passed explicitly into every policy-checked
/// operation. It is never stored or shared across requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Caller {
    user_id: Option<UserId>,
    username: String,
    permissions: PermissionSet,
}

impl Caller {
    pub fn new(user_id: Option<UserId>, username: impl Into<String>, permissions: PermissionSet) -> Self {
        Self {
            user_id,
            username: username.into(),
            permissions,
        }
    }

    /// The numeric id carried by the token, if it was present and parseable.
    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    pub fn has(&self, permission: Permission) -> bool {
        self.permissions.contains(permission)
    }

    pub fn require(&self, permission: Permission) -> Result<(), AuthzError> {
        authorize(self, permission)
    }

    /// The caller's id, or `Unauthenticated` when it could not be resolved.
    pub fn resolved_user_id(&self) -> Result<UserId, AuthzError> {
        self.user_id.ok_or(AuthzError::Unauthenticated)
    }

    pub fn sees_all_reports(&self) -> bool {
        self.has(Permission::AccessToAllReports)
    }
}
