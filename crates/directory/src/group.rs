use serde::{Deserialize, Serialize};

use reportdesk_auth::PermissionSet;
use reportdesk_core::GroupId;

/// Named bundle of permissions assignable to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessGroup {
    pub id: GroupId,
    pub name: String,
    pub description: Option<String>,
    pub permissions: PermissionSet,
}

/// A group that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDraft {
    pub name: String,
    pub description: Option<String>,
    pub permissions: PermissionSet,
}

impl GroupDraft {
    pub fn into_group(self, id: GroupId) -> AccessGroup {
        AccessGroup {
            id,
            name: self.name,
            description: self.description,
            permissions: self.permissions,
        }
    }
}

/// Union of the permissions granted by `groups`.
pub fn effective_permissions<'a>(groups: impl IntoIterator<Item = &'a AccessGroup>) -> PermissionSet {
    let mut set = PermissionSet::new();
    for group in groups {
        set.extend(&group.permissions);
    }
    set
}
