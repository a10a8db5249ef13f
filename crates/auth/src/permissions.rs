use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Capability granted to users through access-group membership.
///
/// The set is closed: anything not listed here cannot be granted. The wire
/// and storage form of each variant is its name (e.g. `"ViewReport"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Permission {
    CreateReport,
    ViewReport,
    UpdateReport,
    SolveReport,
    AssignProcessReport,
    DeleteReport,
    /// Bypass for the report ownership filter.
    AccessToAllReports,
    AddUsers,
    DeleteUsers,
    UpdateUsers,
    ManageUserGroups,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown permission '{0}'")]
pub struct UnknownPermission(pub String);

impl Permission {
    pub const ALL: [Permission; 11] = [
        Permission::CreateReport,
        Permission::ViewReport,
        Permission::UpdateReport,
        Permission::SolveReport,
        Permission::AssignProcessReport,
        Permission::DeleteReport,
        Permission::AccessToAllReports,
        Permission::AddUsers,
        Permission::DeleteUsers,
        Permission::UpdateUsers,
        Permission::ManageUserGroups,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Permission::CreateReport => "CreateReport",
            Permission::ViewReport => "ViewReport",
            Permission::UpdateReport => "UpdateReport",
            Permission::SolveReport => "SolveReport",
            Permission::AssignProcessReport => "AssignProcessReport",
            Permission::DeleteReport => "DeleteReport",
            Permission::AccessToAllReports => "AccessToAllReports",
            Permission::AddUsers => "AddUsers",
            Permission::DeleteUsers => "DeleteUsers",
            Permission::UpdateUsers => "UpdateUsers",
            Permission::ManageUserGroups => "ManageUserGroups",
        }
    }
}

impl core::str::FromStr for Permission {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownPermission(s.to_string()))
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered, duplicate-free set of permissions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<Permission>);

impl PermissionSet {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    pub fn all() -> Self {
        Permission::ALL.into_iter().collect()
    }

    /// Parse stored permission names, skipping (and logging) names outside the
    /// closed set.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for name in names {
            match name.as_ref().parse::<Permission>() {
                Ok(p) => {
                    set.insert(p);
                }
                Err(e) => tracing::warn!(error = %e, "ignoring unrecognised permission"),
            }
        }
        Self(set)
    }

    pub fn contains(&self, permission: Permission) -> bool {
        self.0.contains(&permission)
    }

    pub fn insert(&mut self, permission: Permission) -> bool {
        self.0.insert(permission)
    }

    pub fn remove(&mut self, permission: Permission) -> bool {
        self.0.remove(&permission)
    }

    pub fn extend(&mut self, other: &PermissionSet) {
        self.0.extend(other.0.iter().copied());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        self.0.iter().copied()
    }

    /// Permission names in canonical order (used as token authorities).
    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|p| p.as_str().to_string()).collect()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = Permission>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
