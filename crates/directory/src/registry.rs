use std::sync::Arc;

use reportdesk_auth::PermissionSet;
use reportdesk_core::{DomainError, DomainResult, GroupId};

use crate::{AccessGroup, AccessGroupRepository, GroupDraft};

const MAX_NAME_LEN: usize = 100;

/// Named permission bundles.
pub struct AccessGroupRegistry {
    groups: Arc<dyn AccessGroupRepository>,
}

impl AccessGroupRegistry {
    pub fn new(groups: Arc<dyn AccessGroupRepository>) -> Self {
        Self { groups }
    }

    pub async fn list_groups(&self) -> DomainResult<Vec<AccessGroup>> {
        Ok(self.groups.list().await?)
    }

    pub async fn get_group(&self, id: GroupId) -> DomainResult<AccessGroup> {
        self.groups
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Group not found"))
    }

    pub async fn create_group(
        &self,
        name: &str,
        description: Option<String>,
        permissions: PermissionSet,
    ) -> DomainResult<AccessGroup> {
        let name = validate_name(name)?;
        if self.groups.find_by_name(&name).await?.is_some() {
            return Err(DomainError::conflict("Access group name already exists"));
        }

        let group = self
            .groups
            .insert(GroupDraft {
                name,
                description: description.filter(|d| !d.trim().is_empty()),
                permissions,
            })
            .await?;
        tracing::info!(group_id = %group.id, name = %group.name, "access group created");
        Ok(group)
    }

    /// Return the group called `name`, creating it with `permissions` if absent.
    pub async fn ensure_group(
        &self,
        name: &str,
        description: &str,
        permissions: PermissionSet,
    ) -> DomainResult<AccessGroup> {
        if let Some(existing) = self.groups.find_by_name(name.trim()).await? {
            return Ok(existing);
        }
        self.create_group(name, Some(description.to_string()), permissions).await
    }
}

fn validate_name(name: &str) -> DomainResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("group name must not be blank"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::validation(format!(
            "group name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}
