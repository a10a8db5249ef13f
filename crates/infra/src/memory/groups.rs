use std::collections::BTreeMap;
use std::sync::RwLock;

use reportdesk_core::{GroupId, StoreError};
use reportdesk_directory::{AccessGroup, AccessGroupRepository, GroupDraft};

use super::{poisoned, Sequence};

#[derive(Debug, Default)]
pub struct InMemoryAccessGroupRepository {
    groups: RwLock<BTreeMap<GroupId, AccessGroup>>,
    ids: Sequence,
}

impl InMemoryAccessGroupRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl AccessGroupRepository for InMemoryAccessGroupRepository {
    async fn insert(&self, draft: GroupDraft) -> Result<AccessGroup, StoreError> {
        let mut groups = self.groups.write().map_err(|_| poisoned())?;
        if groups.values().any(|g| g.name == draft.name) {
            return Err(StoreError::UniqueViolation(format!("group name '{}'", draft.name)));
        }
        let group = draft.into_group(GroupId::new(self.ids.next()));
        groups.insert(group.id, group.clone());
        Ok(group)
    }

    async fn get(&self, id: GroupId) -> Result<Option<AccessGroup>, StoreError> {
        let groups = self.groups.read().map_err(|_| poisoned())?;
        Ok(groups.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<AccessGroup>, StoreError> {
        let groups = self.groups.read().map_err(|_| poisoned())?;
        Ok(groups.values().find(|g| g.name == name).cloned())
    }

    async fn get_many(&self, ids: &[GroupId]) -> Result<Vec<AccessGroup>, StoreError> {
        let groups = self.groups.read().map_err(|_| poisoned())?;
        Ok(ids.iter().filter_map(|id| groups.get(id).cloned()).collect())
    }

    async fn list(&self) -> Result<Vec<AccessGroup>, StoreError> {
        let groups = self.groups.read().map_err(|_| poisoned())?;
        Ok(groups.values().cloned().collect())
    }
}
