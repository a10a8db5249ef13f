use std::collections::BTreeMap;
use std::sync::RwLock;

use reportdesk_core::{GroupId, StoreError, UserId};
use reportdesk_directory::{User, UserDraft, UserRepository};

use super::{poisoned, Sequence};

#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<BTreeMap<UserId, User>>,
    ids: Sequence,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn scan(&self, keep: impl Fn(&User) -> bool) -> Result<Vec<User>, StoreError> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.values().filter(|u| keep(u)).cloned().collect())
    }
}

fn username_taken(existing: &BTreeMap<UserId, User>, username: &str, except: Option<UserId>) -> bool {
    existing
        .values()
        .any(|u| u.username == username && Some(u.id) != except)
}

#[async_trait::async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, draft: UserDraft) -> Result<User, StoreError> {
        let mut users = self.users.write().map_err(|_| poisoned())?;
        if username_taken(&users, &draft.username, None) {
            return Err(StoreError::UniqueViolation(format!("username '{}'", draft.username)));
        }
        let user = draft.into_user(UserId::new(self.ids.next()));
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.write().map_err(|_| poisoned())?;
        if username_taken(&users, &user.username, Some(user.id)) {
            return Err(StoreError::UniqueViolation(format!("username '{}'", user.username)));
        }
        match users.get_mut(&user.id) {
            Some(slot) => {
                *slot = user.clone();
                Ok(())
            }
            None => Err(StoreError::backend(format!("user {} vanished during update", user.id))),
        }
    }

    async fn delete(&self, id: UserId) -> Result<bool, StoreError> {
        let mut users = self.users.write().map_err(|_| poisoned())?;
        Ok(users.remove(&id).is_some())
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self.scan(|u| u.username == username)?.into_iter().next())
    }

    async fn get_many(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        self.scan(|_| true)
    }

    async fn list_in_group(&self, group: GroupId) -> Result<Vec<User>, StoreError> {
        self.scan(|u| u.in_group(group))
    }
}
