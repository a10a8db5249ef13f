//! Storage contracts for accounts and access groups.
//!
//! Implementations must enforce username and group-name uniqueness themselves
//! and report violations as `StoreError::UniqueViolation`.

use reportdesk_core::{GroupId, StoreError, UserId};

use crate::{AccessGroup, GroupDraft, User, UserDraft};

#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    /// Store a new account and assign its id.
    async fn insert(&self, draft: UserDraft) -> Result<User, StoreError>;

    /// Overwrite an existing account (including its memberships).
    async fn update(&self, user: &User) -> Result<(), StoreError>;

    /// Remove an account and its memberships. `false` when it did not exist.
    async fn delete(&self, id: UserId) -> Result<bool, StoreError>;

    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Fetch several accounts in one round trip; unknown ids are skipped.
    async fn get_many(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError>;

    async fn list(&self) -> Result<Vec<User>, StoreError>;

    async fn list_in_group(&self, group: GroupId) -> Result<Vec<User>, StoreError>;
}

#[async_trait::async_trait]
pub trait AccessGroupRepository: Send + Sync {
    async fn insert(&self, draft: GroupDraft) -> Result<AccessGroup, StoreError>;

    async fn get(&self, id: GroupId) -> Result<Option<AccessGroup>, StoreError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<AccessGroup>, StoreError>;

    async fn get_many(&self, ids: &[GroupId]) -> Result<Vec<AccessGroup>, StoreError>;

    async fn list(&self) -> Result<Vec<AccessGroup>, StoreError>;
}
