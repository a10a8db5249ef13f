//! Credential store operations.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use reportdesk_auth::{validate_new_password, PasswordError, PasswordHasher, PermissionSet};
use reportdesk_core::{Clock, DomainError, DomainResult, GroupId, UserId};

use crate::group::effective_permissions;
use crate::{AccessGroupRepository, NewUser, User, UserDraft, UserPatch, UserRepository};

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Accounts, passwords and group memberships.
///
/// Permission checks are the caller's job: these operations assume the
/// request has already been authorized.
pub struct UserDirectory {
    users: Arc<dyn UserRepository>,
    groups: Arc<dyn AccessGroupRepository>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
}

impl UserDirectory {
    pub fn new(
        users: Arc<dyn UserRepository>,
        groups: Arc<dyn AccessGroupRepository>,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            groups,
            hasher,
            clock,
        }
    }

    /// Create a bare account with no groups.
    pub async fn register(&self, username: &str, password: &str) -> DomainResult<User> {
        self.add_user(NewUser {
            username: username.to_string(),
            password: password.to_string(),
            ..Default::default()
        })
        .await
    }

    pub async fn add_user(&self, new: NewUser) -> DomainResult<User> {
        let username = required("username", &new.username)?;
        required("password", &new.password)?;

        if self.users.find_by_username(&username).await?.is_some() {
            return Err(DomainError::conflict("Username already exists"));
        }
        let groups = self.resolve_groups(&new.groups).await?;

        let now = self.clock.now();
        let user = self
            .users
            .insert(UserDraft {
                username,
                password_hash: self.hash(&new.password)?,
                groups,
                profile: new.profile,
                is_fired: new.is_fired,
                created_at: now,
                updated_at: now,
            })
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "user created");
        Ok(user)
    }

    pub async fn update_user(&self, id: UserId, patch: UserPatch) -> DomainResult<User> {
        let mut user = self.require_user(id).await?;

        let UserPatch {
            username,
            password,
            profile,
            groups,
            is_fired,
        } = patch;

        if let Some(username) = username {
            let username = required("username", &username)?;
            if username != user.username {
                if let Some(other) = self.users.find_by_username(&username).await? {
                    if other.id != user.id {
                        return Err(DomainError::conflict("Username already exists"));
                    }
                }
                user.username = username;
            }
        }
        if let Some(password) = password {
            required("password", &password)?;
            user.password_hash = self.hash(&password)?;
        }
        if let Some(groups) = groups {
            user.groups = self.resolve_groups(&groups).await?;
        }
        if let Some(is_fired) = is_fired {
            user.is_fired = is_fired;
        }
        user.profile.merge(profile);
        user.updated_at = self.clock.now();

        self.users.update(&user).await?;
        tracing::info!(user_id = %user.id, "user updated");
        Ok(user)
    }

    pub async fn delete_user(&self, id: UserId) -> DomainResult<()> {
        if !self.users.delete(id).await? {
            return Err(user_not_found());
        }
        tracing::info!(user_id = %id, "user deleted");
        Ok(())
    }

    /// Administrative password reset, subject to the password policy.
    pub async fn update_password(&self, id: UserId, new_password: &str, confirmation: &str) -> DomainResult<()> {
        validate_new_password(new_password, confirmation).map_err(|v| DomainError::validation(v.to_string()))?;

        let mut user = self.require_user(id).await?;
        user.password_hash = self.hash(new_password)?;
        user.updated_at = self.clock.now();
        self.users.update(&user).await?;

        tracing::info!(user_id = %id, "password updated");
        Ok(())
    }

    pub async fn add_to_group(&self, user_id: UserId, group_id: GroupId) -> DomainResult<User> {
        let mut user = self.require_user(user_id).await?;
        self.require_group(group_id).await?;

        if user.groups.insert(group_id) {
            user.updated_at = self.clock.now();
            self.users.update(&user).await?;
            tracing::info!(user_id = %user_id, group_id = %group_id, "user added to group");
        }
        Ok(user)
    }

    pub async fn remove_from_group(&self, user_id: UserId, group_id: GroupId) -> DomainResult<User> {
        let mut user = self.require_user(user_id).await?;
        self.require_group(group_id).await?;

        if user.groups.remove(&group_id) {
            user.updated_at = self.clock.now();
            self.users.update(&user).await?;
            tracing::info!(user_id = %user_id, group_id = %group_id, "user removed from group");
        }
        Ok(user)
    }

    pub async fn get_user(&self, id: UserId) -> DomainResult<User> {
        self.require_user(id).await
    }

    pub async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        Ok(self.users.find_by_username(username).await?)
    }

    pub async fn user_id_by_username(&self, username: &str) -> DomainResult<Option<UserId>> {
        Ok(self.find_by_username(username).await?.map(|u| u.id))
    }

    pub async fn list_users(&self) -> DomainResult<Vec<User>> {
        Ok(self.users.list().await?)
    }

    pub async fn users_in_group(&self, group_name: &str) -> DomainResult<Vec<User>> {
        let group = self
            .groups
            .find_by_name(group_name)
            .await?
            .ok_or_else(group_not_found)?;
        Ok(self.users.list_in_group(group.id).await?)
    }

    /// Union of the permissions of every group the user belongs to.
    pub async fn effective_permissions(&self, user: &User) -> DomainResult<PermissionSet> {
        if user.groups.is_empty() {
            return Ok(PermissionSet::new());
        }
        let ids: Vec<GroupId> = user.groups.iter().copied().collect();
        let groups = self.groups.get_many(&ids).await?;
        Ok(effective_permissions(&groups))
    }

    /// Check a username/password pair.
    ///
    /// Unknown users, wrong passwords and fired users all produce the same
    /// `Unauthorized` error.
    pub async fn authenticate(&self, username: &str, password: &str) -> DomainResult<User> {
        let Some(user) = self.users.find_by_username(username.trim()).await? else {
            return Err(DomainError::unauthorized(INVALID_CREDENTIALS));
        };
        if user.is_fired {
            tracing::info!(user_id = %user.id, "login refused for fired user");
            return Err(DomainError::unauthorized(INVALID_CREDENTIALS));
        }
        match self.hasher.verify(password, &user.password_hash) {
            Ok(true) => Ok(user),
            Ok(false) => Err(DomainError::unauthorized(INVALID_CREDENTIALS)),
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "stored password hash unusable");
                Err(DomainError::unauthorized(INVALID_CREDENTIALS))
            }
        }
    }

    /// Display names for `ids` in a single lookup. Users without a name are
    /// left out of the map.
    pub async fn display_names(&self, ids: &[UserId]) -> DomainResult<HashMap<UserId, String>> {
        display_names(self.users.as_ref(), ids).await
    }

    async fn require_user(&self, id: UserId) -> DomainResult<User> {
        self.users.get(id).await?.ok_or_else(user_not_found)
    }

    async fn require_group(&self, id: GroupId) -> DomainResult<()> {
        self.groups.get(id).await?.map(|_| ()).ok_or_else(group_not_found)
    }

    async fn resolve_groups(&self, ids: &[GroupId]) -> DomainResult<BTreeSet<GroupId>> {
        let wanted: BTreeSet<GroupId> = ids.iter().copied().collect();
        if wanted.is_empty() {
            return Ok(wanted);
        }
        let ids: Vec<GroupId> = wanted.iter().copied().collect();
        let found = self.groups.get_many(&ids).await?;
        if found.len() != wanted.len() {
            return Err(group_not_found());
        }
        Ok(wanted)
    }

    fn hash(&self, plain: &str) -> DomainResult<String> {
        self.hasher.hash(plain).map_err(hashing_failed)
    }
}

/// Batch display-name lookup shared with report enrichment.
pub async fn display_names(users: &dyn UserRepository, ids: &[UserId]) -> DomainResult<HashMap<UserId, String>> {
    let distinct: BTreeSet<UserId> = ids.iter().copied().collect();
    if distinct.is_empty() {
        return Ok(HashMap::new());
    }
    let distinct: Vec<UserId> = distinct.into_iter().collect();
    let found = users.get_many(&distinct).await?;
    Ok(found
        .into_iter()
        .filter_map(|u| u.display_name().map(|name| (u.id, name)))
        .collect())
}

fn required(field: &str, value: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} must not be blank")));
    }
    Ok(trimmed.to_string())
}

fn user_not_found() -> DomainError {
    DomainError::not_found("User not found")
}

fn group_not_found() -> DomainError {
    DomainError::not_found("Group not found")
}

fn hashing_failed(e: PasswordError) -> DomainError {
    DomainError::internal(format!("password hashing: {e}"))
}
