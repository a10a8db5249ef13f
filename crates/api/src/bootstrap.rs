//! First-start provisioning.
//!
//! With `BOOTSTRAP_ADMIN_USERNAME` and `BOOTSTRAP_ADMIN_PASSWORD` set, startup makes sure an
//! `Administrators` group holding every permission exists and that the named
//! account is a member of it. Running it again changes nothing.

use anyhow::Context;
use tracing::info;

use reportdesk_auth::PermissionSet;
use reportdesk_directory::{NewUser, User};
use reportdesk_infra::config::AdminCredentials;

use crate::app::services::AppServices;

pub const ADMIN_GROUP: &str = "Administrators";

pub async fn ensure_admin(services: &AppServices, admin: &AdminCredentials) -> anyhow::Result<User> {
    let group = services
        .registry
        .ensure_group(ADMIN_GROUP, "Full access to users, groups and reports", PermissionSet::all())
        .await
        .context("failed to provision the administrators group")?;

    let existing = services
        .directory
        .find_by_username(&admin.username)
        .await
        .context("failed to look up the administrator")?;

    let user = match existing {
        Some(user) if user.in_group(group.id) => {
            info!(username = %user.username, "administrator already provisioned");
            return Ok(user);
        }
        Some(user) => services
            .directory
            .add_to_group(user.id, group.id)
            .await
            .context("failed to add the administrator to its group")?,
        None => services
            .directory
            .add_user(NewUser {
                username: admin.username.clone(),
                password: admin.password.clone(),
                groups: vec![group.id],
                ..Default::default()
            })
            .await
            .context("failed to create the administrator")?,
    };

    info!(user_id = %user.id, username = %user.username, group = ADMIN_GROUP, "administrator provisioned");
    Ok(user)
}
