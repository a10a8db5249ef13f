//! Credential store and access group registry against the in-memory backend.

mod support;

use chrono::Duration;

use reportdesk_auth::{Permission, PermissionSet};
use reportdesk_core::{DomainError, GroupId, UserId};
use reportdesk_directory::{UserPatch, UserProfile};

use support::Fixture;

#[tokio::test]
async fn register_hashes_and_authenticates() {
    let fx = Fixture::new();
    let user = fx.directory.register("inspector", "Secr3t@pass").await.unwrap();

    assert_ne!(user.password_hash, "Secr3t@pass");
    assert!(user.groups.is_empty());
    assert!(!user.is_fired);

    let authed = fx.directory.authenticate("inspector", "Secr3t@pass").await.unwrap();
    assert_eq!(authed.id, user.id);
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let fx = Fixture::new();
    let id = fx.user("clerk", "Doe", "Jane").await;
    fx.directory
        .update_user(id, UserPatch {
            is_fired: Some(true),
            ..Default::default()
        })
        .await
        .unwrap();
    fx.directory.register("active", "Secr3t@pass").await.unwrap();

    let unknown = fx.directory.authenticate("nobody", "Secr3t@pass").await.unwrap_err();
    let wrong = fx.directory.authenticate("active", "wrong").await.unwrap_err();
    let fired = fx.directory.authenticate("clerk", "Secr3t@pass").await.unwrap_err();

    assert_eq!(unknown, DomainError::unauthorized("Invalid username or password"));
    assert_eq!(wrong, unknown);
    assert_eq!(fired, unknown);
}

#[tokio::test]
async fn duplicate_usernames_conflict() {
    let fx = Fixture::new();
    fx.directory.register("inspector", "Secr3t@pass").await.unwrap();
    let err = fx.directory.register("inspector", "Other@pass1").await.unwrap_err();
    assert_eq!(err, DomainError::conflict("Username already exists"));

    let err = fx.directory.register("  ", "Secr3t@pass").await.unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn renaming_onto_another_user_conflicts() {
    let fx = Fixture::new();
    let a = fx.user("alpha", "A", "A").await;
    fx.user("beta", "B", "B").await;

    let err = fx
        .directory
        .update_user(a, UserPatch {
            username: Some("beta".into()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));
}

#[tokio::test]
async fn update_merges_profile_and_rehashes_password() {
    let fx = Fixture::new();
    let id = fx.user("clerk", "Doe", "Jane").await;
    let before = fx.directory.get_user(id).await.unwrap();
    fx.clock.advance(Duration::minutes(5));

    let updated = fx
        .directory
        .update_user(id, UserPatch {
            password: Some("N3w@password".into()),
            profile: UserProfile {
                department: Some("Audit".into()),
                ..Default::default()
            },
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(updated.profile.last_name.as_deref(), Some("Doe"));
    assert_eq!(updated.profile.department.as_deref(), Some("Audit"));
    assert_ne!(updated.password_hash, before.password_hash);
    assert!(updated.updated_at > before.updated_at);
    assert!(fx.directory.authenticate("clerk", "N3w@password").await.is_ok());
}

#[tokio::test]
async fn password_policy_applies_to_resets() {
    let fx = Fixture::new();
    let id = fx.user("clerk", "Doe", "Jane").await;

    let weak = fx.directory.update_password(id, "password", "password").await.unwrap_err();
    assert!(matches!(weak, DomainError::Validation(_)));

    let mismatch = fx.directory.update_password(id, "Str0ng@pass", "Str0ng@pasz").await.unwrap_err();
    assert!(matches!(mismatch, DomainError::Validation(_)));

    fx.directory.update_password(id, "Str0ng@pass", "Str0ng@pass").await.unwrap();
    assert!(fx.directory.authenticate("clerk", "Str0ng@pass").await.is_ok());

    let missing = fx
        .directory
        .update_password(UserId::new(999), "Str0ng@pass", "Str0ng@pass")
        .await
        .unwrap_err();
    assert_eq!(missing, DomainError::not_found("User not found"));
}

#[tokio::test]
async fn group_membership_drives_effective_permissions() {
    let fx = Fixture::new();
    let intake = fx
        .registry
        .create_group("Intake", None, [Permission::CreateReport, Permission::ViewReport].into_iter().collect())
        .await
        .unwrap();
    let solvers = fx
        .registry
        .create_group("Solvers", Some("Close cases".into()), [Permission::SolveReport].into_iter().collect())
        .await
        .unwrap();
    let id = fx.user("clerk", "Doe", "Jane").await;

    fx.directory.add_to_group(id, intake.id).await.unwrap();
    let user = fx.directory.add_to_group(id, solvers.id).await.unwrap();
    let perms = fx.directory.effective_permissions(&user).await.unwrap();
    assert_eq!(perms.names(), vec!["CreateReport", "ViewReport", "SolveReport"]);

    let user = fx.directory.remove_from_group(id, intake.id).await.unwrap();
    let perms = fx.directory.effective_permissions(&user).await.unwrap();
    assert_eq!(perms.names(), vec!["SolveReport"]);

    let in_solvers = fx.directory.users_in_group("Solvers").await.unwrap();
    assert_eq!(in_solvers.len(), 1);
    assert_eq!(in_solvers[0].id, id);
    assert!(fx.directory.users_in_group("Intake").await.unwrap().is_empty());
}

#[tokio::test]
async fn membership_changes_require_existing_records() {
    let fx = Fixture::new();
    let id = fx.user("clerk", "Doe", "Jane").await;

    let err = fx.directory.add_to_group(id, GroupId::new(42)).await.unwrap_err();
    assert_eq!(err, DomainError::not_found("Group not found"));

    let group = fx.registry.create_group("Intake", None, PermissionSet::new()).await.unwrap();
    let err = fx.directory.add_to_group(UserId::new(42), group.id).await.unwrap_err();
    assert_eq!(err, DomainError::not_found("User not found"));

    let err = fx.directory.users_in_group("Nobody").await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));
}

#[tokio::test]
async fn delete_removes_the_account() {
    let fx = Fixture::new();
    let id = fx.user("clerk", "Doe", "Jane").await;

    fx.directory.delete_user(id).await.unwrap();
    assert_eq!(fx.directory.user_id_by_username("clerk").await.unwrap(), None);
    assert_eq!(fx.directory.delete_user(id).await.unwrap_err(), DomainError::not_found("User not found"));
}

#[tokio::test]
async fn display_names_skip_unnamed_and_unknown_users() {
    let fx = Fixture::new();
    let named = fx.user("clerk", "Doe", "Jane").await;
    let unnamed = fx.directory.register("anon", "Secr3t@pass").await.unwrap().id;

    let names = fx
        .directory
        .display_names(&[named, unnamed, UserId::new(77), named])
        .await
        .unwrap();
    assert_eq!(names.len(), 1);
    assert_eq!(names[&named], "Doe Jane");
}

#[tokio::test]
async fn group_names_are_unique_and_bounded() {
    let fx = Fixture::new();
    fx.registry.create_group("Intake", None, PermissionSet::new()).await.unwrap();

    let err = fx.registry.create_group("Intake", None, PermissionSet::new()).await.unwrap_err();
    assert_eq!(err, DomainError::conflict("Access group name already exists"));

    let err = fx.registry.create_group(&"x".repeat(101), None, PermissionSet::new()).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    assert_eq!(fx.registry.list_groups().await.unwrap().len(), 1);
    assert_eq!(fx.registry.get_group(GroupId::new(9)).await.unwrap_err(), DomainError::not_found("Group not found"));
}

#[tokio::test]
async fn ensure_group_is_idempotent() {
    let fx = Fixture::new();
    let first = fx.registry.ensure_group("Administrators", "Everything", PermissionSet::all()).await.unwrap();
    let second = fx.registry.ensure_group("Administrators", "Everything", PermissionSet::new()).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(second.permissions.len(), Permission::ALL.len());
}
