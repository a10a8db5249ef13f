use std::sync::Arc;

use chrono::{TimeZone, Utc};

use reportdesk_auth::{Argon2Hasher, Caller, HashingParams, Permission, PermissionSet};
use reportdesk_core::{ManualClock, UserId};
use reportdesk_directory::{AccessGroupRegistry, NewUser, UserDirectory, UserProfile};
use reportdesk_infra::Repositories;
use reportdesk_reports::ReportService;

pub struct Fixture {
    pub clock: Arc<ManualClock>,
    pub directory: UserDirectory,
    pub registry: AccessGroupRegistry,
    pub reports: ReportService,
}

impl Fixture {
    pub fn new() -> Self {
        let repos = Repositories::in_memory();
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap()));
        let hasher = Arc::new(
            Argon2Hasher::new(HashingParams {
                memory_kib: 1024,
                iterations: 1,
                parallelism: 1,
            })
            .unwrap(),
        );

        Self {
            directory: UserDirectory::new(repos.users.clone(), repos.groups.clone(), hasher, clock.clone()),
            registry: AccessGroupRegistry::new(repos.groups.clone()),
            reports: ReportService::new(repos.reports.clone(), repos.users.clone(), clock.clone()),
            clock,
        }
    }

    /// Add a user with a display name and return its id.
    pub async fn user(&self, username: &str, last: &str, first: &str) -> UserId {
        self.directory
            .add_user(NewUser {
                username: username.to_string(),
                password: "Secr3t@pass".to_string(),
                profile: UserProfile {
                    last_name: Some(last.to_string()),
                    first_name: Some(first.to_string()),
                    ..Default::default()
                },
                ..Default::default()
            })
            .await
            .unwrap()
            .id
    }
}

pub fn caller(id: UserId, perms: &[Permission]) -> Caller {
    Caller::new(Some(id), format!("user-{id}"), perms.iter().copied().collect::<PermissionSet>())
}
