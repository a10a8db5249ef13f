//! Service wiring: one instance of every service, shared by all handlers.

use std::sync::Arc;

use anyhow::Context;

use reportdesk_auth::{Argon2Hasher, PasswordHasher, TokenService};
use reportdesk_core::{Clock, SystemClock};
use reportdesk_directory::{AccessGroupRegistry, UserDirectory};
use reportdesk_infra::config::AppConfig;
use reportdesk_infra::Repositories;
use reportdesk_reports::ReportService;

pub struct AppServices {
    pub tokens: TokenService,
    pub directory: UserDirectory,
    pub registry: AccessGroupRegistry,
    pub reports: ReportService,
    pub clock: Arc<dyn Clock>,
}

impl AppServices {
    pub fn new(
        repos: Repositories,
        tokens: TokenService,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tokens,
            directory: UserDirectory::new(repos.users.clone(), repos.groups.clone(), hasher, clock.clone()),
            registry: AccessGroupRegistry::new(repos.groups.clone()),
            reports: ReportService::new(repos.reports, repos.users, clock.clone()),
            clock,
        }
    }

    /// Build everything `config` describes: storage backend, token signer, hasher.
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        if config.jwt.using_dev_secret {
            tracing::warn!("JWT_SECRET not set; using insecure development secret");
        }
        let tokens = TokenService::new(
            config.jwt.secret.as_bytes(),
            chrono::Duration::seconds(config.jwt.expiration_secs),
        )
        .context("invalid JWT configuration")?;
        let hasher = Argon2Hasher::new(config.password_hashing).context("invalid password hashing parameters")?;
        let repos = Repositories::open(&config.store).await.context("failed to open the store")?;

        Ok(Self::new(repos, tokens, Arc::new(hasher), Arc::new(SystemClock)))
    }
}
