//! Infrastructure layer: configuration and storage backends.

pub mod config;
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use std::sync::Arc;

use reportdesk_core::StoreError;
use reportdesk_directory::{AccessGroupRepository, UserRepository};
use reportdesk_reports::ReportRepository;

use crate::config::{StoreBackend, StoreConfig};

/// One set of repositories sharing a backend.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub groups: Arc<dyn AccessGroupRepository>,
    pub reports: Arc<dyn ReportRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(memory::InMemoryUserRepository::new()),
            groups: Arc::new(memory::InMemoryAccessGroupRepository::new()),
            reports: Arc::new(memory::InMemoryReportRepository::new()),
        }
    }

    #[cfg(feature = "postgres")]
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self {
            users: Arc::new(postgres::PostgresUserRepository::new(pool.clone())),
            groups: Arc::new(postgres::PostgresAccessGroupRepository::new(pool.clone())),
            reports: Arc::new(postgres::PostgresReportRepository::new(pool)),
        }
    }

    /// Open the backend selected by `config`.
    pub async fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        match config.backend {
            StoreBackend::Memory => {
                tracing::info!(backend = "memory", "store opened");
                Ok(Self::in_memory())
            }
            StoreBackend::Postgres => Self::open_postgres(config).await,
        }
    }

    #[cfg(feature = "postgres")]
    async fn open_postgres(config: &StoreConfig) -> Result<Self, StoreError> {
        let url = config
            .database_url
            .as_deref()
            .ok_or_else(|| StoreError::backend("DATABASE_URL is not set"))?;
        let pool = postgres::connect(url, config.max_connections).await?;
        tracing::info!(backend = "postgres", max_connections = config.max_connections, "store opened");
        Ok(Self::postgres(pool))
    }

    #[cfg(not(feature = "postgres"))]
    async fn open_postgres(_config: &StoreConfig) -> Result<Self, StoreError> {
        tracing::warn!("built without the `postgres` feature; falling back to the in-memory store");
        Ok(Self::in_memory())
    }
}
