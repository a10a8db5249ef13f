use reportdesk_core::{ReportId, StoreError, UserId};

use crate::{Report, ReportDraft, ReportFilter};

/// Storage contract for reports.
///
/// `list_assigned_to` and `find` are expected to filter at the source rather
/// than fetching everything and discarding rows afterwards.
#[async_trait::async_trait]
pub trait ReportRepository: Send + Sync {
    async fn insert(&self, draft: ReportDraft) -> Result<Report, StoreError>;

    async fn get(&self, id: ReportId) -> Result<Option<Report>, StoreError>;

    /// Overwrite a stored report. `false` when it no longer exists.
    async fn update(&self, report: &Report) -> Result<bool, StoreError>;

    async fn delete(&self, id: ReportId) -> Result<bool, StoreError>;

    /// All reports, oldest first.
    async fn list_all(&self) -> Result<Vec<Report>, StoreError>;

    async fn list_assigned_to(&self, user: UserId) -> Result<Vec<Report>, StoreError>;

    async fn find(&self, filter: &ReportFilter) -> Result<Vec<Report>, StoreError>;
}
