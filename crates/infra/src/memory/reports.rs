use std::collections::BTreeMap;
use std::sync::RwLock;

use reportdesk_core::{ReportId, StoreError, UserId};
use reportdesk_reports::{Report, ReportDraft, ReportFilter, ReportRepository};

use super::{poisoned, Sequence};

/// Reports keyed by id; iteration order is insertion order.
#[derive(Debug, Default)]
pub struct InMemoryReportRepository {
    reports: RwLock<BTreeMap<ReportId, Report>>,
    ids: Sequence,
}

impl InMemoryReportRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn scan(&self, keep: impl Fn(&Report) -> bool) -> Result<Vec<Report>, StoreError> {
        let reports = self.reports.read().map_err(|_| poisoned())?;
        Ok(reports.values().filter(|r| keep(r)).cloned().collect())
    }
}

#[async_trait::async_trait]
impl ReportRepository for InMemoryReportRepository {
    async fn insert(&self, draft: ReportDraft) -> Result<Report, StoreError> {
        let report = draft.into_report(ReportId::new(self.ids.next()));
        let mut reports = self.reports.write().map_err(|_| poisoned())?;
        reports.insert(report.id, report.clone());
        Ok(report)
    }

    async fn get(&self, id: ReportId) -> Result<Option<Report>, StoreError> {
        let reports = self.reports.read().map_err(|_| poisoned())?;
        Ok(reports.get(&id).cloned())
    }

    async fn update(&self, report: &Report) -> Result<bool, StoreError> {
        let mut reports = self.reports.write().map_err(|_| poisoned())?;
        Ok(match reports.get_mut(&report.id) {
            Some(slot) => {
                *slot = report.clone();
                true
            }
            None => false,
        })
    }

    async fn delete(&self, id: ReportId) -> Result<bool, StoreError> {
        let mut reports = self.reports.write().map_err(|_| poisoned())?;
        Ok(reports.remove(&id).is_some())
    }

    async fn list_all(&self) -> Result<Vec<Report>, StoreError> {
        self.scan(|_| true)
    }

    async fn list_assigned_to(&self, user: UserId) -> Result<Vec<Report>, StoreError> {
        self.scan(|r| r.assigned_to == Some(user))
    }

    async fn find(&self, filter: &ReportFilter) -> Result<Vec<Report>, StoreError> {
        self.scan(|r| filter.matches(r))
    }
}
