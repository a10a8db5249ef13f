//! Report workflow.
//!
//! Every operation checks its coarse permission first, then (where the report
//! already exists) the ownership rule from `access.rs`.

use std::collections::HashMap;
use std::sync::Arc;

use reportdesk_auth::{Caller, Permission};
use reportdesk_core::{Clock, DomainError, DomainResult, ReportId, UserId};
use reportdesk_directory::{service::display_names, UserRepository};

use crate::access::{ensure_report_access, listing_scope, scope_filter, ListingScope};
use crate::{NewReport, Report, ReportDraft, ReportFilter, ReportPatch, ReportRepository, ReportStatus, ReportView};

pub struct ReportService {
    reports: Arc<dyn ReportRepository>,
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl ReportService {
    pub fn new(reports: Arc<dyn ReportRepository>, users: Arc<dyn UserRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { reports, users, clock }
    }

    /// Submit a report. The reporter is always the caller.
    pub async fn create(&self, caller: &Caller, new: NewReport) -> DomainResult<Report> {
        caller.require(Permission::CreateReport)?;
        let reporter_id = caller.resolved_user_id()?;

        let now = self.clock.now();
        let report = self
            .reports
            .insert(ReportDraft {
                date_submitted: now,
                reporter_id,
                details: new,
                status: ReportStatus::New,
                last_updated: now,
            })
            .await?;

        tracing::info!(report_id = %report.id, reporter_id = %reporter_id, "report created");
        Ok(report)
    }

    pub async fn get(&self, caller: &Caller, id: ReportId) -> DomainResult<ReportView> {
        caller.require(Permission::ViewReport)?;
        let report = self.require_report(id).await?;
        ensure_report_access(caller, &report)?;
        self.enrich(vec![report])
            .await?
            .pop()
            .ok_or_else(|| DomainError::internal("report enrichment dropped a row"))
    }

    /// Everything the caller may see: all reports with the bypass, otherwise
    /// those assigned to the caller.
    pub async fn list(&self, caller: &Caller) -> DomainResult<Vec<ReportView>> {
        caller.require(Permission::ViewReport)?;
        match listing_scope(caller)? {
            ListingScope::All => self.list_all().await,
            ListingScope::AssignedTo(id) => self.list_assigned_to(id).await,
        }
    }

    pub async fn list_all(&self) -> DomainResult<Vec<ReportView>> {
        let reports = self.reports.list_all().await?;
        self.enrich(reports).await
    }

    pub async fn list_assigned_to(&self, user: UserId) -> DomainResult<Vec<ReportView>> {
        let reports = self.reports.list_assigned_to(user).await?;
        self.enrich(reports).await
    }

    /// Merge the present fields of `patch` into the report.
    pub async fn update(&self, caller: &Caller, id: ReportId, patch: ReportPatch) -> DomainResult<Report> {
        caller.require(Permission::UpdateReport)?;
        self.apply(caller, id, patch).await
    }

    pub async fn update_status(&self, caller: &Caller, id: ReportId, status: ReportStatus) -> DomainResult<Report> {
        caller.require(Permission::SolveReport)?;
        self.apply(caller, id, ReportPatch::status(status)).await
    }

    pub async fn update_solution(&self, caller: &Caller, id: ReportId, solution: String) -> DomainResult<Report> {
        caller.require(Permission::SolveReport)?;
        self.apply(caller, id, ReportPatch::solution(solution)).await
    }

    /// Hand a report to `assignee`. Not subject to the ownership rule.
    pub async fn assign(&self, caller: &Caller, id: ReportId, assignee: UserId) -> DomainResult<Report> {
        caller.require(Permission::AssignProcessReport)?;
        let mut report = self.require_report(id).await?;
        if self.users.get(assignee).await?.is_none() {
            return Err(DomainError::not_found("User not found"));
        }

        report.assigned_to = Some(assignee);
        report.last_updated = self.clock.now();
        self.store(&report).await?;

        tracing::info!(report_id = %id, assignee = %assignee, by = caller.username(), "report assigned");
        Ok(report)
    }

    pub async fn delete(&self, caller: &Caller, id: ReportId) -> DomainResult<()> {
        caller.require(Permission::DeleteReport)?;
        let report = self.require_report(id).await?;
        ensure_report_access(caller, &report)?;

        if !self.reports.delete(id).await? {
            return Err(report_not_found());
        }
        tracing::info!(report_id = %id, by = caller.username(), "report deleted");
        Ok(())
    }

    /// Search within what the caller may see.
    pub async fn filter(&self, caller: &Caller, filter: ReportFilter) -> DomainResult<Vec<ReportView>> {
        caller.require(Permission::ViewReport)?;
        let scoped = scope_filter(caller, filter)?;
        let reports = self.reports.find(&scoped).await?;
        self.enrich(reports).await
    }

    async fn apply(&self, caller: &Caller, id: ReportId, patch: ReportPatch) -> DomainResult<Report> {
        let mut report = self.require_report(id).await?;
        ensure_report_access(caller, &report)?;

        patch.apply_to(&mut report);
        report.last_updated = self.clock.now();
        self.store(&report).await?;

        tracing::info!(report_id = %id, status = %report.status, by = caller.username(), "report updated");
        Ok(report)
    }

    async fn store(&self, report: &Report) -> DomainResult<()> {
        if self.reports.update(report).await? {
            Ok(())
        } else {
            Err(report_not_found())
        }
    }

    async fn require_report(&self, id: ReportId) -> DomainResult<Report> {
        self.reports.get(id).await?.ok_or_else(report_not_found)
    }

    /// Attach assignee display names with one batch lookup.
    async fn enrich(&self, reports: Vec<Report>) -> DomainResult<Vec<ReportView>> {
        let assignees: Vec<UserId> = reports.iter().filter_map(|r| r.assigned_to).collect();
        let names: HashMap<UserId, String> = display_names(self.users.as_ref(), &assignees).await?;

        Ok(reports
            .into_iter()
            .map(|report| {
                let assigned_to_full_name = report.assigned_to.and_then(|id| names.get(&id).cloned());
                ReportView {
                    report,
                    assigned_to_full_name,
                }
            })
            .collect())
    }
}

fn report_not_found() -> DomainError {
    DomainError::not_found("Report not found")
}
