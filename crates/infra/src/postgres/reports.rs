use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

use reportdesk_core::{ReportId, StoreError, UserId};
use reportdesk_reports::{Report, ReportDraft, ReportFilter, ReportRepository, ReportStatus};

use super::{like_pattern, map_sqlx_error};

const COLUMNS: &str = "id, date_submitted, reporter_id, incident_date, incident_time, incident_location, \
     involved_persons, description, evidence_description, witnesses, status, assigned_to, last_updated, solution";

#[derive(Debug, Clone)]
pub struct PostgresReportRepository {
    pool: PgPool,
}

impl PostgresReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, operation: &str, mut builder: QueryBuilder<'_, Postgres>) -> Result<Vec<Report>, StoreError> {
        builder.push(" ORDER BY id");
        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;
        rows.iter().map(|row| report_from_row(operation, row)).collect()
    }
}

fn select() -> QueryBuilder<'static, Postgres> {
    QueryBuilder::new(format!("SELECT {COLUMNS} FROM reports WHERE TRUE"))
}

fn report_from_row(operation: &str, row: &PgRow) -> Result<Report, StoreError> {
    let decode = |e| map_sqlx_error(operation, e);
    let status: String = row.try_get("status").map_err(decode)?;
    let status = status
        .parse::<ReportStatus>()
        .map_err(|e| StoreError::backend(format!("{operation}: {e}")))?;
    let assigned_to: Option<i64> = row.try_get("assigned_to").map_err(decode)?;

    Ok(Report {
        id: ReportId::new(row.try_get("id").map_err(decode)?),
        date_submitted: row.try_get("date_submitted").map_err(decode)?,
        reporter_id: UserId::new(row.try_get("reporter_id").map_err(decode)?),
        incident_date: row.try_get("incident_date").map_err(decode)?,
        incident_time: row.try_get("incident_time").map_err(decode)?,
        incident_location: row.try_get("incident_location").map_err(decode)?,
        involved_persons: row.try_get("involved_persons").map_err(decode)?,
        description: row.try_get("description").map_err(decode)?,
        evidence_description: row.try_get("evidence_description").map_err(decode)?,
        witnesses: row.try_get("witnesses").map_err(decode)?,
        status,
        assigned_to: assigned_to.map(UserId::new),
        last_updated: row.try_get("last_updated").map_err(decode)?,
        solution: row.try_get("solution").map_err(decode)?,
    })
}

/// Append the `WHERE` conditions for `filter`; text criteria become one `ILIKE` per token.
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &ReportFilter) {
    if let Some(reporter) = filter.reporter_id {
        builder.push(" AND reporter_id = ").push_bind(reporter.get());
    }
    if let Some(assignee) = filter.assigned_to {
        builder.push(" AND assigned_to = ").push_bind(assignee.get());
    }
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some((start, end)) = filter.date_range() {
        builder
            .push(" AND incident_date BETWEEN ")
            .push_bind(start)
            .push(" AND ")
            .push_bind(end);
    }
    for token in filter.location_tokens() {
        builder.push(" AND incident_location ILIKE ").push_bind(like_pattern(&token));
    }
    for token in filter.involved_tokens() {
        builder.push(" AND involved_persons ILIKE ").push_bind(like_pattern(&token));
    }
}

#[async_trait::async_trait]
impl ReportRepository for PostgresReportRepository {
    async fn insert(&self, draft: ReportDraft) -> Result<Report, StoreError> {
        let d = &draft.details;
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO reports (
                date_submitted, reporter_id, incident_date, incident_time, incident_location,
                involved_persons, description, evidence_description, witnesses, status, last_updated
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id
            "#,
        )
        .bind(draft.date_submitted)
        .bind(draft.reporter_id.get())
        .bind(d.incident_date)
        .bind(d.incident_time)
        .bind(&d.incident_location)
        .bind(&d.involved_persons)
        .bind(&d.description)
        .bind(&d.evidence_description)
        .bind(&d.witnesses)
        .bind(draft.status.as_str())
        .bind(draft.last_updated)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_report", e))?;

        Ok(draft.into_report(ReportId::new(id)))
    }

    async fn get(&self, id: ReportId) -> Result<Option<Report>, StoreError> {
        let mut builder = select();
        builder.push(" AND id = ").push_bind(id.get());
        Ok(self.fetch("get_report", builder).await?.into_iter().next())
    }

    async fn update(&self, report: &Report) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE reports SET
                incident_date = $2, incident_time = $3, incident_location = $4,
                involved_persons = $5, description = $6, evidence_description = $7,
                witnesses = $8, status = $9, assigned_to = $10, last_updated = $11, solution = $12
            WHERE id = $1
            "#,
        )
        .bind(report.id.get())
        .bind(report.incident_date)
        .bind(report.incident_time)
        .bind(&report.incident_location)
        .bind(&report.involved_persons)
        .bind(&report.description)
        .bind(&report.evidence_description)
        .bind(&report.witnesses)
        .bind(report.status.as_str())
        .bind(report.assigned_to.map(|u| u.get()))
        .bind(report.last_updated)
        .bind(&report.solution)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_report", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: ReportId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM reports WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_report", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_all(&self) -> Result<Vec<Report>, StoreError> {
        self.fetch("list_reports", select()).await
    }

    async fn list_assigned_to(&self, user: UserId) -> Result<Vec<Report>, StoreError> {
        let mut builder = select();
        builder.push(" AND assigned_to = ").push_bind(user.get());
        self.fetch("list_assigned_reports", builder).await
    }

    async fn find(&self, filter: &ReportFilter) -> Result<Vec<Report>, StoreError> {
        let mut builder = select();
        push_filter(&mut builder, filter);
        self.fetch("filter_reports", builder).await
    }
}
