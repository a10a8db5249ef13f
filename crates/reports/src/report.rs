use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use reportdesk_core::{ReportId, UserId};

/// Report lifecycle. Transitions are not ordered: any status may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    New,
    InProgress,
    Closed,
}

impl ReportStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::New => "NEW",
            ReportStatus::InProgress => "IN_PROGRESS",
            ReportStatus::Closed => "CLOSED",
        }
    }
}

impl core::str::FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(ReportStatus::New),
            "IN_PROGRESS" => Ok(ReportStatus::InProgress),
            "CLOSED" => Ok(ReportStatus::Closed),
            other => Err(format!("unknown report status '{other}'")),
        }
    }
}

impl core::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored incident report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: ReportId,
    pub date_submitted: DateTime<Utc>,
    pub reporter_id: UserId,
    pub incident_date: Option<NaiveDate>,
    pub incident_time: Option<NaiveTime>,
    pub incident_location: Option<String>,
    pub involved_persons: Option<String>,
    pub description: Option<String>,
    pub evidence_description: Option<String>,
    pub witnesses: Option<String>,
    pub status: ReportStatus,
    pub assigned_to: Option<UserId>,
    pub last_updated: DateTime<Utc>,
    pub solution: Option<String>,
}

/// A report that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDraft {
    pub date_submitted: DateTime<Utc>,
    pub reporter_id: UserId,
    pub details: NewReport,
    pub status: ReportStatus,
    pub last_updated: DateTime<Utc>,
}

impl ReportDraft {
    pub fn into_report(self, id: ReportId) -> Report {
        let NewReport {
            incident_date,
            incident_time,
            incident_location,
            involved_persons,
            description,
            evidence_description,
            witnesses,
        } = self.details;

        Report {
            id,
            date_submitted: self.date_submitted,
            reporter_id: self.reporter_id,
            incident_date,
            incident_time,
            incident_location,
            involved_persons,
            description,
            evidence_description,
            witnesses,
            status: self.status,
            assigned_to: None,
            last_updated: self.last_updated,
            solution: None,
        }
    }
}

/// Client-supplied content of a new report.
///
/// Server-owned fields (`id`, `reporterId`, `status`, `assignedTo`,
/// timestamps) are deliberately absent and ignored when sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReport {
    pub incident_date: Option<NaiveDate>,
    pub incident_time: Option<NaiveTime>,
    pub incident_location: Option<String>,
    pub involved_persons: Option<String>,
    pub description: Option<String>,
    pub evidence_description: Option<String>,
    pub witnesses: Option<String>,
}

/// Partial update. `assignedTo` is not part of it: assignment has its own operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPatch {
    pub incident_date: Option<NaiveDate>,
    pub incident_time: Option<NaiveTime>,
    pub incident_location: Option<String>,
    pub involved_persons: Option<String>,
    pub description: Option<String>,
    pub evidence_description: Option<String>,
    pub witnesses: Option<String>,
    pub status: Option<ReportStatus>,
    pub solution: Option<String>,
}

impl ReportPatch {
    pub fn status(status: ReportStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn solution(text: impl Into<String>) -> Self {
        Self {
            solution: Some(text.into()),
            ..Default::default()
        }
    }

    /// Apply every present field onto `report`. Timestamps are left to the caller.
    pub fn apply_to(&self, report: &mut Report) {
        if let Some(v) = self.incident_date {
            report.incident_date = Some(v);
        }
        if let Some(v) = self.incident_time {
            report.incident_time = Some(v);
        }
        if let Some(v) = &self.incident_location {
            report.incident_location = Some(v.clone());
        }
        if let Some(v) = &self.involved_persons {
            report.involved_persons = Some(v.clone());
        }
        if let Some(v) = &self.description {
            report.description = Some(v.clone());
        }
        if let Some(v) = &self.evidence_description {
            report.evidence_description = Some(v.clone());
        }
        if let Some(v) = &self.witnesses {
            report.witnesses = Some(v.clone());
        }
        if let Some(v) = self.status {
            report.status = v;
        }
        if let Some(v) = &self.solution {
            report.solution = Some(v.clone());
        }
    }
}

/// A report as returned to clients, with the assignee's display name resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
    #[serde(flatten)]
    pub report: Report,
    pub assigned_to_full_name: Option<String>,
}
