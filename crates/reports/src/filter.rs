use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use reportdesk_core::UserId;

use crate::{Report, ReportStatus};

/// Search criteria for reports. Every present criterion must hold.
///
/// Text criteria are split on whitespace and each token must appear,
/// case-insensitively, somewhere in the field. The incident-date range is only
/// applied when both bounds are given; it is inclusive on both ends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilter {
    pub reporter_id: Option<UserId>,
    pub start_incident_date: Option<NaiveDate>,
    pub end_incident_date: Option<NaiveDate>,
    pub incident_location: Option<String>,
    pub involved_persons: Option<String>,
    pub status: Option<ReportStatus>,
    pub assigned_to: Option<UserId>,
}

impl ReportFilter {
    /// The inclusive incident-date range, when both bounds are present.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.start_incident_date.zip(self.end_incident_date)
    }

    /// Lowercased search tokens for the location criterion.
    pub fn location_tokens(&self) -> Vec<String> {
        tokens(self.incident_location.as_deref())
    }

    /// Lowercased search tokens for the involved-persons criterion.
    pub fn involved_tokens(&self) -> Vec<String> {
        tokens(self.involved_persons.as_deref())
    }

    pub fn matches(&self, report: &Report) -> bool {
        if let Some(reporter) = self.reporter_id {
            if report.reporter_id != reporter {
                return false;
            }
        }
        if let Some(assignee) = self.assigned_to {
            if report.assigned_to != Some(assignee) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if report.status != status {
                return false;
            }
        }
        if let Some((start, end)) = self.date_range() {
            match report.incident_date {
                Some(d) if start <= d && d <= end => {}
                _ => return false,
            }
        }
        contains_all(report.incident_location.as_deref(), &self.location_tokens())
            && contains_all(report.involved_persons.as_deref(), &self.involved_tokens())
    }
}

fn tokens(search: Option<&str>) -> Vec<String> {
    search
        .map(|s| s.split_whitespace().map(str::to_lowercase).collect())
        .unwrap_or_default()
}

fn contains_all(field: Option<&str>, tokens: &[String]) -> bool {
    if tokens.is_empty() {
        return true;
    }
    let Some(field) = field else {
        return false;
    };
    let haystack = field.to_lowercase();
    tokens.iter().all(|t| haystack.contains(t.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NewReport, ReportDraft};
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;
    use reportdesk_core::ReportId;

    fn report(location: &str, involved: &str, date: (i32, u32, u32)) -> Report {
        let t = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let mut r = ReportDraft {
            date_submitted: t,
            reporter_id: UserId::new(2),
            details: NewReport {
                incident_location: Some(location.into()),
                involved_persons: Some(involved.into()),
                incident_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2),
                ..Default::default()
            },
            status: ReportStatus::New,
            last_updated: t,
        }
        .into_report(ReportId::new(1));
        r.assigned_to = Some(UserId::new(3));
        r
    }

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn location_matches_token_wise_ignoring_case() {
        let r = report("Old City Hall Annex", "", (2024, 1, 15));
        let by_location = |s: &str| ReportFilter {
            incident_location: Some(s.into()),
            ..Default::default()
        };

        assert!(by_location("city hall").matches(&r));
        assert!(by_location("HALL   old").matches(&r));
        assert!(by_location("annex").matches(&r));
        assert!(!by_location("city square").matches(&r));
    }

    #[test]
    fn tokens_need_not_be_adjacent() {
        let r = report("Old City Hall Annex", "", (2024, 1, 15));
        let f = ReportFilter {
            incident_location: Some("old annex".into()),
            ..Default::default()
        };
        assert!(f.matches(&r));
    }

    #[test]
    fn involved_persons_uses_the_same_matching() {
        let r = report("Depot", "Deputy Mayor Ivanova, two contractors", (2024, 1, 15));
        let f = ReportFilter {
            involved_persons: Some("ivanova mayor".into()),
            ..Default::default()
        };
        assert!(f.matches(&r));

        let f = ReportFilter {
            involved_persons: Some("ivanova treasurer".into()),
            ..Default::default()
        };
        assert!(!f.matches(&r));
    }

    #[test]
    fn blank_search_text_is_no_criterion() {
        let r = report("Depot", "", (2024, 1, 15));
        let f = ReportFilter {
            incident_location: Some("   ".into()),
            ..Default::default()
        };
        assert!(f.matches(&r));
    }

    #[test]
    fn date_range_is_inclusive() {
        let r = report("Depot", "", (2024, 1, 15));
        let range = |a, b| ReportFilter {
            start_incident_date: a,
            end_incident_date: b,
            ..Default::default()
        };

        assert!(range(date(2024, 1, 15), date(2024, 1, 15)).matches(&r));
        assert!(range(date(2024, 1, 1), date(2024, 1, 31)).matches(&r));
        assert!(!range(date(2024, 1, 16), date(2024, 2, 1)).matches(&r));
    }

    #[test]
    fn single_date_bound_is_ignored() {
        let r = report("Depot", "", (2024, 1, 15));
        let f = ReportFilter {
            start_incident_date: date(2025, 1, 1),
            ..Default::default()
        };
        assert_eq!(f.date_range(), None);
        assert!(f.matches(&r));
    }

    #[test]
    fn criteria_are_anded() {
        let r = report("Old City Hall Annex", "", (2024, 1, 15));
        let f = ReportFilter {
            incident_location: Some("city".into()),
            status: Some(ReportStatus::Closed),
            ..Default::default()
        };
        assert!(!f.matches(&r));

        let f = ReportFilter {
            incident_location: Some("city".into()),
            reporter_id: Some(UserId::new(2)),
            assigned_to: Some(UserId::new(3)),
            status: Some(ReportStatus::New),
            ..Default::default()
        };
        assert!(f.matches(&r));
    }

    #[test]
    fn deserializes_from_camel_case_query_fields() {
        let f: ReportFilter = serde_json::from_value(serde_json::json!({
            "reporterId": 4,
            "startIncidentDate": "2024-01-01",
            "endIncidentDate": "2024-12-31",
            "incidentLocation": "city hall",
            "status": "IN_PROGRESS"
        }))
        .unwrap();
        assert_eq!(f.reporter_id, Some(UserId::new(4)));
        assert_eq!(f.date_range(), date(2024, 1, 1).zip(date(2024, 12, 31)));
        assert_eq!(f.location_tokens(), vec!["city", "hall"]);
        assert_eq!(f.status, Some(ReportStatus::InProgress));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: any subset of a field's words, in any case, matches it.
        #[test]
        fn any_subset_of_words_matches(
            words in proptest::collection::vec("[A-Za-z]{1,8}", 1..6),
            mask in proptest::collection::vec(any::<bool>(), 6),
            upper in any::<bool>(),
        ) {
            let location = words.join(" ");
            let r = report(&location, "", (2024, 1, 15));

            let picked: Vec<String> = words
                .iter()
                .zip(mask.iter())
                .filter(|(_, keep)| **keep)
                .map(|(w, _)| if upper { w.to_uppercase() } else { w.to_lowercase() })
                .collect();

            let f = ReportFilter {
                incident_location: Some(picked.join(" ")),
                ..Default::default()
            };
            prop_assert!(f.matches(&r));
        }

        /// Property: a token absent from the field never matches.
        #[test]
        fn foreign_token_never_matches(words in proptest::collection::vec("[a-m]{1,8}", 1..6)) {
            let r = report(&words.join(" "), "", (2024, 1, 15));
            let f = ReportFilter {
                incident_location: Some(format!("{} zzz", words[0])),
                ..Default::default()
            };
            prop_assert!(!f.matches(&r));
        }
    }
}
