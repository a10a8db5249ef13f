//! Report visibility.
//!
//! A caller holding `AccessToAllReports` may act on any report. Everyone else
//! only ever sees or touches reports assigned to them. The rules here are pure
//! functions of the caller and the report so every read and write path shares
//! them.

use reportdesk_auth::{AuthzError, Caller};
use reportdesk_core::UserId;

use crate::{Report, ReportFilter};

/// Which reports a listing may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingScope {
    All,
    AssignedTo(UserId),
}

/// Ownership check for single-report reads and writes.
pub fn ensure_report_access(caller: &Caller, report: &Report) -> Result<(), AuthzError> {
    if caller.sees_all_reports() {
        return Ok(());
    }
    match caller.user_id() {
        Some(id) if report.assigned_to == Some(id) => Ok(()),
        _ => Err(AuthzError::NotOwner),
    }
}

/// The listing scope for `caller`. Without a resolvable id there is nothing the
/// caller may see.
pub fn listing_scope(caller: &Caller) -> Result<ListingScope, AuthzError> {
    if caller.sees_all_reports() {
        return Ok(ListingScope::All);
    }
    caller
        .user_id()
        .map(ListingScope::AssignedTo)
        .ok_or(AuthzError::NotOwner)
}

/// Narrow a client-supplied filter to what `caller` may see.
///
/// Without the bypass permission both `reporterId` and `assignedTo` are
/// overwritten with the caller's own id, whatever the client sent.
pub fn scope_filter(caller: &Caller, mut filter: ReportFilter) -> Result<ReportFilter, AuthzError> {
    match listing_scope(caller)? {
        ListingScope::All => Ok(filter),
        ListingScope::AssignedTo(id) => {
            filter.reporter_id = Some(id);
            filter.assigned_to = Some(id);
            Ok(filter)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NewReport, ReportDraft, ReportStatus};
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;
    use reportdesk_auth::{Permission, PermissionSet};
    use reportdesk_core::ReportId;

    fn caller(id: Option<i64>, perms: &[Permission]) -> Caller {
        Caller::new(id.map(UserId::new), "someone", perms.iter().copied().collect::<PermissionSet>())
    }

    fn report_assigned_to(assignee: Option<i64>) -> Report {
        let t = Utc.with_ymd_and_hms(2024, 5, 2, 12, 0, 0).unwrap();
        let mut r = ReportDraft {
            date_submitted: t,
            reporter_id: UserId::new(1),
            details: NewReport::default(),
            status: ReportStatus::New,
            last_updated: t,
        }
        .into_report(ReportId::new(10));
        r.assigned_to = assignee.map(UserId::new);
        r
    }

    #[test]
    fn assignee_may_access() {
        let c = caller(Some(7), &[Permission::ViewReport]);
        assert_eq!(ensure_report_access(&c, &report_assigned_to(Some(7))), Ok(()));
    }

    #[test]
    fn someone_else_is_refused() {
        let c = caller(Some(7), &[Permission::ViewReport]);
        assert_eq!(
            ensure_report_access(&c, &report_assigned_to(Some(8))),
            Err(AuthzError::NotOwner)
        );
        assert_eq!(
            ensure_report_access(&c, &report_assigned_to(None)),
            Err(AuthzError::NotOwner)
        );
    }

    #[test]
    fn reporter_alone_is_not_an_owner() {
        let c = caller(Some(1), &[Permission::ViewReport]);
        assert!(ensure_report_access(&c, &report_assigned_to(Some(8))).is_err());
    }

    #[test]
    fn bypass_sees_everything() {
        let c = caller(None, &[Permission::AccessToAllReports]);
        assert_eq!(ensure_report_access(&c, &report_assigned_to(None)), Ok(()));
        assert_eq!(listing_scope(&c), Ok(ListingScope::All));
    }

    #[test]
    fn unresolved_caller_sees_nothing() {
        let c = caller(None, &[Permission::ViewReport]);
        assert_eq!(listing_scope(&c), Err(AuthzError::NotOwner));
        assert!(scope_filter(&c, ReportFilter::default()).is_err());
    }

    #[test]
    fn filter_is_forced_to_the_caller() {
        let c = caller(Some(7), &[Permission::ViewReport]);
        let requested = ReportFilter {
            reporter_id: Some(UserId::new(99)),
            assigned_to: Some(UserId::new(98)),
            incident_location: Some("hall".into()),
            ..Default::default()
        };

        let scoped = scope_filter(&c, requested).unwrap();
        assert_eq!(scoped.reporter_id, Some(UserId::new(7)));
        assert_eq!(scoped.assigned_to, Some(UserId::new(7)));
        assert_eq!(scoped.incident_location.as_deref(), Some("hall"));
    }

    #[test]
    fn bypass_filter_is_untouched() {
        let c = caller(Some(7), &[Permission::ViewReport, Permission::AccessToAllReports]);
        let requested = ReportFilter {
            reporter_id: Some(UserId::new(99)),
            ..Default::default()
        };
        assert_eq!(scope_filter(&c, requested.clone()).unwrap(), requested);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: without the bypass, a scoped filter never admits a report
        /// assigned to someone else.
        #[test]
        fn scoped_filter_never_leaks(
            me in 1i64..50,
            assignee in proptest::option::of(1i64..50),
            reporter in proptest::option::of(1i64..50),
            asked_assignee in proptest::option::of(1i64..50),
        ) {
            let c = caller(Some(me), &[Permission::ViewReport]);
            let mut r = report_assigned_to(assignee);
            if let Some(reporter) = reporter {
                r.reporter_id = UserId::new(reporter);
            }

            let scoped = scope_filter(&c, ReportFilter {
                assigned_to: asked_assignee.map(UserId::new),
                ..Default::default()
            }).unwrap();

            if scoped.matches(&r) {
                prop_assert_eq!(r.assigned_to, Some(UserId::new(me)));
                prop_assert!(ensure_report_access(&c, &r).is_ok());
            }
        }
    }
}
