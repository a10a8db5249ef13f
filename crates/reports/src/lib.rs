//! `reportdesk-reports` — incident reports and their workflow.
//!
//! Visibility rules live in `access.rs`; every `ReportService` operation takes
//! the caller explicitly and runs both the permission gate and, where it
//! applies, the ownership filter before touching storage.

pub mod access;
pub mod filter;
pub mod report;
pub mod repository;
pub mod service;

pub use access::{ensure_report_access, listing_scope, scope_filter, ListingScope};
pub use filter::ReportFilter;
pub use report::{NewReport, Report, ReportDraft, ReportPatch, ReportStatus, ReportView};
pub use repository::ReportRepository;
pub use service::ReportService;
