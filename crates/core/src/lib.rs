//! `reportdesk-core` — shared domain primitives.
//!
//! Identifiers, the error model and the clock abstraction used by every
//! other crate. No infrastructure concerns live here.

pub mod clock;
pub mod error;
pub mod id;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{DomainError, DomainResult, StoreError};
pub use id::{GroupId, ReportId, UserId};
