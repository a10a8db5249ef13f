//! In-memory repositories.
//!
//! Default backend for development and the backend every test runs against.
//! Uniqueness rules are enforced under the write lock, so concurrent inserts
//! of the same username or group name cannot both succeed.

mod groups;
mod reports;
mod users;

use std::sync::atomic::{AtomicI64, Ordering};

use reportdesk_core::StoreError;

pub use groups::InMemoryAccessGroupRepository;
pub use reports::InMemoryReportRepository;
pub use users::InMemoryUserRepository;

/// Monotonic id source starting at 1.
#[derive(Debug)]
struct Sequence(AtomicI64);

impl Sequence {
    fn new() -> Self {
        Self(AtomicI64::new(1))
    }

    fn next(&self) -> i64 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> StoreError {
    StoreError::backend("lock poisoned")
}
