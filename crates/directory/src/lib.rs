//! `reportdesk-directory` — user accounts and access groups.
//!
//! - `user.rs` / `group.rs`: records and their explicit merge rules
//! - `repository.rs`: storage contracts implemented in `reportdesk-infra`
//! - `service.rs`: the credential store operations (`UserDirectory`)
//! - `registry.rs`: the access group registry (`AccessGroupRegistry`)

pub mod group;
pub mod registry;
pub mod repository;
pub mod service;
pub mod user;

pub use group::{AccessGroup, GroupDraft};
pub use registry::AccessGroupRegistry;
pub use repository::{AccessGroupRepository, UserRepository};
pub use service::UserDirectory;
pub use user::{Gender, NewUser, User, UserDraft, UserPatch, UserProfile};
