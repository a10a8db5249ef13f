//! HTTP API: routing, authentication gate and request/response mapping.

pub mod app;
pub mod authz;
pub mod bootstrap;
pub mod context;
pub mod middleware;
