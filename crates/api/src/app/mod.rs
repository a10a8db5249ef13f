//! Router assembly.
//!
//! - `services.rs`: one instance of every service, shared by handlers
//! - `routes/`: handlers, one file per resource
//! - `dto.rs`: request/response shapes and extraction helpers
//! - `errors.rs`: the response envelope and error mapping

use std::sync::Arc;

use axum::{body::Body, http::Request, routing::get, Extension, Router};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use reportdesk_infra::config::AppConfig;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build services from `config` and the router on top of them.
pub async fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let services = Arc::new(services::AppServices::from_config(config).await?);
    Ok(build_router(services))
}

/// The full HTTP router over already-built services.
pub fn build_router(services: Arc<services::AppServices>) -> Router {
    let trace = TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
        tracing::info_span!(
            "http",
            method = %req.method(),
            path = %req.uri().path(),
            request_id = %Uuid::now_v7(),
        )
    });

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api", routes::router())
        .layer(
            ServiceBuilder::new()
                .layer(trace)
                .layer(CatchPanicLayer::custom(errors::panic_response))
                .layer(axum::middleware::from_fn_with_state(
                    services.clone(),
                    middleware::authenticate,
                ))
                .layer(Extension(services)),
        )
}
