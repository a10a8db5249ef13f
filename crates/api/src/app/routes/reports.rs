use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection, StringRejection},
        Extension, Path, Query,
    },
    response::Response,
    routing::{get, patch},
    Json, Router,
};

use reportdesk_core::ReportId;
use reportdesk_reports::{NewReport, ReportFilter, ReportPatch, ReportStatus};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::Authenticated;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_reports).post(create_report))
        .route("/filter", get(filter_reports))
        .route("/:id", get(get_report).put(update_report).delete(delete_report))
        .route("/:id/solution", patch(update_solution))
        .route("/:id/status", patch(update_status))
        .route("/:id/assign", patch(assign_report))
}

fn report_id(raw: &str) -> Result<ReportId, Response> {
    dto::parse_id(raw)
}

pub async fn create_report(
    Authenticated(caller): Authenticated,
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<NewReport>, JsonRejection>,
) -> Result<Response, Response> {
    let new = dto::json_body(body)?;
    let report = services
        .reports
        .create(&caller, new)
        .await
        .map_err(errors::domain_error_to_response)?;
    Ok(errors::created("Report created successfully", report))
}

pub async fn list_reports(
    Authenticated(caller): Authenticated,
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Response, Response> {
    let reports = services
        .reports
        .list(&caller)
        .await
        .map_err(errors::domain_error_to_response)?;
    Ok(errors::ok("Reports retrieved successfully", reports))
}

pub async fn filter_reports(
    Authenticated(caller): Authenticated,
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<ReportFilter>, QueryRejection>,
) -> Result<Response, Response> {
    let filter = dto::query_params(query)?;
    let reports = services
        .reports
        .filter(&caller, filter)
        .await
        .map_err(errors::domain_error_to_response)?;
    Ok(errors::ok("Reports filtered successfully", reports))
}

pub async fn get_report(
    Authenticated(caller): Authenticated,
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, Response> {
    let id = report_id(&id)?;
    let report = services
        .reports
        .get(&caller, id)
        .await
        .map_err(errors::domain_error_to_response)?;
    Ok(errors::ok("Report retrieved successfully", report))
}

pub async fn update_report(
    Authenticated(caller): Authenticated,
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<ReportPatch>, JsonRejection>,
) -> Result<Response, Response> {
    let id = report_id(&id)?;
    let patch = dto::json_body(body)?;
    let report = services
        .reports
        .update(&caller, id, patch)
        .await
        .map_err(errors::domain_error_to_response)?;
    Ok(errors::ok("Report updated successfully", report))
}

pub async fn delete_report(
    Authenticated(caller): Authenticated,
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, Response> {
    let id = report_id(&id)?;
    services
        .reports
        .delete(&caller, id)
        .await
        .map_err(errors::domain_error_to_response)?;
    Ok(errors::ok_without_data("Report deleted successfully"))
}

/// The body is the solution text itself, not JSON.
pub async fn update_solution(
    Authenticated(caller): Authenticated,
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<String, StringRejection>,
) -> Result<Response, Response> {
    let id = report_id(&id)?;
    let solution = body.map_err(|rejection| errors::bad_request(rejection.body_text()))?;
    let report = services
        .reports
        .update_solution(&caller, id, solution)
        .await
        .map_err(errors::domain_error_to_response)?;
    Ok(errors::ok("Report solution updated successfully", report))
}

/// The body is a bare JSON string: `"CLOSED"`.
pub async fn update_status(
    Authenticated(caller): Authenticated,
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<ReportStatus>, JsonRejection>,
) -> Result<Response, Response> {
    let id = report_id(&id)?;
    let status = dto::json_body(body)?;
    let report = services
        .reports
        .update_status(&caller, id, status)
        .await
        .map_err(errors::domain_error_to_response)?;
    Ok(errors::ok("Report status updated successfully", report))
}

pub async fn assign_report(
    Authenticated(caller): Authenticated,
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    query: Result<Query<dto::AssignQuery>, QueryRejection>,
) -> Result<Response, Response> {
    let id = report_id(&id)?;
    let assign = dto::query_params(query)?;
    let report = services
        .reports
        .assign(&caller, id, assign.assigned_to)
        .await
        .map_err(errors::domain_error_to_response)?;
    Ok(errors::ok("Report assigned successfully", report))
}
