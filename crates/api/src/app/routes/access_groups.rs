use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    response::Response,
    routing::get,
    Json, Router,
};

use reportdesk_auth::Permission;
use reportdesk_core::GroupId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::Authenticated;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_groups).post(create_group))
        .route("/:id", get(get_group))
}

pub async fn list_groups(
    Authenticated(caller): Authenticated,
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Response, Response> {
    authz::require(&caller, Permission::ManageUserGroups)?;
    let groups = services
        .registry
        .list_groups()
        .await
        .map_err(errors::domain_error_to_response)?;
    Ok(errors::ok("Access groups retrieved successfully", groups))
}

pub async fn get_group(
    Authenticated(caller): Authenticated,
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, Response> {
    authz::require(&caller, Permission::ManageUserGroups)?;
    let id: GroupId = dto::parse_id(&id)?;
    let group = services
        .registry
        .get_group(id)
        .await
        .map_err(errors::domain_error_to_response)?;
    Ok(errors::ok("Access group retrieved successfully", group))
}

pub async fn create_group(
    Authenticated(caller): Authenticated,
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateGroupRequest>, JsonRejection>,
) -> Result<Response, Response> {
    authz::require(&caller, Permission::ManageUserGroups)?;
    let body = dto::json_body(body)?;
    let group = services
        .registry
        .create_group(&body.name, body.description, body.permissions)
        .await
        .map_err(errors::domain_error_to_response)?;
    Ok(errors::created("Access group created successfully", group))
}
