use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    response::Response,
    routing::{delete, get, post, put},
    Json, Router,
};

use reportdesk_auth::Permission;
use reportdesk_core::UserId;
use reportdesk_directory::{NewUser, UserPatch};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::Authenticated;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users))
        .route("/:id", get(get_user))
        .route("/group/:group_name", get(users_in_group))
        .route("/add", post(add_user))
        .route("/update/:id", put(update_user))
        .route("/delete/:id", delete(delete_user))
        .route("/add-to-group", post(add_to_group))
        .route("/remove-from-group", post(remove_from_group))
}

pub async fn list_users(
    Authenticated(caller): Authenticated,
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Response, Response> {
    authz::require(&caller, Permission::UpdateUsers)?;
    let users = services
        .directory
        .list_users()
        .await
        .map_err(errors::domain_error_to_response)?;
    Ok(errors::ok("Users retrieved successfully", dto::users_to_views(users)))
}

pub async fn get_user(
    Authenticated(caller): Authenticated,
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, Response> {
    authz::require(&caller, Permission::UpdateUsers)?;
    let id: UserId = dto::parse_id(&id)?;
    let user = services
        .directory
        .get_user(id)
        .await
        .map_err(errors::domain_error_to_response)?;
    Ok(errors::ok("User retrieved successfully", dto::UserView::from(user)))
}

pub async fn users_in_group(
    Authenticated(caller): Authenticated,
    Extension(services): Extension<Arc<AppServices>>,
    Path(group_name): Path<String>,
) -> Result<Response, Response> {
    authz::require(&caller, Permission::ManageUserGroups)?;
    let users = services
        .directory
        .users_in_group(&group_name)
        .await
        .map_err(errors::domain_error_to_response)?;
    Ok(errors::ok("Users retrieved successfully", dto::users_to_views(users)))
}

pub async fn add_user(
    Authenticated(caller): Authenticated,
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<NewUser>, JsonRejection>,
) -> Result<Response, Response> {
    authz::require(&caller, Permission::AddUsers)?;
    let new = dto::json_body(body)?;
    let user = services
        .directory
        .add_user(new)
        .await
        .map_err(errors::domain_error_to_response)?;
    Ok(errors::created("User added successfully", dto::UserView::from(user)))
}

pub async fn update_user(
    Authenticated(caller): Authenticated,
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<UserPatch>, JsonRejection>,
) -> Result<Response, Response> {
    authz::require(&caller, Permission::UpdateUsers)?;
    let id: UserId = dto::parse_id(&id)?;
    let patch = dto::json_body(body)?;
    let user = services
        .directory
        .update_user(id, patch)
        .await
        .map_err(errors::domain_error_to_response)?;
    Ok(errors::ok("User updated successfully", dto::UserView::from(user)))
}

pub async fn delete_user(
    Authenticated(caller): Authenticated,
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, Response> {
    authz::require(&caller, Permission::DeleteUsers)?;
    let id: UserId = dto::parse_id(&id)?;
    services
        .directory
        .delete_user(id)
        .await
        .map_err(errors::domain_error_to_response)?;
    Ok(errors::ok_without_data("User deleted successfully"))
}

pub async fn add_to_group(
    Authenticated(caller): Authenticated,
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::MembershipRequest>, JsonRejection>,
) -> Result<Response, Response> {
    authz::require(&caller, Permission::ManageUserGroups)?;
    let body = dto::json_body(body)?;
    let user = services
        .directory
        .add_to_group(body.user_id, body.group_id)
        .await
        .map_err(errors::domain_error_to_response)?;
    Ok(errors::ok("User added to group successfully", dto::UserView::from(user)))
}

pub async fn remove_from_group(
    Authenticated(caller): Authenticated,
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::MembershipRequest>, JsonRejection>,
) -> Result<Response, Response> {
    authz::require(&caller, Permission::ManageUserGroups)?;
    let body = dto::json_body(body)?;
    let user = services
        .directory
        .remove_from_group(body.user_id, body.group_id)
        .await
        .map_err(errors::domain_error_to_response)?;
    Ok(errors::ok("User removed from group successfully", dto::UserView::from(user)))
}
