use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    response::Response,
    routing::{get, post, put},
    Json, Router,
};

use reportdesk_auth::{Permission, TokenIdentity};
use reportdesk_core::{DomainError, UserId};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::Authenticated;

pub fn router() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/update-password/:user_id", put(update_password))
        .route("/me", get(me))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::LoginRequest>, JsonRejection>,
) -> Result<Response, Response> {
    let body = dto::json_body(body)?;

    let user = services
        .directory
        .authenticate(&body.username, &body.password)
        .await
        .map_err(errors::domain_error_to_response)?;
    let permissions = services
        .directory
        .effective_permissions(&user)
        .await
        .map_err(errors::domain_error_to_response)?;

    let identity = TokenIdentity {
        username: user.username.clone(),
        user_id: user.id,
        authorities: permissions.names(),
    };
    let token = services
        .tokens
        .issue(&identity, services.clock.now())
        .map_err(|e| errors::domain_error_to_response(DomainError::internal(format!("token issue: {e}"))))?;

    tracing::info!(user_id = %user.id, "login succeeded");
    Ok(errors::ok(
        "Authentication successful",
        dto::LoginResponse {
            token,
            id: user.id,
            username: user.username,
        },
    ))
}

pub async fn register(
    Authenticated(caller): Authenticated,
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::RegisterRequest>, JsonRejection>,
) -> Result<Response, Response> {
    authz::require(&caller, Permission::AddUsers)?;
    let body = dto::json_body(body)?;

    let user = services
        .directory
        .register(&body.username, &body.password)
        .await
        .map_err(errors::domain_error_to_response)?;

    Ok(errors::ok(
        "User registered successfully",
        format!("User registered: {}", user.username),
    ))
}

pub async fn update_password(
    Authenticated(caller): Authenticated,
    Extension(services): Extension<Arc<AppServices>>,
    Path(user_id): Path<String>,
    body: Result<Json<dto::UpdatePasswordRequest>, JsonRejection>,
) -> Result<Response, Response> {
    authz::require(&caller, Permission::UpdateUsers)?;
    let user_id: UserId = dto::parse_id(&user_id)?;
    let body = dto::json_body(body)?;

    services
        .directory
        .update_password(user_id, &body.new_password, &body.confirm_password)
        .await
        .map_err(errors::domain_error_to_response)?;

    Ok(errors::ok_without_data("Password updated successfully"))
}

/// The caller as the gate resolved it.
pub async fn me(Authenticated(caller): Authenticated) -> Response {
    errors::ok(
        "Current user",
        dto::MeResponse {
            id: caller.user_id(),
            username: caller.username().to_string(),
            permissions: caller.permissions().names(),
        },
    )
}
