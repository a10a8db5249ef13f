use axum::Router;

pub mod access_groups;
pub mod auth;
pub mod reports;
pub mod system;
pub mod users;

/// Router for everything under `/api`.
///
/// Routes are not gated here: each handler that needs a caller asks for
/// [`crate::context::Authenticated`].
pub fn router() -> Router {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/access-groups", access_groups::router())
        .nest("/reports", reports::router())
}
