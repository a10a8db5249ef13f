use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use reportdesk_auth::{bearer_token, Caller};

use crate::app::services::AppServices;

/// Authentication gate.
///
/// Never rejects: a valid bearer token for an active user binds a [`Caller`]
/// into the request extensions, anything else lets the request through
/// unauthenticated. Protected handlers refuse unauthenticated requests
/// themselves via [`crate::context::Authenticated`].
pub async fn authenticate(
    State(services): State<Arc<AppServices>>,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(caller) = resolve_caller(&services, req.headers()).await {
        req.extensions_mut().insert(caller);
    }
    next.run(req).await
}

async fn resolve_caller(services: &AppServices, headers: &HeaderMap) -> Option<Caller> {
    let value = headers.get(header::AUTHORIZATION)?;
    let Ok(value) = value.to_str() else {
        tracing::warn!(reason = "non-ascii authorization header", "request left unauthenticated");
        return None;
    };
    let Some(token) = bearer_token(value) else {
        tracing::warn!(reason = "not a bearer token", "request left unauthenticated");
        return None;
    };

    let claims = match services.tokens.validate_at(token, services.clock.now()) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::warn!(reason = %e, expired = e.is_expired(), "request left unauthenticated");
            return None;
        }
    };

    let user = match services.directory.find_by_username(&claims.sub).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::warn!(username = %claims.sub, reason = "unknown user", "request left unauthenticated");
            return None;
        }
        Err(e) => {
            tracing::warn!(username = %claims.sub, error = %e, "request left unauthenticated");
            return None;
        }
    };
    // The username may have been renamed and reused since the token was issued.
    if claims.user_id != Some(user.id) {
        tracing::warn!(
            username = %claims.sub,
            token_user_id = ?claims.user_id,
            user_id = %user.id,
            reason = "token user id does not match the account",
            "request left unauthenticated"
        );
        return None;
    }
    if user.is_fired {
        tracing::warn!(user_id = %user.id, reason = "user is fired", "request left unauthenticated");
        return None;
    }

    let permissions = match services.directory.effective_permissions(&user).await {
        Ok(permissions) => permissions,
        Err(e) => {
            tracing::warn!(user_id = %user.id, error = %e, "request left unauthenticated");
            return None;
        }
    };

    Some(Caller::new(Some(user.id), user.username, permissions))
}
