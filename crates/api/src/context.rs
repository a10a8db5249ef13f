use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::Response;

use reportdesk_auth::Caller;

use crate::app::errors;

/// The caller bound to this request by the authentication gate.
///
/// Extraction fails with the fixed 401 envelope when the gate did not bind
/// anyone (no token, bad token, unknown or fired user).
#[derive(Debug, Clone)]
pub struct Authenticated(pub Caller);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Caller>()
            .cloned()
            .map(Authenticated)
            .ok_or_else(errors::unauthorized)
    }
}
