//! The response envelope and the single place domain errors become HTTP.

use std::any::Any;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use reportdesk_core::DomainError;

pub const UNAUTHORIZED_MESSAGE: &str = "Error: Unauthorized";
const INTERNAL_MESSAGE: &str = "Internal server error";

/// Every JSON response body: `{ data, message, status }`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
    pub message: String,
    pub status: u16,
}

pub fn respond<T: Serialize>(status: StatusCode, message: impl Into<String>, data: T) -> Response {
    let body = Envelope {
        data: Some(data),
        message: message.into(),
        status: status.as_u16(),
    };
    (status, Json(body)).into_response()
}

pub fn ok<T: Serialize>(message: impl Into<String>, data: T) -> Response {
    respond(StatusCode::OK, message, data)
}

pub fn created<T: Serialize>(message: impl Into<String>, data: T) -> Response {
    respond(StatusCode::CREATED, message, data)
}

/// `200` with `data: null`.
pub fn ok_without_data(message: impl Into<String>) -> Response {
    json_error(StatusCode::OK, message)
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    let body: Envelope<()> = Envelope {
        data: None,
        message: message.into(),
        status: status.as_u16(),
    };
    (status, Json(body)).into_response()
}

/// The fixed body for a missing, invalid or expired token.
pub fn unauthorized() -> Response {
    json_error(StatusCode::UNAUTHORIZED, UNAUTHORIZED_MESSAGE)
}

pub fn bad_request(message: impl Into<String>) -> Response {
    json_error(StatusCode::BAD_REQUEST, message)
}

pub fn domain_error_to_response(err: DomainError) -> Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, msg),
        DomainError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, msg),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, msg),
        DomainError::Unauthorized(msg) => json_error(StatusCode::UNAUTHORIZED, msg),
        DomainError::Forbidden(msg) => json_error(StatusCode::FORBIDDEN, msg),
        DomainError::Internal(msg) => {
            tracing::error!(error = %msg, "request failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE)
        }
    }
}

/// `CatchPanicLayer` handler: log the payload, answer with the generic 500.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("<non-string panic payload>");
    tracing::error!(panic = detail, "handler panicked");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE)
}
