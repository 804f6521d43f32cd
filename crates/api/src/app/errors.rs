use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use inkwell_auth::{AuthError, FailureClass, StoreError};
use inkwell_core::DomainError;
use inkwell_infra::InfraError;

/// Everything a handler can fail with.
///
/// Auth and internal failures render generic bodies; the detail is logged,
/// never sent.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }
}

impl From<InfraError> for ApiError {
    fn from(value: InfraError) -> Self {
        match value {
            InfraError::Domain(e) => Self::Domain(e),
            InfraError::Store(e) => Self::Store(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Auth(AuthError::InvalidCredentials) => {
                json_error(StatusCode::UNAUTHORIZED, "invalid credentials")
            }
            ApiError::Auth(e) => match e.class() {
                FailureClass::Authentication => json_error(StatusCode::UNAUTHORIZED, "unauthorized"),
                FailureClass::Authorization => json_error(StatusCode::FORBIDDEN, "forbidden"),
                FailureClass::Internal => {
                    tracing::error!(error = %e, "auth internal failure");
                    internal_error()
                }
            },
            ApiError::Domain(e) => match e {
                DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, msg),
                DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, msg),
                DomainError::NotFound(what) => json_error(StatusCode::NOT_FOUND, format!("{what} not found")),
                DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, msg),
            },
            ApiError::Store(e) => {
                tracing::error!(error = %e, "store failure");
                internal_error()
            }
            ApiError::BadRequest(msg) => json_error(StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal failure");
                internal_error()
            }
        }
    }
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, axum::Json(json!({ "error": message.into() }))).into_response()
}

fn internal_error() -> Response {
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
}
