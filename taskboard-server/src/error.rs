//! HTTP error responses.
//!
//! Every failure leaves the server as a status code plus an
//! [`ErrorBody`] JSON payload.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use taskboard_proto::api::{CONFLICT, INTERNAL_ERROR, NOT_FOUND, UNAUTHORIZED, VALIDATION_ERROR};
use taskboard_proto::{ErrorBody, ValidationError};

use crate::auth::AuthError;
use crate::store::StoreError;

/// An error response: status code and body.
#[derive(Debug, Clone)]
pub struct ApiErrorResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// JSON body.
    pub body: ErrorBody,
}

impl ApiErrorResponse {
    /// Creates an error response.
    #[must_use]
    pub const fn new(status: StatusCode, body: ErrorBody) -> Self {
        Self { status, body }
    }

    /// 400 with a single message.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            ErrorBody::new(VALIDATION_ERROR, message),
        )
    }

    /// 401.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, ErrorBody::new(UNAUTHORIZED, message))
    }

    /// 404.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ErrorBody::new(NOT_FOUND, message))
    }

    /// 409.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, ErrorBody::new(CONFLICT, message))
    }

    /// 500. The message must not leak internals.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorBody::new(INTERNAL_ERROR, message),
        )
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<ValidationError> for ApiErrorResponse {
    fn from(error: ValidationError) -> Self {
        let mut response = Self::bad_request(error.to_string());
        response.body.details = Some(error.fields);
        response
    }
}

impl From<StoreError> for ApiErrorResponse {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(_) => Self::not_found(error.to_string()),
            StoreError::Conflict(_) => Self::conflict(error.to_string()),
            StoreError::ReadSnapshot { .. }
            | StoreError::CorruptSnapshot { .. }
            | StoreError::WriteSnapshot { .. } => {
                tracing::error!(%error, "task store failure");
                Self::internal_error("An internal error occurred")
            }
        }
    }
}

impl From<AuthError> for ApiErrorResponse {
    fn from(error: AuthError) -> Self {
        Self::unauthorized(error.to_string())
    }
}

impl From<JsonRejection> for ApiErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiErrorResponse {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(format!("invalid task id: {}", rejection.body_text()))
    }
}
