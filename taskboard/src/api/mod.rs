//! Client side of the task REST API.
//!
//! Defines the [`TaskApi`] trait the board talks to. Implementations:
//! - [`http::HttpTaskApi`]: `reqwest` client for a running server
//! - [`memory::InMemoryTaskApi`]: in-process store with failure injection, for tests

pub mod http;
pub mod memory;

use std::future::Future;

use taskboard_proto::{NewTask, SessionInfo, Task, TaskId, TaskPatch};

/// Errors surfaced by a [`TaskApi`] call.
///
/// Carries only the message text so it can be cloned into UI events.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The server rejected the request body (400).
    #[error("{0}")]
    Validation(String),

    /// The bearer token is missing, invalid or expired (401).
    #[error("not authenticated: {0}")]
    Authentication(String),

    /// The addressed task does not exist (404).
    #[error("{0}")]
    NotFound(String),

    /// The request conflicts with the stored state (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The server could not be reached or did not answer in time.
    #[error("network error: {0}")]
    Network(String),

    /// Any other non-success response.
    #[error("server error {status}: {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Message from the error body, or the status reason.
        message: String,
    },
}

impl ApiError {
    /// Maps a non-success HTTP status and its message to an error.
    #[must_use]
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            400 | 422 => Self::Validation(message),
            401 | 403 => Self::Authentication(message),
            404 => Self::NotFound(message),
            409 => Self::Conflict(message),
            _ => Self::Server { status, message },
        }
    }
}

/// Async access to the task collection.
///
/// Every method corresponds to one REST call. Implementations must be
/// cheap to clone so requests can be moved onto background tasks.
pub trait TaskApi: Clone + Send + Sync + 'static {
    /// Validates the session (`GET /protected`).
    fn session(&self) -> impl Future<Output = Result<SessionInfo, ApiError>> + Send;

    /// Fetches all tasks ordered by id.
    fn list(&self) -> impl Future<Output = Result<Vec<Task>, ApiError>> + Send;

    /// Fetches one task.
    fn get(&self, id: TaskId) -> impl Future<Output = Result<Task, ApiError>> + Send;

    /// Creates a task and returns it with its assigned id.
    fn create(&self, task: NewTask) -> impl Future<Output = Result<Task, ApiError>> + Send;

    /// Applies a partial update and returns the stored task.
    fn update(
        &self,
        id: TaskId,
        patch: TaskPatch,
    ) -> impl Future<Output = Result<Task, ApiError>> + Send;

    /// Deletes a task.
    fn delete(&self, id: TaskId) -> impl Future<Output = Result<(), ApiError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert!(matches!(
            ApiError::from_status(400, "bad".into()),
            ApiError::Validation(_)
        ));
        assert!(matches!(
            ApiError::from_status(401, "no".into()),
            ApiError::Authentication(_)
        ));
        assert!(matches!(
            ApiError::from_status(404, "gone".into()),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from_status(409, "dup".into()),
            ApiError::Conflict(_)
        ));
        assert_eq!(
            ApiError::from_status(503, "down".into()),
            ApiError::Server {
                status: 503,
                message: "down".into()
            }
        );
    }

    #[test]
    fn not_found_displays_server_message() {
        let err = ApiError::from_status(404, "Task with ID 9999 not found".into());
        assert_eq!(err.to_string(), "Task with ID 9999 not found");
    }
}
