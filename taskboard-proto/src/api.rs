//! JSON bodies exchanged by the REST API besides the task itself.

use serde::{Deserialize, Serialize};

/// Error code for malformed or missing request fields (HTTP 400).
pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
/// Error code for a missing, invalid or expired bearer token (HTTP 401).
pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
/// Error code for an unknown task id (HTTP 404).
pub const NOT_FOUND: &str = "NOT_FOUND";
/// Error code for a duplicate task id (HTTP 409).
pub const CONFLICT: &str = "CONFLICT";
/// Error code for failures the client cannot act on (HTTP 500).
pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";

/// Error body returned with every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error code (one of the constants in this module).
    pub code: String,
    /// Human-readable message, safe to show to the user.
    pub message: String,
    /// Per-field details for validation failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl ErrorBody {
    /// Creates an error body without field details.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }
}

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the field as it appears on the wire.
    pub field: String,
    /// Why the value was rejected.
    pub message: String,
}

impl FieldError {
    /// Creates a new field error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Response of `GET /protected`: who the bearer token belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    /// The token's `sub` claim.
    pub subject: String,
    /// The token's `exp` claim, seconds since the Unix epoch.
    pub expires_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_omits_empty_details() {
        let body = ErrorBody::new(NOT_FOUND, "Task with ID 9 not found");
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(
            json,
            r#"{"code":"NOT_FOUND","message":"Task with ID 9 not found"}"#
        );
    }

    #[test]
    fn error_body_tolerates_missing_details() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"code":"UNAUTHORIZED","message":"missing bearer token"}"#)
                .unwrap();
        assert_eq!(body.code, UNAUTHORIZED);
        assert!(body.details.is_none());
    }

    #[test]
    fn session_info_uses_camel_case() {
        let info = SessionInfo {
            subject: "user-1".to_string(),
            expires_at: 1_700_000_000,
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["expiresAt"], 1_700_000_000);
        assert_eq!(json["subject"], "user-1");
    }
}
