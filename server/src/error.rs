//! Maps the task error taxonomy onto HTTP responses.
//!
//! Backend failures are logged here and replaced by a generic message; their
//! detail never reaches the client.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use taskdeck_core::{TaskError, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ValidationError>,
}

#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: message.into(),
                details: None,
            },
        }
    }

    pub fn validation(details: ValidationError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                error: "Validation error".to_string(),
                details: Some(details),
            },
        }
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Task not found")
    }

    pub fn conflict() -> Self {
        Self::new(StatusCode::CONFLICT, "Task already exists")
    }

    /// Classifies `error`; `fallback` is the client-facing message for
    /// unclassified failures.
    pub fn from_task(error: TaskError, fallback: &str) -> Self {
        match error {
            TaskError::Validation(details) => Self::validation(details),
            TaskError::NotFound(id) => {
                tracing::debug!(task_id = %id, "task not found");
                Self::not_found()
            }
            TaskError::Conflict(id) => {
                tracing::warn!(task_id = %id, "task id already taken");
                Self::conflict()
            }
            TaskError::Backend(source) => {
                tracing::error!(error = %format!("{source:#}"), "{fallback}");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, fallback)
            }
        }
    }
}

/// Only bodies that are not JSON at all land here; decoder text stays in the
/// log.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(reason = %rejection.body_text(), "rejected request body");
        let message = match rejection {
            JsonRejection::MissingJsonContentType(_) => "Expected an application/json body",
            JsonRejection::JsonSyntaxError(_) => "Malformed JSON",
            _ => "Invalid request body",
        };
        Self::validation(ValidationError::single("body", message))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskdeck_core::TaskId;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                TaskError::Validation(ValidationError::single("title", "Title is required")),
                StatusCode::BAD_REQUEST,
            ),
            (TaskError::NotFound(TaskId::from("x")), StatusCode::NOT_FOUND),
            (TaskError::Conflict(TaskId::from("x")), StatusCode::CONFLICT),
            (
                TaskError::Backend(anyhow::anyhow!("disk full")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, expected) in cases {
            assert_eq!(ApiError::from_task(error, "Failed").status, expected);
        }
    }

    #[test]
    fn test_backend_detail_is_hidden() {
        let error = ApiError::from_task(
            TaskError::Backend(anyhow::anyhow!("password=hunter2")),
            "Failed to fetch tasks",
        );
        assert_eq!(error.body.error, "Failed to fetch tasks");
        assert_eq!(error.body.details, None);
    }
}
