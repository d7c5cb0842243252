//! Schema checks for task payloads.
//!
//! Every violation is collected, so a single response can name all the
//! offending fields at once.

use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::model::{NewTask, TaskPatch, TaskStatus, UserId, TITLE_MAX_CHARS};
use crate::service::dto::{CreateTaskRequest, SetStatusRequest, UpdateTaskRequest};

pub fn validate_create(request: CreateTaskRequest) -> Result<NewTask, ValidationError> {
    let mut errors = ValidationError::new();

    let title = match request.title.as_deref() {
        Some(raw) => check_title(raw, &mut errors),
        None => {
            errors.add("title", "Title is required");
            None
        }
    };

    let user_id = match request.user_id.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(UserId::new(raw)),
        _ => {
            errors.add("user_id", "User ID is required");
            None
        }
    };

    errors.into_result()?;
    match (title, user_id) {
        (Some(title), Some(user_id)) => Ok(NewTask {
            title,
            user_id,
            description: request.description,
        }),
        _ => Err(ValidationError::single("body", "Invalid task payload")),
    }
}

pub fn validate_update(request: UpdateTaskRequest) -> Result<TaskPatch, ValidationError> {
    let mut errors = ValidationError::new();

    let title = request
        .title
        .as_deref()
        .and_then(|raw| check_title(raw, &mut errors));
    let status = request
        .status
        .as_deref()
        .and_then(|raw| check_status(raw, &mut errors));

    errors.into_result()?;
    Ok(TaskPatch {
        title,
        description: request.description,
        status,
    })
}

pub fn validate_status(request: SetStatusRequest) -> Result<TaskStatus, ValidationError> {
    let mut errors = ValidationError::new();
    let status = match request.status.as_deref() {
        Some(raw) => check_status(raw, &mut errors),
        None => {
            errors.add("status", "Status is required");
            None
        }
    };

    errors.into_result()?;
    status.ok_or_else(|| ValidationError::single("status", "Status is required"))
}

/// Reads a `POST /api/tasks` body. A known field holding the wrong JSON type
/// is reported under its own name, alongside any schema violations of the
/// other fields.
pub fn decode_create(payload: &Value) -> Result<CreateTaskRequest, ValidationError> {
    let mut reader = FieldReader::new(payload)?;
    let request = CreateTaskRequest {
        title: reader.string("title"),
        user_id: reader.string("user_id"),
        description: reader.string("description"),
    };
    reader.finish(request, |r| validate_create(r.clone()).err())
}

/// Reads a `PUT /api/tasks/{id}` body. Unknown fields are ignored.
pub fn decode_update(payload: &Value) -> Result<UpdateTaskRequest, ValidationError> {
    let mut reader = FieldReader::new(payload)?;
    let request = UpdateTaskRequest {
        title: reader.string("title"),
        description: reader.string("description"),
        status: reader.string("status"),
    };
    reader.finish(request, |r| validate_update(r.clone()).err())
}

/// Reads a `PATCH /api/tasks/{id}/status` body.
pub fn decode_status(payload: &Value) -> Result<SetStatusRequest, ValidationError> {
    let mut reader = FieldReader::new(payload)?;
    let request = SetStatusRequest {
        status: reader.string("status"),
    };
    reader.finish(request, |r| validate_status(r.clone()).err())
}

struct FieldReader<'a> {
    object: &'a Map<String, Value>,
    errors: ValidationError,
}

impl<'a> FieldReader<'a> {
    fn new(payload: &'a Value) -> Result<Self, ValidationError> {
        match payload {
            Value::Object(object) => Ok(Self {
                object,
                errors: ValidationError::new(),
            }),
            _ => Err(ValidationError::single("body", "Expected a JSON object")),
        }
    }

    /// Absent and `null` both read as `None`.
    fn string(&mut self, field: &str) -> Option<String> {
        match self.object.get(field) {
            None | Some(Value::Null) => None,
            Some(Value::String(value)) => Some(value.clone()),
            Some(_) => {
                self.errors.add(field, "Expected a string");
                None
            }
        }
    }

    fn finish<T>(
        mut self,
        request: T,
        check: impl FnOnce(&T) -> Option<ValidationError>,
    ) -> Result<T, ValidationError> {
        if self.errors.is_empty() {
            return Ok(request);
        }
        if let Some(schema) = check(&request) {
            self.errors.absorb(schema);
        }
        Err(self.errors)
    }
}

/// Returns the trimmed title, or records why it is unacceptable.
fn check_title(raw: &str, errors: &mut ValidationError) -> Option<String> {
    let title = raw.trim();
    if title.is_empty() {
        errors.add("title", "Title is required");
        return None;
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        errors.add(
            "title",
            format!("Title must be at most {TITLE_MAX_CHARS} characters"),
        );
        return None;
    }
    Some(title.to_string())
}

fn check_status(raw: &str, errors: &mut ValidationError) -> Option<TaskStatus> {
    let status = TaskStatus::parse(raw);
    if status.is_none() {
        errors.add("status", "Status must be one of: pending, completed");
    }
    status
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_trims_and_accepts() {
        let request = CreateTaskRequest::new("  Buy milk ", "u1").with_description("2 litres");
        let new = validate_create(request).unwrap();

        assert_eq!(new.title, "Buy milk");
        assert_eq!(new.user_id, UserId::new("u1"));
        assert_eq!(new.description.as_deref(), Some("2 litres"));
    }

    #[test]
    fn test_create_reports_every_missing_field() {
        let error = validate_create(CreateTaskRequest::default()).unwrap_err();
        assert!(error.has_field("title"));
        assert!(error.has_field("user_id"));
    }

    #[test]
    fn test_create_rejects_blank_title() {
        let error = validate_create(CreateTaskRequest::new("   ", "u1")).unwrap_err();
        assert_eq!(error.fields()["title"], vec!["Title is required".to_string()]);
        assert!(!error.has_field("user_id"));
    }

    #[test]
    fn test_title_length_limit_counts_chars() {
        let exactly = "é".repeat(TITLE_MAX_CHARS);
        assert!(validate_create(CreateTaskRequest::new(exactly, "u1")).is_ok());

        let over = "a".repeat(TITLE_MAX_CHARS + 1);
        let error = validate_create(CreateTaskRequest::new(over, "u1")).unwrap_err();
        assert!(error.has_field("title"));
    }

    #[test]
    fn test_update_all_fields_optional() {
        let patch = validate_update(UpdateTaskRequest::default()).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn test_update_checks_present_fields() {
        let request = UpdateTaskRequest {
            title: Some(String::new()),
            description: None,
            status: Some("archived".to_string()),
        };
        let error = validate_update(request).unwrap_err();
        assert!(error.has_field("title"));
        assert!(error.has_field("status"));
    }

    #[test]
    fn test_update_parses_status() {
        let request = UpdateTaskRequest {
            status: Some("completed".to_string()),
            ..UpdateTaskRequest::default()
        };
        let patch = validate_update(request).unwrap();
        assert_eq!(patch.status, Some(TaskStatus::Completed));
    }

    #[test]
    fn test_set_status_requires_value() {
        assert!(validate_status(SetStatusRequest::default())
            .unwrap_err()
            .has_field("status"));
        assert_eq!(
            validate_status(TaskStatus::Pending.into()).unwrap(),
            TaskStatus::Pending
        );
    }

    #[test]
    fn test_decode_reports_wrong_type_under_field() {
        let error = decode_create(&json!({"title": 5, "user_id": "u1"})).unwrap_err();
        assert_eq!(error.fields()["title"], vec!["Expected a string".to_string()]);
        assert!(!error.has_field("user_id"));
        assert!(!error.has_field("body"));
    }

    #[test]
    fn test_decode_keeps_other_schema_errors() {
        let error = decode_create(&json!({"title": ["a"], "description": 3})).unwrap_err();
        assert_eq!(error.fields()["title"], vec!["Expected a string".to_string()]);
        assert!(error.has_field("description"));
        assert_eq!(
            error.fields()["user_id"],
            vec!["User ID is required".to_string()]
        );
    }

    #[test]
    fn test_decode_accepts_null_and_unknown_fields() {
        let request = decode_update(&json!({
            "title": "Buy milk",
            "description": null,
            "id": "t1",
            "created_at": "2024-01-01T00:00:00Z",
        }))
        .unwrap();
        assert_eq!(request, UpdateTaskRequest::title("Buy milk"));
    }

    #[test]
    fn test_decode_status_type_mismatch() {
        let error = decode_status(&json!({"status": true})).unwrap_err();
        assert!(error.has_field("status"));
        assert_eq!(error.fields()["status"].len(), 1);
    }

    #[test]
    fn test_decode_requires_object() {
        let error = decode_update(&json!(["title"])).unwrap_err();
        assert!(error.has_field("body"));
    }
}
