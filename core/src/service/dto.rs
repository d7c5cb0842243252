use serde::{Deserialize, Serialize};

use crate::model::{Task, TaskStatus};

/// Body of `POST /api/tasks`. Fields stay optional so that missing values
/// surface as field-level validation errors instead of decode failures.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CreateTaskRequest {
    pub fn new(title: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            user_id: Some(user_id.into()),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Body of `PUT /api/tasks/{id}`. Unknown fields are ignored, so a whole
/// task may be sent back.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct UpdateTaskRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl UpdateTaskRequest {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

impl From<&Task> for UpdateTaskRequest {
    fn from(task: &Task) -> Self {
        Self {
            title: Some(task.title.clone()),
            description: task.description.clone(),
            status: Some(task.status.as_str().to_string()),
        }
    }
}

/// Body of `PATCH /api/tasks/{id}/status`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct SetStatusRequest {
    #[serde(default)]
    pub status: Option<String>,
}

impl From<TaskStatus> for SetStatusRequest {
    fn from(status: TaskStatus) -> Self {
        Self {
            status: Some(status.as_str().to_string()),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DeleteResponse {
    pub success: bool,
}
