use crate::error::{Result, TaskError, ValidationError};
use crate::model::{Scope, Task, TaskId, TaskStatus};
use crate::repository::TaskRepository;
use crate::service::dto::{CreateTaskRequest, SetStatusRequest, UpdateTaskRequest};
use crate::validation::{validate_create, validate_status, validate_update};

/// Validate, check existence, mutate. Transport-agnostic; the HTTP layer maps
/// the resulting `TaskError` onto status codes.
pub struct TaskService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn list_tasks(&self, scope: &Scope) -> Result<Vec<Task>> {
        self.repo.list(scope)
    }

    /// Inserts a new pending task. A status in the payload is never honoured.
    pub fn create_task(&self, scope: &Scope, request: CreateTaskRequest) -> Result<Task> {
        let new = validate_create(request)?;
        if let Some(caller) = scope.user() {
            if *caller != new.user_id {
                return Err(ValidationError::single(
                    "user_id",
                    "User ID does not match the authenticated user",
                )
                .into());
            }
        }

        let created = self.repo.insert(Task::from_new(new))?;
        tracing::info!(task_id = %created.id, user_id = %created.user_id, "task created");
        Ok(created)
    }

    pub fn update_task(
        &self,
        scope: &Scope,
        id: &TaskId,
        request: UpdateTaskRequest,
    ) -> Result<Task> {
        let patch = validate_update(request)?;
        if self.repo.get(scope, id)?.is_none() {
            return Err(TaskError::NotFound(id.clone()));
        }

        let updated = self.repo.update(scope, id, &patch)?;
        tracing::info!(task_id = %id, "task updated");
        Ok(updated)
    }

    pub fn delete_task(&self, scope: &Scope, id: &TaskId) -> Result<()> {
        self.repo.delete(scope, id)?;
        tracing::info!(task_id = %id, "task deleted");
        Ok(())
    }

    /// Forces `completed`, whatever the current status.
    pub fn complete_task(&self, scope: &Scope, id: &TaskId) -> Result<Task> {
        let task = self.repo.set_status(scope, id, TaskStatus::Completed)?;
        tracing::info!(task_id = %id, "task completed");
        Ok(task)
    }

    pub fn set_status(
        &self,
        scope: &Scope,
        id: &TaskId,
        request: SetStatusRequest,
    ) -> Result<Task> {
        let status = validate_status(request)?;
        let task = self.repo.set_status(scope, id, status)?;
        tracing::info!(task_id = %id, %status, "task status set");
        Ok(task)
    }
}
