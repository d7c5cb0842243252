use crate::error::Result;
use crate::model::{Scope, Task, TaskId, TaskPatch, TaskStatus};

/// Access to the `tasks` table. Every call carries the caller's scope; rows
/// outside it behave as if they did not exist.
pub trait TaskRepository {
    /// Visible rows, newest `created_at` first.
    fn list(&self, scope: &Scope) -> Result<Vec<Task>>;
    fn get(&self, scope: &Scope, id: &TaskId) -> Result<Option<Task>>;
    /// Fails with `Conflict` when the id is already taken.
    fn insert(&self, task: Task) -> Result<Task>;
    fn update(&self, scope: &Scope, id: &TaskId, patch: &TaskPatch) -> Result<Task>;
    fn delete(&self, scope: &Scope, id: &TaskId) -> Result<()>;
    fn set_status(&self, scope: &Scope, id: &TaskId, status: TaskStatus) -> Result<Task>;
}

impl<T: TaskRepository + ?Sized> TaskRepository for Box<T> {
    fn list(&self, scope: &Scope) -> Result<Vec<Task>> {
        (**self).list(scope)
    }

    fn get(&self, scope: &Scope, id: &TaskId) -> Result<Option<Task>> {
        (**self).get(scope, id)
    }

    fn insert(&self, task: Task) -> Result<Task> {
        (**self).insert(task)
    }

    fn update(&self, scope: &Scope, id: &TaskId, patch: &TaskPatch) -> Result<Task> {
        (**self).update(scope, id, patch)
    }

    fn delete(&self, scope: &Scope, id: &TaskId) -> Result<()> {
        (**self).delete(scope, id)
    }

    fn set_status(&self, scope: &Scope, id: &TaskId, status: TaskStatus) -> Result<Task> {
        (**self).set_status(scope, id, status)
    }
}

/// Sort order shared by every backend's `list`.
pub(crate) fn newest_first(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
