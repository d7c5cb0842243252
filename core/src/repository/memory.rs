use std::sync::{Mutex, MutexGuard};

use anyhow::anyhow;

use crate::error::{Result, TaskError};
use crate::model::{Scope, Task, TaskId, TaskPatch, TaskStatus};
use crate::repository::traits::{newest_first, TaskRepository};

/// Process-local store. Contents vanish with the process.
#[derive(Default)]
pub struct InMemoryTaskRepository {
    tasks: Mutex<Vec<Task>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks: Mutex::new(tasks),
        }
    }

    fn tasks(&self) -> Result<MutexGuard<'_, Vec<Task>>> {
        self.tasks
            .lock()
            .map_err(|_| TaskError::Backend(anyhow!("task store lock poisoned")))
    }

    fn modify<F>(&self, scope: &Scope, id: &TaskId, change: F) -> Result<Task>
    where
        F: FnOnce(&mut Task),
    {
        let mut tasks = self.tasks()?;
        let task = tasks
            .iter_mut()
            .find(|t| t.id == *id && scope.allows(&t.user_id))
            .ok_or_else(|| TaskError::NotFound(id.clone()))?;
        change(task);
        Ok(task.clone())
    }
}

impl TaskRepository for InMemoryTaskRepository {
    fn list(&self, scope: &Scope) -> Result<Vec<Task>> {
        let mut visible: Vec<Task> = self
            .tasks()?
            .iter()
            .filter(|t| scope.allows(&t.user_id))
            .cloned()
            .collect();
        newest_first(&mut visible);
        Ok(visible)
    }

    fn get(&self, scope: &Scope, id: &TaskId) -> Result<Option<Task>> {
        Ok(self
            .tasks()?
            .iter()
            .find(|t| t.id == *id && scope.allows(&t.user_id))
            .cloned())
    }

    fn insert(&self, task: Task) -> Result<Task> {
        let mut tasks = self.tasks()?;
        if tasks.iter().any(|t| t.id == task.id) {
            return Err(TaskError::Conflict(task.id));
        }
        tasks.push(task.clone());
        Ok(task)
    }

    fn update(&self, scope: &Scope, id: &TaskId, patch: &TaskPatch) -> Result<Task> {
        self.modify(scope, id, |task| task.apply(patch))
    }

    fn delete(&self, scope: &Scope, id: &TaskId) -> Result<()> {
        let mut tasks = self.tasks()?;
        let initial_len = tasks.len();
        tasks.retain(|t| !(t.id == *id && scope.allows(&t.user_id)));
        if tasks.len() == initial_len {
            return Err(TaskError::NotFound(id.clone()));
        }
        Ok(())
    }

    fn set_status(&self, scope: &Scope, id: &TaskId, status: TaskStatus) -> Result<Task> {
        self.modify(scope, id, |task| task.apply(&TaskPatch::status(status)))
    }
}
