//! Client-side task list.
//!
//! The board owns the ordered rows shown to the user and their transient
//! modes. It performs no I/O: user intents return the [`ApiCall`] to issue,
//! and the caller feeds the server's answer back through
//! [`TaskBoard::resolve`]. The list only ever reflects server-confirmed
//! state.
//!
//! ```text
//! Normal --begin_edit--> Editing --commit_edit / cancel_edit--> Normal
//! Normal --request_delete--> PendingDelete --cancel_delete--> Normal
//! PendingDelete --confirm_delete--> Deleting --server confirms--> (removed)
//!                                            --server fails----> Normal
//! ```

use std::collections::HashMap;

use crate::model::{Task, TaskId, TaskStatus, UserId};
use crate::service::dto::{CreateTaskRequest, UpdateTaskRequest};
use crate::service::ordering::compare_tasks;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowMode {
    #[default]
    Normal,
    Editing,
    PendingDelete,
    /// A delete request is in flight.
    Deleting,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoardRow {
    pub task: Task,
    pub mode: RowMode,
}

impl BoardRow {
    pub fn new(task: Task) -> Self {
        Self {
            task,
            mode: RowMode::Normal,
        }
    }
}

/// A server-confirmed change to apply to the list.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Loaded(Vec<Task>),
    Upserted(Task),
    Removed(TaskId),
}

/// Pure reconciliation step: `(rows, mutation) -> rows`.
///
/// Rows untouched by the mutation keep their mode. The result is always in
/// display order.
pub fn reduce(rows: Vec<BoardRow>, mutation: Mutation) -> Vec<BoardRow> {
    let mut next = match mutation {
        Mutation::Loaded(tasks) => {
            let modes: HashMap<TaskId, RowMode> = rows
                .into_iter()
                .map(|row| (row.task.id, row.mode))
                .collect();
            tasks
                .into_iter()
                .map(|task| {
                    let mode = modes.get(&task.id).copied().unwrap_or_default();
                    BoardRow { task, mode }
                })
                .collect()
        }
        Mutation::Upserted(task) => {
            let mut rows = rows;
            match rows.iter_mut().find(|row| row.task.id == task.id) {
                Some(row) => row.task = task,
                None => rows.push(BoardRow::new(task)),
            }
            rows
        }
        Mutation::Removed(id) => {
            let mut rows = rows;
            rows.retain(|row| row.task.id != id);
            rows
        }
    };
    next.sort_by(|a, b| compare_tasks(&a.task, &b.task));
    next
}

/// A request the board wants issued against the task API.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    List,
    Create(CreateTaskRequest),
    Update {
        id: TaskId,
        request: UpdateTaskRequest,
    },
    Delete(TaskId),
    Complete(TaskId),
    SetStatus {
        id: TaskId,
        status: TaskStatus,
    },
}

impl ApiCall {
    /// Message shown to the user when this call fails.
    pub fn failure_message(&self) -> &'static str {
        match self {
            ApiCall::List => "Failed to load tasks",
            ApiCall::Create(_) => "Failed to create task",
            ApiCall::Update { .. } => "Failed to update task",
            ApiCall::Delete(_) => "Failed to delete task",
            ApiCall::Complete(_) | ApiCall::SetStatus { .. } => "Failed to toggle task",
        }
    }
}

/// A successful answer to an [`ApiCall`].
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Tasks(Vec<Task>),
    Task(Task),
    Deleted,
}

#[derive(Debug, Clone)]
pub struct TaskBoard {
    user_id: UserId,
    rows: Vec<BoardRow>,
    error: Option<String>,
}

impl TaskBoard {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            rows: Vec::new(),
            error: None,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn rows(&self) -> &[BoardRow] {
        &self.rows
    }

    pub fn row(&self, id: &TaskId) -> Option<&BoardRow> {
        self.rows.iter().find(|row| row.task.id == *id)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn load(&self) -> ApiCall {
        ApiCall::List
    }

    pub fn add(&self, title: &str, description: Option<&str>) -> Option<ApiCall> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        let mut request = CreateTaskRequest::new(title, self.user_id.as_str());
        request.description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        Some(ApiCall::Create(request))
    }

    /// normal -> editing. Returns whether the transition happened.
    pub fn begin_edit(&mut self, id: &TaskId) -> bool {
        self.transition(id, RowMode::Normal, RowMode::Editing)
    }

    pub fn cancel_edit(&mut self, id: &TaskId) -> bool {
        self.transition(id, RowMode::Editing, RowMode::Normal)
    }

    /// editing -> normal, asking for an update when the title really changed.
    pub fn commit_edit(&mut self, id: &TaskId, title: &str) -> Option<ApiCall> {
        if !self.transition(id, RowMode::Editing, RowMode::Normal) {
            return None;
        }
        let title = title.trim();
        let current = self.row(id).map(|row| row.task.title.as_str());
        if title.is_empty() || current == Some(title) {
            return None;
        }
        Some(ApiCall::Update {
            id: id.clone(),
            request: UpdateTaskRequest::title(title),
        })
    }

    pub fn request_delete(&mut self, id: &TaskId) -> bool {
        self.transition(id, RowMode::Normal, RowMode::PendingDelete)
    }

    pub fn cancel_delete(&mut self, id: &TaskId) -> bool {
        self.transition(id, RowMode::PendingDelete, RowMode::Normal)
    }

    /// pending-delete -> deleting. The row stays visible until the server
    /// confirms, and confirming again asks for nothing.
    pub fn confirm_delete(&mut self, id: &TaskId) -> Option<ApiCall> {
        self.transition(id, RowMode::PendingDelete, RowMode::Deleting)
            .then(|| ApiCall::Delete(id.clone()))
    }

    pub fn toggle_complete(&self, id: &TaskId) -> Option<ApiCall> {
        let row = self.row(id)?;
        if row.mode != RowMode::Normal {
            return None;
        }
        Some(match row.task.status {
            TaskStatus::Pending => ApiCall::Complete(id.clone()),
            TaskStatus::Completed => ApiCall::SetStatus {
                id: id.clone(),
                status: TaskStatus::Pending,
            },
        })
    }

    /// Applies the answer to `call`. Failures leave the list as it was and
    /// surface a message.
    pub fn resolve(&mut self, call: &ApiCall, result: Result<Outcome, String>) {
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(detail) => {
                tracing::warn!(%detail, "{}", call.failure_message());
                self.fail(call);
                return;
            }
        };

        let mutation = match (call, outcome) {
            (ApiCall::List, Outcome::Tasks(tasks)) => Mutation::Loaded(tasks),
            (ApiCall::Delete(id), Outcome::Deleted) => Mutation::Removed(id.clone()),
            (
                ApiCall::Create(_)
                | ApiCall::Update { .. }
                | ApiCall::Complete(_)
                | ApiCall::SetStatus { .. },
                Outcome::Task(task),
            ) => Mutation::Upserted(task),
            (_, outcome) => {
                tracing::warn!(?outcome, "response does not match request");
                self.fail(call);
                return;
            }
        };

        self.error = None;
        let rows = std::mem::take(&mut self.rows);
        self.rows = reduce(rows, mutation);
    }

    fn fail(&mut self, call: &ApiCall) {
        if let ApiCall::Delete(id) = call {
            self.transition(id, RowMode::Deleting, RowMode::Normal);
        }
        self.error = Some(call.failure_message().to_string());
    }

    fn transition(&mut self, id: &TaskId, from: RowMode, to: RowMode) -> bool {
        match self.rows.iter_mut().find(|row| row.task.id == *id) {
            Some(row) if row.mode == from => {
                row.mode = to;
                true
            }
            _ => false,
        }
    }
}
